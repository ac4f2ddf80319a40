//! Tracing subscriber setup.
//!
//! Logs go to stderr so the report printed on stdout stays parseable.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Default filter directive for the given verbosity.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug,hyper=info,reqwest=info,sqlx=warn"
    } else {
        "info,sqlx=warn"
    }
}

/// Initialize the global subscriber. `RUST_LOG` takes precedence over `debug`.
pub fn init_logging(format: LogFormat, debug: bool) {
    let filter = default_filter(debug);
    let filter_layer =
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter)) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("FATAL: Failed to create log filter: {e}");
                std::process::exit(1);
            }
        };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_layer)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder
            .json()
            .with_target(true)
            .flatten_event(true)
            .init(),
        LogFormat::Text => builder.with_target(false).init(),
    }

    tracing::debug!(filter = %filter, "Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        for debug in [false, true] {
            assert!(EnvFilter::try_new(default_filter(debug)).is_ok());
        }
        assert!(default_filter(true).starts_with("debug"));
    }
}
