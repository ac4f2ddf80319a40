//! CLI error types and exit codes

use thiserror::Error;

use dirsync_core::SyncError;

use crate::config::ConfigError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 3: Upstream, target or cache unavailable (safe to rerun)
/// - 4: Configuration error
/// - 5: Invariant violated during apply
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    #[error("Membership cache unavailable: {0}")]
    Cache(#[from] dirsync_db::CacheError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 4,
            CliError::ClientSetup(_) | CliError::Output(_) => 1,
            CliError::Cache(_) => 3,
            CliError::Sync(e) => match e {
                SyncError::InvalidConfiguration(_) => 4,
                SyncError::InvariantViolation(_) => 5,
                e if e.is_transient() => 3,
                _ => 1,
            },
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let CliError::Sync(e) = self {
            let mut source = std::error::Error::source(e);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(ConfigError::MissingVar(_)) => {
                Some("Set the variable in the environment or in a .env file.")
            }
            CliError::Sync(e) if e.is_transient() => {
                Some("Rerun the sync; completed steps are not repeated.")
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_exit_codes() {
        let missing = CliError::Config(ConfigError::MissingVar("SCIM_ENDPOINT".into()));
        assert_eq!(missing.exit_code(), 4);

        let transient = CliError::Sync(SyncError::provisioning("create user", Boom));
        assert_eq!(transient.exit_code(), 3);

        let invariant = CliError::Sync(SyncError::InvariantViolation("x".into()));
        assert_eq!(invariant.exit_code(), 5);

        let conflicting = CliError::Sync(SyncError::InvalidConfiguration("x".into()));
        assert_eq!(conflicting.exit_code(), 4);
    }

    #[test]
    fn test_sync_error_display_is_not_prefixed() {
        let err = CliError::Sync(SyncError::InvariantViolation("member x unresolved".into()));
        assert_eq!(err.to_string(), "invariant violated: member x unresolved");
    }
}
