//! Environment configuration.
//!
//! Everything is read from environment variables; `main` loads `.env` first.
//! List values are comma separated.

use std::env;
use std::time::Duration;

use thiserror::Error;

use dirsync_core::{GroupKeyPolicy, SyncConfig};

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Settings for one `dirsync sync` invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SCIM base URL, e.g. `https://scim.us-east-1.amazonaws.com/{tenant}/scim/v2`.
    pub scim_endpoint: String,
    pub scim_access_token: String,
    pub scim_max_retries: u32,

    pub google_access_token: String,
    pub google_customer_id: String,
    pub google_admin_base_url: String,

    /// Enables the Postgres membership cache when set.
    pub database_url: Option<String>,

    pub http_timeout: Duration,

    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| env::var(key).ok())
    }

    /// Load configuration through `get`, which returns a variable's value.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_reader<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required =
            |key: &str| var(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let group_key_policy = match var("GROUP_KEY_POLICY") {
            Some(value) => value
                .parse::<GroupKeyPolicy>()
                .map_err(|message| ConfigError::InvalidValue {
                    var: "GROUP_KEY_POLICY".to_string(),
                    message,
                })?,
            None => GroupKeyPolicy::default(),
        };

        let sync = SyncConfig {
            user_query: var("USER_MATCH").unwrap_or_default(),
            group_query: var("GROUP_MATCH").unwrap_or_default(),
            ignore_users: parse_list(var("IGNORE_USERS")),
            ignore_groups: parse_list(var("IGNORE_GROUPS")),
            include_groups: parse_list(var("INCLUDE_GROUPS")),
            group_key_policy,
            dry_run: parse_bool("DRY_RUN", var("DRY_RUN"))?.unwrap_or(false),
        };

        let config = Self {
            scim_endpoint: required("SCIM_ENDPOINT")?,
            scim_access_token: required("SCIM_ACCESS_TOKEN")?,
            scim_max_retries: parse_number("SCIM_MAX_RETRIES", var("SCIM_MAX_RETRIES"))?
                .unwrap_or(3),
            google_access_token: required("GOOGLE_ACCESS_TOKEN")?,
            google_customer_id: var("GOOGLE_CUSTOMER_ID")
                .unwrap_or_else(|| dirsync_google::MY_CUSTOMER.to_string()),
            google_admin_base_url: var("GOOGLE_ADMIN_BASE_URL")
                .unwrap_or_else(|| dirsync_google::DEFAULT_BASE_URL.to_string()),
            database_url: var("DATABASE_URL"),
            http_timeout: Duration::from_secs(
                parse_number("HTTP_TIMEOUT_SECS", var("HTTP_TIMEOUT_SECS"))?.unwrap_or(30),
            ),
            sync,
        };

        let endpoint = &config.scim_endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "SCIM_ENDPOINT".to_string(),
                message: "must be an http(s) URL".to_string(),
            });
        }

        Ok(config)
    }

    #[cfg(test)]
    pub fn from_map(vars: &std::collections::HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_reader(|key| vars.get(key).cloned())
    }
}

fn parse_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_bool(var: &str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("expected a boolean, got {value:?}"),
        }),
    }
}

fn parse_number<T>(var: &str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                var: var.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("SCIM_ENDPOINT", "https://scim.example.com/scim/v2"),
            ("SCIM_ACCESS_TOKEN", "scim-token"),
            ("GOOGLE_ACCESS_TOKEN", "google-token"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        for (k, v) in extra {
            map.insert((*k).to_string(), (*v).to_string());
        }
        map
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_map(&vars(&[])).unwrap();
        assert_eq!(config.google_customer_id, "my_customer");
        assert_eq!(config.google_admin_base_url, "https://admin.googleapis.com");
        assert_eq!(config.scim_max_retries, 3);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.database_url.is_none());
        assert_eq!(config.sync, SyncConfig::default());
    }

    #[test]
    fn test_missing_required_var() {
        let mut map = vars(&[]);
        map.remove("SCIM_ACCESS_TOKEN");
        let err = AppConfig::from_map(&map).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "SCIM_ACCESS_TOKEN"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let config = AppConfig::from_map(&vars(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_sync_settings() {
        let config = AppConfig::from_map(&vars(&[
            ("USER_MATCH", "isAdmin=true"),
            ("GROUP_MATCH", "email:aws-*"),
            ("IGNORE_USERS", "bot@x.com, svc@x.com"),
            ("INCLUDE_GROUPS", "aws-admins@x.com,,aws-dev@x.com"),
            ("GROUP_KEY_POLICY", "email"),
            ("DRY_RUN", "yes"),
        ]))
        .unwrap();
        assert_eq!(config.sync.user_query, "isAdmin=true");
        assert_eq!(config.sync.group_query, "email:aws-*");
        assert_eq!(config.sync.ignore_users, vec!["bot@x.com", "svc@x.com"]);
        assert_eq!(
            config.sync.include_groups,
            vec!["aws-admins@x.com", "aws-dev@x.com"]
        );
        assert!(config.sync.ignore_groups.is_empty());
        assert_eq!(config.sync.group_key_policy, GroupKeyPolicy::Email);
        assert!(config.sync.dry_run);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("DRY_RUN", "maybe"),
            ("HTTP_TIMEOUT_SECS", "thirty"),
            ("GROUP_KEY_POLICY", "id"),
            ("SCIM_ENDPOINT", "scim.example.com"),
        ] {
            let err = AppConfig::from_map(&vars(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref var, .. } if var == key),
                "{key}: {err}"
            );
        }
    }
}
