use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use kinetrack_core::revision::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use kinetrack_db::DEFAULT_MAX_CONNECTIONS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Pool size (default: `20`).
    pub max_connections: u32,
    /// Backoff for allocation conflicts.
    pub retry: RetryPolicy,
    /// Extra directory of `*.json` file tree templates, loaded after the
    /// built-ins so it can override them.
    pub file_tree_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `DATABASE_URL`             | required |
    /// | `DB_MAX_CONNECTIONS`       | `20`     |
    /// | `ALLOCATION_MAX_ATTEMPTS`  | `5`      |
    /// | `ALLOCATION_RETRY_BASE_MS` | `10`     |
    /// | `ALLOCATION_RETRY_MAX_MS`  | `200`    |
    /// | `FILE_TREE_DIR`            | unset    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(invalid("DB_MAX_CONNECTIONS", "0", "must be at least 1"));
        }

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "ALLOCATION_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            base_delay: Duration::from_millis(parse_or(
                &lookup,
                "ALLOCATION_RETRY_BASE_MS",
                defaults.base_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(parse_or(
                &lookup,
                "ALLOCATION_RETRY_MAX_MS",
                defaults.max_delay.as_millis() as u64,
            )?),
        };
        if let Err(e) = retry.validate() {
            let var = if retry.max_attempts == 0 {
                "ALLOCATION_MAX_ATTEMPTS"
            } else {
                "ALLOCATION_RETRY_BASE_MS"
            };
            return Err(invalid(var, &lookup(var).unwrap_or_default(), &e.to_string()));
        }

        let file_tree_dir = lookup("FILE_TREE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            database_url,
            max_connections,
            retry,
            file_tree_dir,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, &value, &e.to_string())),
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
