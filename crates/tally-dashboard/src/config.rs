use std::collections::HashMap;
use std::env;
use std::time::Duration;

use tally_core::api::ApiConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Validated backend location and request timeout
    pub api: ApiConfig,
    /// File path for the mirror database, or `:memory:`
    pub database_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "TALLY_BIND_ADDR", "127.0.0.1:8000");
        let database_path = value_or_default(&lookup, "TALLY_DATABASE_PATH", "tally.db");

        let timeout_secs = value_or_default(&lookup, "TALLY_API_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "TALLY_API_TIMEOUT_SECS must be an integer in [1, 300]".to_string(),
                )
            })?;
        if !(1..=300).contains(&timeout_secs) {
            return Err(ConfigError::Invalid(
                "TALLY_API_TIMEOUT_SECS must be in [1, 300]".to_string(),
            ));
        }

        let base_url = value_or_default(&lookup, "VOTING_API_BASE_URL", "http://localhost:3002");
        let api = ApiConfig::new(base_url)
            .map_err(|error| ConfigError::Invalid(format!("VOTING_API_BASE_URL: {error}")))?
            .with_timeout(Duration::from_secs(timeout_secs));

        Ok(Self {
            bind_addr,
            api,
            database_path,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
