//! Environment-based configuration loading.
//!
//! Responsibilities:
//! - Read Cribl connection/credential settings from environment variables,
//!   optionally seeded from a `.env` file.
//! - Validate the resulting configuration (base URL well-formedness).
//!
//! Does NOT handle:
//! - Network I/O or token exchange (see client crate).
//! - Host-provided settings blobs; a host embedding this client builds a
//!   [`Config`] directly instead of going through this loader.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Error messages never include secret values.

use secrecy::SecretString;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::types::{Config, is_valid_base_url};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Invalid base URL '{0}': must be http(s) with a host")]
    InvalidBaseUrl(String),
}

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Loader for building a [`Config`] from the process environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    load_dotenv: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also read a `.env` file from the current directory, if one exists.
    /// Real environment variables take precedence over `.env` entries.
    pub fn with_dotenv(mut self) -> Self {
        self.load_dotenv = true;
        self
    }

    /// Load and validate the configuration.
    ///
    /// Required variables: `CRIBL_ORG_BASE_URL`, `CRIBL_CLIENT_ID`,
    /// `CRIBL_CLIENT_SECRET`. Optional: `CRIBL_QUERY_TIMEOUT_SEC` (fractional
    /// seconds), `CRIBL_HTTP_TIMEOUT_SECS`, `CRIBL_SKIP_VERIFY`.
    pub fn load(self) -> Result<Config, ConfigError> {
        if self.load_dotenv {
            // Missing .env is fine; only log when one was actually read.
            if let Ok(path) = dotenvy::dotenv() {
                debug!(path = %path.display(), "loaded .env file");
            }
        }

        let base_url = env_var_or_none("CRIBL_ORG_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CRIBL_ORG_BASE_URL".to_string()))?;
        if !is_valid_base_url(&base_url) {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }

        let client_id = env_var_or_none("CRIBL_CLIENT_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("CRIBL_CLIENT_ID".to_string()))?;
        let client_secret = env_var_or_none("CRIBL_CLIENT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("CRIBL_CLIENT_SECRET".to_string()))?;

        let mut config = Config::new(
            base_url,
            client_id,
            SecretString::new(client_secret.into()),
        );

        if let Some(raw) = env_var_or_none("CRIBL_QUERY_TIMEOUT_SEC") {
            let secs: f64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "CRIBL_QUERY_TIMEOUT_SEC".to_string(),
                message: "must be a number of seconds (fractions allowed)".to_string(),
            })?;
            if secs.is_finite() && secs > 0.0 {
                config.connection.query_timeout = Some(Duration::from_secs_f64(secs));
            }
        }
        if let Some(raw) = env_var_or_none("CRIBL_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "CRIBL_HTTP_TIMEOUT_SECS".to_string(),
                message: "must be a whole number of seconds".to_string(),
            })?;
            config.connection.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = env_var_or_none("CRIBL_SKIP_VERIFY") {
            config.connection.skip_verify =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    var: "CRIBL_SKIP_VERIFY".to_string(),
                    message: "must be true or false".to_string(),
                })?;
        }

        Ok(config)
    }
}
