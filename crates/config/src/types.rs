//! Configuration types for the Cribl Search client.
//!
//! Responsibilities:
//! - Define connection settings (org base URL, TLS verification, timeouts).
//! - Define API credential settings (client id + secret).
//! - Provide serialization helpers for secrets and durations.
//! - Provide base-URL well-formedness checks.
//!
//! Does NOT handle:
//! - Configuration loading from env/dotenv (see `loader` module).
//! - Token exchange or any network I/O (see client crate).
//!
//! Invariants:
//! - All secret values use `secrecy::SecretString` to prevent accidental logging.
//! - Duration fields are serialized as seconds; the query timeout allows fractions.

use crate::constants::DEFAULT_TIMEOUT_SECS;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Module for serializing SecretString as strings.
mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize as DeserializeTrait, Serialize as SerializeTrait};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        secret.expose_secret().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString::new(s.into()))
    }
}

/// Module for serializing Duration as whole seconds (integer).
mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Module for serializing an optional Duration as fractional seconds.
/// Query timeouts are user-facing and allow sub-second precision.
mod opt_duration_seconds_f64 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_secs_f64()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<f64>::deserialize(deserializer)?;
        match secs {
            Some(s) if s.is_finite() && s > 0.0 => Ok(Some(Duration::from_secs_f64(s))),
            _ => Ok(None),
        }
    }
}

/// Connection configuration for a Cribl organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the Cribl organization/tenant site
    /// (e.g., `https://your-org-id.cribl.cloud`, or a local API URL for dev).
    pub base_url: String,
    /// Whether to skip TLS verification (for local/self-signed setups).
    #[serde(default)]
    pub skip_verify: bool,
    /// Per-request HTTP timeout (serialized as whole seconds).
    #[serde(with = "duration_seconds", default = "default_timeout")]
    pub timeout: Duration,
    /// How long we're willing to let a search job run before canceling it.
    /// `None` means wait indefinitely. Serialized as fractional seconds.
    #[serde(with = "opt_duration_seconds_f64", default)]
    pub query_timeout: Option<Duration>,
}

pub(crate) fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

/// API credential configuration.
///
/// Against a cloud organization these are OAuth client credentials; against a
/// local API they double as username/password for the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Client ID used to request OAuth tokens (or local username).
    pub client_id: String,
    /// Client secret used to request OAuth tokens (or local password).
    #[serde(with = "secret_string")]
    pub client_secret: SecretString,
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// Credential settings.
    pub auth: AuthConfig,
}

impl Config {
    /// Convenience constructor for the common case: a base URL plus client
    /// credentials, with default timeouts.
    pub fn new(base_url: String, client_id: String, client_secret: SecretString) -> Self {
        Self {
            connection: ConnectionConfig {
                base_url,
                skip_verify: false,
                timeout: default_timeout(),
                query_timeout: None,
            },
            auth: AuthConfig {
                client_id,
                client_secret,
            },
        }
    }
}

/// Determine whether a supplied URL is well-formed: it must parse, carry an
/// `http` or `https` scheme, and have a host.
pub fn is_valid_base_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}
