//! Builder for [`CriblSearchClient`].

use reqwest::redirect::Policy;
use secrecy::SecretString;
use std::time::Duration;
use tracing::warn;

use super::CriblSearchClient;
use crate::auth::TokenStore;
use crate::error::{ClientError, Result};
use cribl_search_config::constants::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS};
use cribl_search_config::{AuthConfig, Config, is_valid_base_url};

/// Builder for configuring a [`CriblSearchClient`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    timeout: Option<Duration>,
    query_timeout: Option<Duration>,
    skip_verify: bool,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Organization base URL, e.g. `https://main-acme.cribl.cloud` or a
    /// local `http://localhost:9000`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// API credentials. For local deployments these double as the login
    /// username and password.
    pub fn credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<SecretString>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Per-request HTTP timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Hard deadline for a whole query run, spanning every poll iteration.
    /// Unset means a query may poll indefinitely.
    pub fn query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = Some(query_timeout);
        self
    }

    /// Accept invalid TLS certificates. Intended for self-signed local
    /// deployments only.
    pub fn skip_verify(mut self, skip_verify: bool) -> Self {
        self.skip_verify = skip_verify;
        self
    }

    /// Populate the builder from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new()
            .base_url(config.connection.base_url.clone())
            .credentials(
                config.auth.client_id.clone(),
                config.auth.client_secret.clone(),
            )
            .timeout(config.connection.timeout)
            .skip_verify(config.connection.skip_verify);
        if let Some(query_timeout) = config.connection.query_timeout {
            builder = builder.query_timeout(query_timeout);
        }
        builder
    }

    /// Build the client, validating the base URL and constructing the
    /// underlying HTTP client.
    pub fn build(self) -> Result<CriblSearchClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Validation("base URL is required".to_string()))?;
        if !is_valid_base_url(&base_url) {
            return Err(ClientError::Validation(format!(
                "invalid base URL: {base_url}"
            )));
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let client_id = self
            .client_id
            .ok_or_else(|| ClientError::Validation("client id is required".to_string()))?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| ClientError::Validation("client secret is required".to_string()))?;

        let mut http_builder = reqwest::Client::builder()
            .timeout(
                self.timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            )
            .redirect(Policy::limited(DEFAULT_MAX_REDIRECTS));
        if self.skip_verify {
            if base_url.starts_with("https://") {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                warn!("skip_verify set on a non-https base URL, ignoring");
            }
        }
        let http = http_builder.build()?;

        Ok(CriblSearchClient {
            http,
            base_url,
            auth: AuthConfig {
                client_id,
                client_secret,
            },
            token_store: TokenStore::new(),
            query_timeout: self.query_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ClientBuilder {
        ClientBuilder::new().credentials("id", "secret")
    }

    #[test]
    fn test_build_requires_base_url() {
        let err = minimal().build().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_build_rejects_invalid_base_url() {
        let err = minimal().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let err = minimal().base_url("ftp://example.com").build().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_build_requires_credentials() {
        let err = ClientBuilder::new()
            .base_url("https://main-acme.cribl.cloud")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_trailing_slashes_normalized() {
        let client = minimal()
            .base_url("https://main-acme.cribl.cloud///")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://main-acme.cribl.cloud");
    }

    #[test]
    fn test_from_config_carries_settings() {
        let mut config = Config::new(
            "https://main-acme.cribl.cloud".to_string(),
            "id".to_string(),
            "secret".into(),
        );
        config.connection.query_timeout = Some(Duration::from_secs(90));
        let client = ClientBuilder::from_config(&config).build().unwrap();
        assert_eq!(client.query_timeout(), Some(Duration::from_secs(90)));
    }
}
