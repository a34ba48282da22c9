//! The Cribl Search API client.

mod builder;
mod search;
mod transport;

pub use builder::ClientBuilder;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::time::Duration;
use tracing::debug;

use crate::auth::{TokenStore, refresh_via_local_login, refresh_via_oauth};
use crate::error::{ClientError, Result};
use crate::models::SavedSearchList;
use cribl_search_config::AuthConfig;

const SEARCH_API_PREFIX: &str = "/api/v1/m/default_search/search";

/// Asynchronous client for the Cribl Search job API.
///
/// Cheap to share behind a reference; holds a connection pool, the
/// organization base URL, credentials, and a cached bearer token.
#[derive(Debug)]
pub struct CriblSearchClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthConfig,
    token_store: TokenStore,
    query_timeout: Option<Duration>,
}

impl CriblSearchClient {
    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The normalized organization base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hard deadline for a single query run, if configured.
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    /// Fetch a bearer token, refreshing through the flow the base URL calls
    /// for: OAuth client credentials for cloud organizations, a local login
    /// for self-hosted instances.
    pub(crate) async fn bearer_token(&self) -> Result<String> {
        self.token_store
            .bearer_token(|| async {
                if self.base_url.ends_with(".cloud") {
                    refresh_via_oauth(
                        &self.http,
                        &self.base_url,
                        &self.auth.client_id,
                        &self.auth.client_secret,
                    )
                    .await
                } else {
                    refresh_via_local_login(
                        &self.http,
                        &self.base_url,
                        &self.auth.client_id,
                        &self.auth.client_secret,
                    )
                    .await
                }
            })
            .await
    }

    /// List the ids of all saved searches in the organization.
    pub async fn saved_search_ids(&self) -> Result<Vec<String>> {
        let body = self
            .get_raw(&format!("{SEARCH_API_PREFIX}/saved"), &[])
            .await?;
        let list: SavedSearchList = serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("saved search listing: {e}")))?;
        Ok(list.items.into_iter().map(|item| item.id).collect())
    }

    /// Ask the server to cancel a running job. Callers that are abandoning a
    /// job anyway treat failure here as advisory.
    pub async fn cancel_job(&self, job_id: &str) -> Result<()> {
        debug!(%job_id, "cancelling job");
        let encoded = utf8_percent_encode(job_id, NON_ALPHANUMERIC);
        self.post_raw(
            &format!("{SEARCH_API_PREFIX}/jobs/{encoded}/cancel"),
            "application/json",
            "{}",
        )
        .await?;
        Ok(())
    }
}
