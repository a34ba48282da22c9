//! Bearer token acquisition and caching.
//!
//! Cloud deployments (base URL ending in `.cloud`) authenticate through an
//! OAuth2 client-credentials exchange against the region's login endpoint.
//! Anything else is treated as a local deployment and logs in with
//! username/password against the instance itself. Either way the result is a
//! bearer token with an absolute expiry, cached until shortly before it
//! lapses.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use cribl_search_config::constants::TOKEN_EXPIRY_SKEW_MS;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::models::{LocalLoginResponse, OAuthTokenResponse};

/// A bearer token with its absolute expiry in epoch milliseconds.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub token: String,
    pub expires_at_ms: i64,
}

impl BearerToken {
    /// A token is fresh while its expiry is comfortably in the future. The
    /// skew margin avoids presenting a token that lapses mid-request.
    pub fn is_fresh(&self) -> bool {
        Utc::now().timestamp_millis() + TOKEN_EXPIRY_SKEW_MS < self.expires_at_ms
    }
}

/// Serialized cache for the current bearer token.
///
/// The mutex is held across the refresh call itself, so concurrent requests
/// that find a stale token trigger exactly one refresh.
#[derive(Debug, Default)]
pub struct TokenStore {
    cached: Mutex<Option<BearerToken>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh token string, calling `refresh` to obtain a new token
    /// if the cached one is absent or near expiry.
    pub async fn bearer_token<F, Fut>(&self, refresh: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BearerToken>>,
    {
        let mut guard = self.cached.lock().await;
        if let Some(token) = guard.as_ref()
            && token.is_fresh()
        {
            debug!("reusing cached bearer token");
            return Ok(token.token.clone());
        }

        debug!("refreshing bearer token");
        let token = refresh().await?;
        let value = token.token.clone();
        *guard = Some(token);
        Ok(value)
    }
}

/// Cloud regions with distinct login endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudRegion {
    Production,
    Staging,
    Government,
    GovernmentStaging,
}

impl CloudRegion {
    /// Pick the region from the organization base URL's suffix. Staging
    /// suffixes are checked before their production counterparts since the
    /// production suffix is a substring of the staging one.
    pub fn for_base_url(base_url: &str) -> Self {
        if base_url.ends_with("cribl-staging.cloud") {
            Self::Staging
        } else if base_url.ends_with("cribl-gov-staging.cloud") {
            Self::GovernmentStaging
        } else if base_url.ends_with("cribl-gov.cloud") {
            Self::Government
        } else {
            Self::Production
        }
    }

    pub fn token_url(&self) -> &'static str {
        match self {
            Self::Production => "https://login.cribl.cloud/oauth/token",
            Self::Staging => "https://login.cribl-staging.cloud/oauth/token",
            Self::Government => "https://criblgov-prod.okta.com/oauth2/default/v1/token",
            Self::GovernmentStaging => "https://criblgov-stg.okta.com/oauth2/default/v1/token",
        }
    }

    pub fn audience(&self) -> &'static str {
        match self {
            Self::Production => "https://api.cribl.cloud",
            Self::Staging => "https://api.cribl-staging.cloud",
            Self::Government => "https://api.cribl-gov.cloud",
            Self::GovernmentStaging => "https://api.cribl-gov-staging.cloud",
        }
    }

    /// The Okta-backed government endpoints take form-encoded bodies; the
    /// Auth0-backed ones take JSON.
    pub fn uses_form_encoding(&self) -> bool {
        matches!(self, Self::Government | Self::GovernmentStaging)
    }
}

/// Exchange client credentials for a bearer token at the region's OAuth
/// endpoint.
pub async fn refresh_via_oauth(
    http: &reqwest::Client,
    org_base_url: &str,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<BearerToken> {
    let region = CloudRegion::for_base_url(org_base_url);
    debug!(token_url = region.token_url(), "requesting oauth token");

    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret.expose_secret()),
        ("audience", region.audience()),
    ];
    let request = http.post(region.token_url());
    let request = if region.uses_form_encoding() {
        request.form(&params)
    } else {
        let body: serde_json::Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        request.json(&body)
    };

    let response = request
        .send()
        .await
        .map_err(|e| ClientError::AuthFailed(format!("auth http error: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::AuthFailed(format!(
            "auth error, status={status}, body={body}"
        )));
    }

    let token: OAuthTokenResponse = response
        .json()
        .await
        .map_err(|e| ClientError::AuthFailed(format!("auth error, decoding body: {e}")))?;
    Ok(BearerToken {
        token: token.access_token,
        expires_at_ms: Utc::now().timestamp_millis() + token.expires_in * 1000,
    })
}

/// Log in against a local deployment with username/password. The expiry
/// comes from the `exp` claim of the returned JWT.
pub async fn refresh_via_local_login(
    http: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &SecretString,
) -> Result<BearerToken> {
    let url = format!("{base_url}/api/v1/auth/login");
    debug!(%url, "logging in to local deployment");

    let body = serde_json::json!({
        "username": username,
        "password": password.expose_secret(),
    });
    let response = http
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ClientError::AuthFailed(format!("auth http error: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::AuthFailed(format!(
            "auth error, status={status}, body={body}"
        )));
    }

    let login: LocalLoginResponse = response
        .json()
        .await
        .map_err(|e| ClientError::AuthFailed(format!("auth error, decoding body: {e}")))?;
    let expires_at_ms = decode_expiry_unverified(&login.token)?;
    Ok(BearerToken {
        token: login.token,
        expires_at_ms,
    })
}

/// Pull the `exp` claim out of a JWT without verifying the signature.
///
/// The token just came back over the connection we authenticated on, and it
/// is only used to schedule our own refresh, so signature verification buys
/// nothing here.
pub fn decode_expiry_unverified(jwt: &str) -> Result<i64> {
    let payload = jwt
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::AuthFailed("malformed jwt: missing payload".to_string()))?;
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ClientError::AuthFailed(format!("malformed jwt payload: {e}")))?;
    let claims: Value = serde_json::from_slice(&decoded)
        .map_err(|e| ClientError::AuthFailed(format!("malformed jwt claims: {e}")))?;
    let exp = claims
        .get("exp")
        .and_then(Value::as_f64)
        .ok_or_else(|| ClientError::AuthFailed("jwt has no exp claim".to_string()))?;
    Ok((exp * 1000.0) as i64)
}
