//! Error types for the Cribl Search client.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during Cribl Search client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Invalid client or query configuration. Raised before any network call.
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Token refresh or login failed.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// HTTP transport error (connection, TLS, request timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx API response, with an interpreted or raw message.
    #[error("API error ({status}) at {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// A response line could not be parsed as JSON.
    #[error("failed to parse json at line {line}: {snippet}")]
    Parse { line: usize, snippet: String },

    /// The poll loop exceeded the configured query timeout.
    #[error(
        "Job {job_id} still not finished after {elapsed:?} (status={status}). \
         Consider using a scheduled search to speed this up. \
         https://docs.cribl.io/search/scheduled-searches/"
    )]
    DeadlineExceeded {
        job_id: String,
        status: String,
        elapsed: Duration,
    },

    /// The remote job terminated in a non-success state.
    #[error("Job {job_id} ended with status {status}")]
    JobFailed { job_id: String, status: String },
}

impl ClientError {
    /// Check if this error indicates authentication failure.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthFailed(_)) || matches!(self, Self::Api { status: 401, .. })
    }
}
