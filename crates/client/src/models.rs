//! Wire models for the Cribl Search API.

use serde::Deserialize;

/// Terminal status a job must report for its results to be used.
pub const JOB_STATUS_COMPLETED: &str = "completed";

/// A result event: an open-ended mapping from field name to JSON value.
pub type Event = serde_json::Map<String, serde_json::Value>;

/// The first NDJSON line of a search query response.
///
/// `isFinished` reflects whether the job is done executing; a job may still
/// be mid-execution while already yielding pages, so `totalEventCount` is
/// only trustworthy once `isFinished` is true.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHeader {
    pub job: Option<JobInfo>,
    #[serde(default)]
    pub is_finished: bool,
    pub total_event_count: Option<u64>,
}

/// Job identity and lifecycle status as reported in the response header.
#[derive(Debug, Clone, Deserialize)]
pub struct JobInfo {
    pub id: String,
    #[serde(default)]
    pub status: String,
}

/// A single page of a search query response: the header line plus the
/// event lines that followed it. Consumed immediately by the table builder.
#[derive(Debug, Clone)]
pub struct ResultPage {
    pub header: QueryHeader,
    pub events: Vec<Event>,
}

/// Response from the saved search listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedSearchList {
    #[serde(default)]
    pub items: Vec<SavedSearchItem>,
}

/// One saved search entry. The API returns more fields; only the id is
/// needed to populate a picker or reference the search in a query.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedSearchItem {
    pub id: String,
}

/// Response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Response from the local login endpoint.
#[derive(Debug, Deserialize)]
pub struct LocalLoginResponse {
    pub token: String,
}
