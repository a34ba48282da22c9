//! Query types and adhoc query-text preparation.
//!
//! A query either carries adhoc query text plus an explicit time range, or
//! references a saved search which owns its own time range. The query
//! language itself is opaque to this crate; preparation is limited to
//! whitespace collapsing and an origin breadcrumb.

use cribl_search_config::constants::QUERY_BREADCRUMB;

/// A query to run against Cribl Search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Client-supplied query text; the time range comes from the caller.
    Adhoc { query: String },
    /// Server-stored query referenced by id, with its own built-in time range.
    Saved { saved_search_id: String },
}

impl SearchQuery {
    /// Can this query be run as-is? An empty adhoc query or a missing saved
    /// search id is a normal "nothing to run yet" state, not an error.
    pub fn is_runnable(&self) -> bool {
        match self {
            Self::Adhoc { query } => !query.trim().is_empty(),
            Self::Saved { saved_search_id } => !saved_search_id.is_empty(),
        }
    }
}

/// Absolute time range for adhoc queries, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub earliest: i64,
    pub latest: i64,
}

/// Collapse every run of newlines/carriage returns/tabs to a single space.
/// Easier to troubleshoot a query from the logs when it's a single line.
pub fn collapse_to_single_line(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut in_run = false;
    for c in query.chars() {
        if matches!(c, '\r' | '\n' | '\t') {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Prepare adhoc query text for submission: collapse it to a single line and
/// append a breadcrumb comment so the query is identifiable in the remote
/// job history.
pub fn prepare_query(query: &str) -> String {
    format!("{} {}", collapse_to_single_line(query), QUERY_BREADCRUMB)
}
