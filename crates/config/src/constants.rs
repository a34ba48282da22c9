//! Centralized constants for the Cribl Search client workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Refresh the bearer token this many milliseconds before its actual expiry,
/// so a token never expires mid-request. Tokens are typically valid for hours.
pub const TOKEN_EXPIRY_SKEW_MS: i64 = 30_000;

// =============================================================================
// Search & Polling Defaults
// =============================================================================

/// Maximum number of result events accumulated per query.
/// Same cap as the Cribl Search UI imposes.
pub const MAX_RESULTS: usize = 10_000;

/// Initial delay for the Fibonacci poll backoff, in milliseconds.
/// The first two delays are both this value.
pub const BACKOFF_INITIAL_MS: u64 = 100;

/// Upper bound on any single poll backoff delay, in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 2_000;

// =============================================================================
// Result Field Names
// =============================================================================

/// The native time field on Cribl Search result events, in epoch seconds.
pub const SEARCH_TIME_FIELD: &str = "_time";

/// Canonical time column name expected by the consuming visualization layer.
pub const TIME_COLUMN_NAME: &str = "Time";

/// Single-line comment appended to prepared adhoc queries so they are
/// identifiable in the Cribl Search job history.
pub const QUERY_BREADCRUMB: &str = "// via grafana";
