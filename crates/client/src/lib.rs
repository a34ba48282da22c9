//! Asynchronous client for the Cribl Search job API.
//!
//! Converts the asynchronous, paginated, job-based search API into a single
//! call that returns a bounded table of typed columns:
//!
//! ```no_run
//! use cribl_search_client::{CriblSearchClient, SearchQuery, TimeRange};
//!
//! # async fn run() -> cribl_search_client::Result<()> {
//! let client = CriblSearchClient::builder()
//!     .base_url("https://main-acme.cribl.cloud")
//!     .credentials("client-id", "client-secret")
//!     .build()?;
//!
//! let query = SearchQuery::Adhoc {
//!     query: r#"dataset="my_dataset" | limit 100"#.to_string(),
//! };
//! let range = TimeRange { earliest: 1728700000, latest: 1728744793 };
//! let table = client.run_query(&query, range).await?;
//! println!("{} rows", table.row_count());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod backoff;
mod client;
pub mod error;
pub mod interpret;
pub mod models;
pub mod query;
pub mod table;

pub use client::{ClientBuilder, CriblSearchClient};
pub use error::{ClientError, Result};
pub use query::{SearchQuery, TimeRange};
pub use table::{CellValue, Column, ColumnType, ColumnValues, ResultTable};
