//! Configuration management for the Cribl Search client.
//!
//! This crate provides types, constants, and an environment loader for
//! managing Cribl organization connection configuration.

pub mod constants;
mod loader;
mod types;

pub use loader::{ConfigError, ConfigLoader};
pub use types::{AuthConfig, Config, ConnectionConfig, is_valid_base_url};
