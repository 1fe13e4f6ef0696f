//! Common utilities shared across the KW launcher crates.
//!
//! - `config` - loading and normalizing `launcher_config.json`
//! - `http_client` - HTTP client factory with launcher-wide defaults

pub mod config;
pub mod http_client;

pub use config::{CONFIG_FILE_NAME, LauncherConfig};
