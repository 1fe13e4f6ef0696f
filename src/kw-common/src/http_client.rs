//! Centralized HTTP client factory for the launcher.
//!
//! Provides factory functions to create HTTP clients with consistent configuration:
//! - `create_manifest_client()` - 10s timeout for the update manifest
//! - `create_download_client()` - 3min timeout for update payloads
//! - `create_client_with_timeout(duration)` - Custom timeout
//!
//! All clients include: User-Agent, tcp_nodelay, and a pool idle timeout.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("kw-launcher/", env!("CARGO_PKG_VERSION"));

/// Timeout for fetching the update manifest (10 seconds)
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for downloading update payloads (3 minutes)
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(180);

/// Idle pooled connections are dropped after this long so DNS is re-resolved.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client for the update manifest (10s timeout).
pub fn create_manifest_client() -> Result<Client, String> {
    create_client_with_timeout(MANIFEST_TIMEOUT)
}

/// Creates an HTTP client for payload downloads (3min timeout).
pub fn create_download_client() -> Result<Client, String> {
    create_client_with_timeout(DOWNLOAD_TIMEOUT)
}

/// Creates an HTTP client with a custom timeout.
///
/// The read timeout is capped at 60s so a stalled body fails well before
/// the overall deadline on large downloads.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client, String> {
    let read_timeout = timeout.min(Duration::from_secs(60));

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .read_timeout(read_timeout)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}
