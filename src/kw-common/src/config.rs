//! Launcher configuration (`launcher_config.json`).

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

/// File name of the launcher configuration, relative to the install root.
pub const CONFIG_FILE_NAME: &str = "launcher_config.json";

/// Launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Where the update manifest is published. Empty disables update checks.
    #[serde(default)]
    pub update_manifest_url: String,

    /// Game server host passed to the client on launch
    #[serde(default = "default_host")]
    pub default_host: String,

    /// Game server port passed to the client on launch
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Seconds allowed for fetching the manifest
    #[serde(default = "default_manifest_timeout")]
    pub manifest_timeout_secs: u64,

    /// Seconds allowed for each payload download
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_manifest_timeout() -> u64 {
    10
}

fn default_download_timeout() -> u64 {
    180
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            update_manifest_url: String::new(),
            default_host: default_host(),
            default_port: default_port(),
            manifest_timeout_secs: default_manifest_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

impl LauncherConfig {
    /// Load `launcher_config.json` from `root`.
    ///
    /// A missing file yields defaults; an unreadable or malformed one yields
    /// defaults and a warning.
    pub fn load(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Self::default();
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read launcher config");
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid launcher config, using defaults");
                Self::default()
            }
        }
    }

    /// Load and normalize in one step.
    pub fn load_normalized(root: &Path) -> Self {
        Self::load(root).normalized()
    }

    /// Configured manifest URL, if any.
    pub fn manifest_url(&self) -> Option<&str> {
        let url = self.update_manifest_url.trim();
        (!url.is_empty()).then_some(url)
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Point a local-only server host at the manifest's host.
    ///
    /// When `default_host` is blank, `127.0.0.1` or `localhost` and the manifest
    /// is served from a non-loopback host, that host is used instead.
    pub fn normalized(self) -> Self {
        let host = self.default_host.trim();
        let needs_host_fix = host.is_empty()
            || host.eq_ignore_ascii_case("127.0.0.1")
            || host.eq_ignore_ascii_case("localhost");
        if !needs_host_fix {
            return self;
        }

        let Some(manifest_url) = self.manifest_url() else {
            return self;
        };
        let Ok(url) = Url::parse(manifest_url) else {
            return self;
        };
        let Some(remote_host) = url.host().filter(|h| !is_loopback(h)) else {
            return self;
        };

        let remote_host = match remote_host {
            Host::Domain(domain) => domain.to_string(),
            Host::Ipv4(ip) => ip.to_string(),
            Host::Ipv6(ip) => ip.to_string(),
        };
        if remote_host.is_empty() {
            return self;
        }

        tracing::debug!(host = %remote_host, "Using manifest host as default server host");
        Self {
            default_host: remote_host,
            ..self
        }
    }
}

fn is_loopback(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            domain.eq_ignore_ascii_case("localhost")
                || domain
                    .parse::<IpAddr>()
                    .map(|ip| ip.is_loopback())
                    .unwrap_or(false)
        }
        Host::Ipv4(ip) => ip.is_loopback(),
        Host::Ipv6(ip) => ip.is_loopback(),
    }
}
