//! Network access for manifests and payloads.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use kw_common::http_client::{
    create_client_with_timeout, create_download_client, create_manifest_client,
};
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::error::{UpdateError, UpdateResult};

/// Source of manifests and update payloads.
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    /// Fetch the manifest text at `url`.
    async fn fetch_manifest(&self, url: &str) -> UpdateResult<String>;

    /// Download `url` into `dest`, creating or truncating it. Returns bytes written.
    async fn download_to(&self, url: &str, dest: &Path) -> UpdateResult<u64>;
}

/// HTTP transport with separate manifest and download deadlines.
#[derive(Clone)]
pub struct HttpTransport {
    manifest_client: Client,
    download_client: Client,
}

impl HttpTransport {
    /// Create a transport with the default 10s manifest / 3min download timeouts.
    pub fn new() -> UpdateResult<Self> {
        Ok(Self {
            manifest_client: create_manifest_client().map_err(client_build)?,
            download_client: create_download_client().map_err(client_build)?,
        })
    }

    pub fn with_timeouts(manifest: Duration, download: Duration) -> UpdateResult<Self> {
        Ok(Self {
            manifest_client: create_client_with_timeout(manifest).map_err(client_build)?,
            download_client: create_client_with_timeout(download).map_err(client_build)?,
        })
    }
}

fn client_build(message: String) -> UpdateError {
    UpdateError::ClientBuild { message }
}

#[async_trait]
impl UpdateTransport for HttpTransport {
    async fn fetch_manifest(&self, url: &str) -> UpdateResult<String> {
        let response = self
            .manifest_client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::ManifestFetch {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::ServerError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response.text().await.map_err(|e| UpdateError::ManifestFetch {
            message: e.to_string(),
        })
    }

    async fn download_to(&self, url: &str, dest: &Path) -> UpdateResult<u64> {
        let download_failed = |message: String| UpdateError::DownloadFailed {
            url: url.to_string(),
            message,
        };

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| download_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_failed(format!("HTTP {}", response.status())));
        }

        let total = response.content_length();
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| download_failed(e.to_string()))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;

        if let Some(total) = total {
            if downloaded != total {
                return Err(download_failed(format!(
                    "truncated body: {} of {}",
                    format_bytes(downloaded),
                    format_bytes(total)
                )));
            }
        }

        tracing::debug!(url, size = %format_bytes(downloaded), "Download complete");
        Ok(downloaded)
    }
}

/// Format bytes as human-readable string.
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
