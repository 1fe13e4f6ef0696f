//! Applying a manifest's payload to the install directory.

use std::path::Path;
use std::sync::Arc;

use crate::archive::extract_package;
use crate::error::{UpdateError, UpdateResult};
use crate::install::{Artifact, InstallLayout};
use crate::manifest::UpdateManifest;
use crate::resolve::IntegrityPolicy;
use crate::transport::UpdateTransport;
use crate::verify::IntegrityVerifier;

/// How a manifest's payload is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStrategy {
    /// One archive extracted over the install root
    Bundled { package_url: String },
    /// Individual artifacts replaced in place
    Discrete {
        binary_url: Option<String>,
        data_url: Option<String>,
    },
}

impl ApplyStrategy {
    /// A package URL takes precedence; discrete URLs are then ignored.
    pub fn select(manifest: &UpdateManifest) -> Option<Self> {
        if let Some(url) = manifest.package_url() {
            return Some(Self::Bundled {
                package_url: url.to_string(),
            });
        }

        let binary_url = manifest.binary_url().map(String::from);
        let data_url = manifest.data_url().map(String::from);
        if binary_url.is_none() && data_url.is_none() {
            return None;
        }

        Some(Self::Discrete {
            binary_url,
            data_url,
        })
    }
}

/// What an apply pass wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedPayload {
    Package { files: usize },
    Artifacts(Vec<Artifact>),
}

/// Downloads payloads and promotes them onto the install root.
///
/// Every payload is staged in its own temp file; a failed download deletes
/// the temp file and leaves the installed artifact untouched. Promotion is a
/// rename over the canonical file.
pub struct UpdateApplier {
    layout: InstallLayout,
    transport: Arc<dyn UpdateTransport>,
    verifier: IntegrityVerifier,
    policy: IntegrityPolicy,
}

impl UpdateApplier {
    pub fn new(
        layout: InstallLayout,
        transport: Arc<dyn UpdateTransport>,
        policy: IntegrityPolicy,
    ) -> Self {
        Self {
            verifier: IntegrityVerifier::new(layout.clone()),
            layout,
            transport,
            policy,
        }
    }

    /// Download and install the manifest's payload, then re-verify digests.
    ///
    /// A digest mismatch after applying is reported as
    /// [`UpdateError::IntegrityMismatchAfterApply`]; the new files stay on disk.
    pub async fn apply(&self, manifest: &UpdateManifest) -> UpdateResult<AppliedPayload> {
        let strategy = ApplyStrategy::select(manifest).ok_or_else(|| {
            UpdateError::ManifestInvalid {
                message: "manifest has no payload".to_string(),
            }
        })?;

        tokio::fs::create_dir_all(self.layout.root()).await?;

        let applied = match strategy {
            ApplyStrategy::Bundled { package_url } => self.apply_package(&package_url).await?,
            ApplyStrategy::Discrete {
                binary_url,
                data_url,
            } => {
                let mut replaced = Vec::new();
                let steps = [
                    (Artifact::Binary, binary_url),
                    (Artifact::DataPackage, data_url),
                ];
                for (artifact, url) in steps {
                    if let Some(url) = url {
                        self.apply_artifact(artifact, &url).await?;
                        replaced.push(artifact);
                    }
                }
                AppliedPayload::Artifacts(replaced)
            }
        };

        if self.policy == IntegrityPolicy::Verify {
            if let Some(artifact) = self.verifier.first_mismatch(manifest).await {
                tracing::warn!(%artifact, version = manifest.version(), "Integrity check failed after update");
                return Err(UpdateError::IntegrityMismatchAfterApply { artifact });
            }
        }

        Ok(applied)
    }

    async fn apply_package(&self, url: &str) -> UpdateResult<AppliedPayload> {
        let staging = self.layout.package_staging_path();
        tracing::info!(url, "Downloading update package");
        self.stage(url, &staging).await?;

        let extracted = extract_package(&staging, self.layout.root()).await;
        remove_quietly(&staging).await;

        let files = extracted?;
        tracing::info!(files, "Update package extracted");
        Ok(AppliedPayload::Package { files })
    }

    async fn apply_artifact(&self, artifact: Artifact, url: &str) -> UpdateResult<()> {
        let staging = self.layout.staging_path(artifact);
        let target = self.layout.artifact_path(artifact);
        tracing::info!(%artifact, url, "Downloading artifact");
        self.stage(url, &staging).await?;

        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            remove_quietly(&staging).await;
            return Err(e.into());
        }

        tracing::info!(%artifact, path = %target.display(), "Artifact replaced");
        Ok(())
    }

    /// Download into a staging file, removing it again on failure.
    async fn stage(&self, url: &str, staging: &Path) -> UpdateResult<u64> {
        match self.transport.download_to(url, staging).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                remove_quietly(staging).await;
                Err(e)
            }
        }
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove staging file");
        }
    }
}
