//! SHA256 verification of installed artifacts.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::error::UpdateResult;
use crate::install::{Artifact, InstallLayout, is_file};
use crate::manifest::UpdateManifest;

/// Calculate SHA256 hash of a file as lower-case hex.
pub async fn digest_of(path: &Path) -> UpdateResult<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare a computed digest against a manifest-declared one.
pub fn digest_matches(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

/// Checks installed artifacts against the digests a manifest declares.
#[derive(Debug, Clone)]
pub struct IntegrityVerifier {
    layout: InstallLayout,
}

impl IntegrityVerifier {
    pub fn new(layout: InstallLayout) -> Self {
        Self { layout }
    }

    /// Whether any declared digest disagrees with the installed artifact.
    pub async fn has_mismatch(&self, manifest: &UpdateManifest) -> bool {
        self.first_mismatch(manifest).await.is_some()
    }

    /// The first artifact (binary before data package) whose digest disagrees.
    ///
    /// An artifact is only checked when the manifest declares a digest for it
    /// and the file exists locally.
    pub async fn first_mismatch(&self, manifest: &UpdateManifest) -> Option<Artifact> {
        let checks = [
            (Artifact::Binary, manifest.binary_digest()),
            (Artifact::DataPackage, manifest.data_digest()),
        ];

        for (artifact, expected) in checks {
            let Some(expected) = expected else {
                continue;
            };
            let path = self.layout.artifact_path(artifact);
            if !is_file(&path).await {
                continue;
            }

            match digest_of(&path).await {
                Ok(actual) if digest_matches(&actual, expected) => {}
                Ok(actual) => {
                    tracing::info!(%artifact, expected, actual = %actual, "Digest mismatch");
                    return Some(artifact);
                }
                Err(e) => {
                    tracing::warn!(%artifact, error = %e, "Failed to hash artifact");
                    return Some(artifact);
                }
            }
        }

        None
    }
}
