//! Installation layout and local install state.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::UpdateResult;

/// Version reported when no marker is present.
pub const DEFAULT_LOCAL_VERSION: &str = "0.0.0";

const VERSION_MARKER_FILE: &str = "game_version.txt";
const BINARY_FILE: &str = "kw.exe";
const DATA_PACKAGE_FILE: &str = "kw.pck";
const TEMP_PACKAGE_FILE: &str = "kw_update.zip";
const TEMP_SUFFIX: &str = ".new";

/// One of the two canonical installed artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Binary,
    DataPackage,
}

impl Artifact {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Binary => "game executable",
            Self::DataPackage => "data package",
        }
    }

    /// Canonical file name under the install root.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Binary => BINARY_FILE,
            Self::DataPackage => DATA_PACKAGE_FILE,
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// File layout of an installation rooted at a single directory.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    /// Layout of the install rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, artifact: Artifact) -> PathBuf {
        self.root.join(artifact.file_name())
    }

    pub fn binary_path(&self) -> PathBuf {
        self.artifact_path(Artifact::Binary)
    }

    pub fn data_path(&self) -> PathBuf {
        self.artifact_path(Artifact::DataPackage)
    }

    /// Staging file an artifact is downloaded to before promotion.
    pub fn staging_path(&self, artifact: Artifact) -> PathBuf {
        self.root
            .join(format!("{}{TEMP_SUFFIX}", artifact.file_name()))
    }

    /// Staging file for a bundled archive.
    pub fn package_staging_path(&self) -> PathBuf {
        self.root.join(TEMP_PACKAGE_FILE)
    }

    pub fn version_marker_path(&self) -> PathBuf {
        self.root.join(VERSION_MARKER_FILE)
    }

    /// Read the installed version, falling back to [`DEFAULT_LOCAL_VERSION`].
    pub async fn read_local_version(&self) -> String {
        match tokio::fs::read_to_string(self.version_marker_path()).await {
            Ok(content) => {
                let version = content.trim();
                if version.is_empty() {
                    DEFAULT_LOCAL_VERSION.to_string()
                } else {
                    version.to_string()
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(error = %e, "Failed to read version marker");
                }
                DEFAULT_LOCAL_VERSION.to_string()
            }
        }
    }

    /// Replace the version marker with `version`.
    ///
    /// Written to a sibling temp file and renamed over the marker, so readers
    /// see either the old or the new version.
    pub async fn write_version_marker(&self, version: &str) -> UpdateResult<()> {
        let path = self.version_marker_path();
        let temp_path = self
            .root
            .join(format!(".{VERSION_MARKER_FILE}.tmp.{}", std::process::id()));

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(version.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), version, "Version marker written");
        Ok(())
    }
}

/// Snapshot of what is installed, read fresh for every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallState {
    pub local_version: String,
    pub has_binary: bool,
    pub has_data_package: bool,
}

impl InstallState {
    /// Inspect the layout on disk.
    pub async fn read(layout: &InstallLayout) -> Self {
        Self {
            local_version: layout.read_local_version().await,
            has_binary: is_file(&layout.binary_path()).await,
            has_data_package: is_file(&layout.data_path()).await,
        }
    }

    /// Both artifacts present. A partial install counts as not installed.
    pub fn is_installed(&self) -> bool {
        self.has_binary && self.has_data_package
    }
}

pub(crate) async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
