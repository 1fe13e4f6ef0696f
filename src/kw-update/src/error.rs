//! Error types for kw-update.

use thiserror::Error;

use crate::install::Artifact;

/// Result type for update operations.
pub type UpdateResult<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur during update operations.
#[derive(Debug, Error)]
pub enum UpdateError {
    // Client errors
    #[error("Failed to build HTTP client: {message}")]
    ClientBuild { message: String },

    // Manifest errors
    #[error("Failed to fetch manifest: {message}")]
    ManifestFetch { message: String },

    #[error("Manifest server returned error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Manifest invalid: {message}")]
    ManifestInvalid { message: String },

    // Download errors
    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    // Archive errors
    #[error("Failed to extract archive: {message}")]
    ExtractionFailed { message: String },

    // Verification errors
    #[error("Integrity check failed after update ({artifact})")]
    IntegrityMismatchAfterApply { artifact: Artifact },

    // File system errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Manifest body is not the expected JSON
    #[error("Failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    // Engine state errors
    #[error("Another update cycle is already running")]
    Busy,

    #[error("No pending update to apply")]
    NoPendingUpdate,
}

/// Coarse classification of an [`UpdateError`], cheap to copy across the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ManifestFetch,
    ManifestInvalid,
    Download,
    Filesystem,
    IntegrityMismatchAfterApply,
    Busy,
    NoPendingUpdate,
}

impl UpdateError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ManifestFetch { .. }
            | Self::ServerError { .. }
            | Self::Json(_)
            | Self::ClientBuild { .. } => ErrorKind::ManifestFetch,
            Self::ManifestInvalid { .. } => ErrorKind::ManifestInvalid,
            Self::DownloadFailed { .. } => ErrorKind::Download,
            Self::ExtractionFailed { .. } | Self::Io(_) => ErrorKind::Filesystem,
            Self::IntegrityMismatchAfterApply { .. } => ErrorKind::IntegrityMismatchAfterApply,
            Self::Busy => ErrorKind::Busy,
            Self::NoPendingUpdate => ErrorKind::NoPendingUpdate,
        }
    }

    /// Check if this error is a network error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::ManifestFetch { .. } | Self::ServerError { .. } | Self::DownloadFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = UpdateError::DownloadFailed {
            url: "https://x/kw.exe".to_string(),
            message: "HTTP 404".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Download);
        assert!(err.is_network_error());

        let err = UpdateError::IntegrityMismatchAfterApply {
            artifact: Artifact::DataPackage,
        };
        assert_eq!(err.kind(), ErrorKind::IntegrityMismatchAfterApply);
        assert!(!err.is_network_error());
        assert_eq!(
            err.to_string(),
            "Integrity check failed after update (data package)"
        );
    }

    #[test]
    fn test_manifest_failures_are_fetch_errors() {
        let err = UpdateError::ServerError {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ManifestFetch);
        assert!(err.is_network_error());

        let err: UpdateError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::ManifestFetch);
        assert!(!err.is_network_error());

        let err = UpdateError::ManifestInvalid {
            message: "missing version".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ManifestInvalid);
    }

    #[test]
    fn test_io_is_filesystem() {
        let err: UpdateError = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }
}
