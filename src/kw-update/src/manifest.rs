//! Remote update manifest.

use serde::{Deserialize, Serialize};

use crate::error::UpdateResult;

/// Update manifest as published next to the game payload.
///
/// Every field is optional on the wire. Blank strings are treated the same as
/// missing fields; use the accessor methods rather than the raw fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateManifest {
    /// Latest published version. Blank invalidates the manifest.
    #[serde(default)]
    pub version: String,
    /// Bundled archive containing the whole install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,
    /// Standalone game executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe_url: Option<String>,
    /// Standalone data package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pck_url: Option<String>,
    /// Hex SHA-256 of the executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe_sha256: Option<String>,
    /// Hex SHA-256 of the data package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pck_sha256: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl UpdateManifest {
    /// Parse a manifest from its JSON text.
    ///
    /// Parsing does not validate; see [`UpdateManifest::is_valid`].
    pub fn parse(json: &str) -> UpdateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The declared version, trimmed.
    pub fn version(&self) -> &str {
        self.version.trim()
    }

    /// A manifest without a version is unusable.
    pub fn is_valid(&self) -> bool {
        !self.version().is_empty()
    }

    pub fn package_url(&self) -> Option<&str> {
        non_blank(&self.package_url)
    }

    pub fn binary_url(&self) -> Option<&str> {
        non_blank(&self.exe_url)
    }

    pub fn data_url(&self) -> Option<&str> {
        non_blank(&self.pck_url)
    }

    pub fn binary_digest(&self) -> Option<&str> {
        non_blank(&self.exe_sha256)
    }

    pub fn data_digest(&self) -> Option<&str> {
        non_blank(&self.pck_sha256)
    }

    /// Whether the manifest names anything to download.
    pub fn has_payload(&self) -> bool {
        self.package_url().is_some() || self.binary_url().is_some() || self.data_url().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let json = r#"{
            "version": "1.0.1",
            "package_url": "https://cdn.example.com/kw.zip",
            "exe_url": "https://cdn.example.com/kw.exe",
            "pck_url": "https://cdn.example.com/kw.pck",
            "exe_sha256": "ABCDEF",
            "pck_sha256": "012345",
            "notes": "ignored"
        }"#;
        let manifest = UpdateManifest::parse(json).unwrap();
        assert_eq!(manifest.version(), "1.0.1");
        assert_eq!(manifest.package_url(), Some("https://cdn.example.com/kw.zip"));
        assert_eq!(manifest.binary_url(), Some("https://cdn.example.com/kw.exe"));
        assert_eq!(manifest.data_url(), Some("https://cdn.example.com/kw.pck"));
        assert_eq!(manifest.binary_digest(), Some("ABCDEF"));
        assert_eq!(manifest.data_digest(), Some("012345"));
        assert!(manifest.is_valid());
        assert!(manifest.has_payload());
    }

    #[test]
    fn test_missing_version_is_invalid() {
        let manifest = UpdateManifest::parse(r#"{"exe_url": "https://x/kw.exe"}"#).unwrap();
        assert!(!manifest.is_valid());

        let manifest = UpdateManifest::parse(r#"{"version": "   "}"#).unwrap();
        assert!(!manifest.is_valid());
    }

    #[test]
    fn test_blank_urls_are_not_payload() {
        let manifest = UpdateManifest::parse(
            r#"{"version": "2.0.0", "package_url": "", "exe_url": "  ", "pck_url": null}"#,
        )
        .unwrap();
        assert!(!manifest.has_payload());
        assert_eq!(manifest.package_url(), None);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(UpdateManifest::parse("not json").is_err());
        assert!(UpdateManifest::parse(r#"{"version": 3}"#).is_err());
    }
}
