//! Update decision logic.

use serde::{Deserialize, Serialize};

use crate::install::{InstallLayout, InstallState};
use crate::manifest::UpdateManifest;
use crate::verify::IntegrityVerifier;
use crate::version::is_newer;

/// Why an update is or is not required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateReason {
    /// No manifest URL is configured
    NoManifest,
    /// Manifest missing, unreadable or without a version
    InvalidManifest,
    /// Manifest names nothing to download
    NoPayload,
    /// Binary or data package missing locally
    NotInstalled,
    /// Manifest version is newer than the installed one
    VersionNewer,
    /// An installed artifact disagrees with its declared digest
    IntegrityMismatch,
    /// Nothing to do
    UpToDate,
}

/// Outcome of resolving a manifest against the local install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDecision {
    pub required: bool,
    pub reason: UpdateReason,
}

impl UpdateDecision {
    pub fn required(reason: UpdateReason) -> Self {
        Self {
            required: true,
            reason,
        }
    }

    pub fn not_required(reason: UpdateReason) -> Self {
        Self {
            required: false,
            reason,
        }
    }
}

/// How strictly installed content is checked against manifest digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityPolicy {
    /// Compare digests before and after applying updates
    #[default]
    Verify,
    /// Never hash installed files
    Skip,
}

/// Decides whether a manifest requires an update.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    verifier: IntegrityVerifier,
    policy: IntegrityPolicy,
}

impl ManifestResolver {
    pub fn new(layout: InstallLayout, policy: IntegrityPolicy) -> Self {
        Self {
            verifier: IntegrityVerifier::new(layout),
            policy,
        }
    }

    /// Evaluate the rules in priority order; the first match wins.
    pub async fn resolve(
        &self,
        manifest: Option<&UpdateManifest>,
        install: &InstallState,
    ) -> UpdateDecision {
        let Some(manifest) = manifest.filter(|m| m.is_valid()) else {
            return UpdateDecision::not_required(UpdateReason::InvalidManifest);
        };

        if !manifest.has_payload() {
            return UpdateDecision::not_required(UpdateReason::NoPayload);
        }

        if !install.is_installed() {
            return UpdateDecision::required(UpdateReason::NotInstalled);
        }

        if is_newer(manifest.version(), &install.local_version) {
            return UpdateDecision::required(UpdateReason::VersionNewer);
        }

        if self.policy == IntegrityPolicy::Verify && self.verifier.has_mismatch(manifest).await {
            return UpdateDecision::required(UpdateReason::IntegrityMismatch);
        }

        UpdateDecision::not_required(UpdateReason::UpToDate)
    }
}
