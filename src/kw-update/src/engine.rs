//! Update engine - check and apply cycles behind an explicit state machine.

use std::sync::Arc;

use kw_common::LauncherConfig;
use parking_lot::Mutex;

use crate::apply::UpdateApplier;
use crate::error::{ErrorKind, UpdateError, UpdateResult};
use crate::install::{InstallLayout, InstallState};
use crate::manifest::UpdateManifest;
use crate::resolve::{IntegrityPolicy, ManifestResolver, UpdateDecision, UpdateReason};
use crate::transport::{HttpTransport, UpdateTransport};

/// Engine settings consumed from the launcher configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Manifest location; `None` skips update checks entirely
    pub manifest_url: Option<String>,
    /// Digest checking before and after applying
    pub integrity: IntegrityPolicy,
}

impl EngineConfig {
    pub fn from_launcher_config(config: &LauncherConfig) -> Self {
        Self {
            manifest_url: config.manifest_url().map(String::from),
            integrity: IntegrityPolicy::default(),
        }
    }
}

/// Where the engine is in its check/apply cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing checked yet
    Idle,
    /// Fetching and resolving the manifest
    Checking,
    /// No update needed (or none possible); the game may be launched
    ConnectReady {
        local_version: String,
        reason: UpdateReason,
    },
    /// An update is required and can be applied
    UpdateReady {
        manifest: UpdateManifest,
        decision: UpdateDecision,
    },
    /// Downloading and installing
    Applying { version: String },
    /// The last apply failed; it may be retried
    Failed {
        message: String,
        manifest: UpdateManifest,
    },
}

impl EngineState {
    /// Checking and Applying reject new cycles.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Checking | Self::Applying { .. })
    }
}

/// Result of a check cycle.
#[derive(Debug)]
pub struct CheckReport {
    pub decision: UpdateDecision,
    pub local_version: String,
    /// Version announced by a valid manifest
    pub latest_version: Option<String>,
    /// Both artifacts present on disk
    pub installed: bool,
    /// Set when the manifest could not be fetched or parsed
    pub fetch_error: Option<UpdateError>,
}

/// Result of an apply cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub success: bool,
    pub applied_version: String,
    pub failure_detail: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl ApplyOutcome {
    fn succeeded(version: &str) -> Self {
        Self {
            success: true,
            applied_version: version.to_string(),
            failure_detail: None,
            error_kind: None,
        }
    }

    fn failed(version: &str, error: &UpdateError) -> Self {
        Self {
            success: false,
            applied_version: version.to_string(),
            failure_detail: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// Sequences manifest resolution, payload application and the version marker.
pub struct UpdateEngine {
    layout: InstallLayout,
    config: EngineConfig,
    transport: Arc<dyn UpdateTransport>,
    resolver: ManifestResolver,
    applier: UpdateApplier,
    state: Mutex<EngineState>,
}

impl UpdateEngine {
    /// Create an engine using the HTTP transport with default timeouts.
    pub fn new(layout: InstallLayout, config: EngineConfig) -> UpdateResult<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::with_transport(layout, config, transport))
    }

    /// Create an engine for the install rooted at `root`, honoring the
    /// configured manifest URL and timeouts.
    pub fn from_launcher_config(
        layout: InstallLayout,
        launcher: &LauncherConfig,
    ) -> UpdateResult<Self> {
        let transport = Arc::new(HttpTransport::with_timeouts(
            launcher.manifest_timeout(),
            launcher.download_timeout(),
        )?);
        Ok(Self::with_transport(
            layout,
            EngineConfig::from_launcher_config(launcher),
            transport,
        ))
    }

    /// Create an engine with a specific transport.
    pub fn with_transport(
        layout: InstallLayout,
        config: EngineConfig,
        transport: Arc<dyn UpdateTransport>,
    ) -> Self {
        Self {
            resolver: ManifestResolver::new(layout.clone(), config.integrity),
            applier: UpdateApplier::new(layout.clone(), transport.clone(), config.integrity),
            layout,
            config,
            transport,
            state: Mutex::new(EngineState::Idle),
        }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> EngineState {
        self.state.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().is_busy()
    }

    /// Fetch the manifest and decide whether an update is required.
    ///
    /// Fetch and parse failures degrade to connect-only and are reported in
    /// [`CheckReport::fetch_error`]; only [`UpdateError::Busy`] is returned as
    /// an error.
    pub async fn check_for_update(&self) -> UpdateResult<CheckReport> {
        let mut cycle = Cycle::enter(&self.state, EngineState::Checking)?;

        let install = InstallState::read(&self.layout).await;
        let installed = install.is_installed();

        let Some(url) = self.config.manifest_url.as_deref() else {
            tracing::debug!("No manifest URL configured, skipping update check");
            let decision = UpdateDecision::not_required(UpdateReason::NoManifest);
            cycle.finish(EngineState::ConnectReady {
                local_version: install.local_version.clone(),
                reason: decision.reason,
            });
            return Ok(CheckReport {
                decision,
                local_version: install.local_version,
                latest_version: None,
                installed,
                fetch_error: None,
            });
        };

        tracing::info!(url, local_version = %install.local_version, "Checking for updates");
        let (manifest, fetch_error) = match self.fetch_manifest(url).await {
            Ok(manifest) => (Some(manifest), None),
            Err(e) => {
                tracing::warn!(error = %e, "Update check failed, continuing without update");
                (None, Some(e))
            }
        };

        let decision = self.resolver.resolve(manifest.as_ref(), &install).await;
        let latest_version = manifest
            .as_ref()
            .filter(|m| m.is_valid())
            .map(|m| m.version().to_string());

        tracing::info!(
            required = decision.required,
            reason = ?decision.reason,
            latest = latest_version.as_deref().unwrap_or("-"),
            "Update check finished"
        );

        let next = match manifest {
            Some(manifest) if decision.required => EngineState::UpdateReady { manifest, decision },
            _ => EngineState::ConnectReady {
                local_version: install.local_version.clone(),
                reason: decision.reason,
            },
        };
        cycle.finish(next);

        Ok(CheckReport {
            decision,
            local_version: install.local_version,
            latest_version,
            installed,
            fetch_error,
        })
    }

    /// Apply the update found by the last check (or retry a failed apply).
    ///
    /// Returns [`UpdateError::NoPendingUpdate`] when no update is pending and
    /// [`UpdateError::Busy`] while another cycle runs. Download, filesystem and
    /// integrity failures are reported through the returned [`ApplyOutcome`].
    pub async fn apply_update(&self) -> UpdateResult<ApplyOutcome> {
        let (manifest, mut cycle) = {
            let mut state = self.state.lock();
            let manifest = match &*state {
                s if s.is_busy() => return Err(UpdateError::Busy),
                EngineState::UpdateReady { manifest, .. } | EngineState::Failed { manifest, .. } => {
                    manifest.clone()
                }
                _ => return Err(UpdateError::NoPendingUpdate),
            };
            *state = EngineState::Applying {
                version: manifest.version().to_string(),
            };
            (manifest, Cycle::started(&self.state))
        };
        let version = manifest.version().to_string();

        tracing::info!(version = %version, "Applying update");
        match self.apply_and_commit(&manifest).await {
            Ok(()) => {
                tracing::info!(version = %version, "Update applied");
                cycle.finish(EngineState::ConnectReady {
                    local_version: version.clone(),
                    reason: UpdateReason::UpToDate,
                });
                Ok(ApplyOutcome::succeeded(&version))
            }
            Err(e) => {
                tracing::error!(version = %version, error = %e, "Update failed");
                let outcome = ApplyOutcome::failed(&version, &e);
                cycle.finish(EngineState::Failed {
                    message: e.to_string(),
                    manifest,
                });
                Ok(outcome)
            }
        }
    }

    async fn fetch_manifest(&self, url: &str) -> UpdateResult<UpdateManifest> {
        let json = self.transport.fetch_manifest(url).await?;
        UpdateManifest::parse(&json)
    }

    async fn apply_and_commit(&self, manifest: &UpdateManifest) -> UpdateResult<()> {
        self.applier.apply(manifest).await?;
        self.layout.write_version_marker(manifest.version()).await
    }
}

/// Holds the busy state for one cycle.
///
/// Dropping a cycle that was never finished (the future was cancelled)
/// returns the engine to `Idle` so it does not stay busy forever.
struct Cycle<'a> {
    state: &'a Mutex<EngineState>,
    finished: bool,
}

impl<'a> Cycle<'a> {
    fn enter(state: &'a Mutex<EngineState>, busy: EngineState) -> UpdateResult<Self> {
        let mut guard = state.lock();
        if guard.is_busy() {
            return Err(UpdateError::Busy);
        }
        *guard = busy;
        Ok(Self::started(state))
    }

    /// Track a cycle whose busy state the caller already set.
    fn started(state: &'a Mutex<EngineState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(&mut self, next: EngineState) {
        *self.state.lock() = next;
        self.finished = true;
    }
}

impl Drop for Cycle<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.lock() = EngineState::Idle;
        }
    }
}
