//! Update workflow shared by the check, update and launch commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kw_common::LauncherConfig;
use kw_update::{ApplyOutcome, CheckReport, InstallLayout, UpdateEngine};

use crate::status::{apply_status, check_status, version_label};

/// Directory the game lives in: `--dir` when given, otherwise the
/// directory holding the launcher executable.
pub fn resolve_install_root(dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir);
    }
    let exe = std::env::current_exe().context("Failed to locate launcher executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("Launcher executable has no parent directory")
}

/// Launcher configuration plus an update engine bound to one install.
pub struct LauncherSession {
    pub config: LauncherConfig,
    pub engine: UpdateEngine,
}

impl LauncherSession {
    pub fn open(root: &Path) -> Result<Self> {
        let config = LauncherConfig::load_normalized(root);
        let engine = UpdateEngine::from_launcher_config(InstallLayout::new(root), &config)
            .context("Failed to create update client")?;
        tracing::debug!(
            root = %root.display(),
            manifest = config.manifest_url().unwrap_or("<none>"),
            "Opened launcher session"
        );
        Ok(Self { config, engine })
    }

    pub fn with_engine(config: LauncherConfig, engine: UpdateEngine) -> Self {
        Self { config, engine }
    }

    pub async fn check(&self) -> Result<CheckReport> {
        let report = self.engine.check_for_update().await?;
        if let Some(err) = &report.fetch_error {
            tracing::warn!(error = %err, "Update check failed");
        }
        Ok(report)
    }

    /// Check, then apply when the check says an update is required.
    pub async fn update_if_required(&self) -> Result<UpdateSummary> {
        let report = self.check().await?;
        let outcome = if report.decision.required {
            let outcome = self.engine.apply_update().await?;
            if let Some(detail) = &outcome.failure_detail {
                tracing::error!(kind = ?outcome.error_kind, "{detail}");
            }
            Some(outcome)
        } else {
            None
        };
        Ok(UpdateSummary { report, outcome })
    }
}

/// Result of a check and the apply that followed it, if any.
#[derive(Debug)]
pub struct UpdateSummary {
    pub report: CheckReport,
    pub outcome: Option<ApplyOutcome>,
}

impl UpdateSummary {
    pub fn status(&self) -> String {
        match &self.outcome {
            Some(outcome) => apply_status(outcome),
            None => check_status(&self.report),
        }
    }

    pub fn version_line(&self) -> String {
        let local = match &self.outcome {
            Some(outcome) if outcome.success => outcome.applied_version.as_str(),
            _ => self.report.local_version.as_str(),
        };
        version_label(local, self.report.latest_version.as_deref())
    }

    /// False only when a required update did not land.
    pub fn ready_to_launch(&self) -> bool {
        match &self.outcome {
            Some(outcome) => outcome.success,
            None => !self.report.decision.required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kw_update::{UpdateDecision, UpdateReason};

    fn report(required: bool) -> CheckReport {
        let decision = if required {
            UpdateDecision::required(UpdateReason::VersionNewer)
        } else {
            UpdateDecision::not_required(UpdateReason::UpToDate)
        };
        CheckReport {
            decision,
            local_version: "1.0.0".to_string(),
            latest_version: Some("1.2.0".to_string()),
            installed: true,
            fetch_error: None,
        }
    }

    #[test]
    fn test_resolve_install_root_prefers_flag() {
        let root = resolve_install_root(Some(PathBuf::from("/games/kw"))).unwrap();
        assert_eq!(root, PathBuf::from("/games/kw"));
    }

    #[test]
    fn test_resolve_install_root_defaults_to_exe_dir() {
        let root = resolve_install_root(None).unwrap();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(Some(root.as_path()), exe.parent());
    }

    #[test]
    fn test_summary_after_successful_apply() {
        let summary = UpdateSummary {
            report: report(true),
            outcome: Some(ApplyOutcome {
                success: true,
                applied_version: "1.2.0".to_string(),
                failure_detail: None,
                error_kind: None,
            }),
        };
        assert!(summary.ready_to_launch());
        assert_eq!(summary.status(), "Updated to 1.2.0");
        assert_eq!(summary.version_line(), "Version: 1.2.0 | Latest: 1.2.0");
    }

    #[test]
    fn test_summary_after_failed_apply() {
        let summary = UpdateSummary {
            report: report(true),
            outcome: Some(ApplyOutcome {
                success: false,
                applied_version: "1.2.0".to_string(),
                failure_detail: Some("Download failed".to_string()),
                error_kind: None,
            }),
        };
        assert!(!summary.ready_to_launch());
        assert_eq!(summary.status(), "Update failed: Download failed");
        assert_eq!(summary.version_line(), "Version: 1.0.0 | Latest: 1.2.0");
    }

    #[test]
    fn test_summary_without_apply() {
        let summary = UpdateSummary {
            report: report(false),
            outcome: None,
        };
        assert!(summary.ready_to_launch());
        assert_eq!(summary.status(), "Ready (v1.0.0)");
    }
}
