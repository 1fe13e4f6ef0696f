//! Status text shown to the player.

use kw_update::{ApplyOutcome, CheckReport, UpdateReason};

/// `Version: <local>` plus the latest version when the manifest named one.
pub fn version_line(report: &CheckReport) -> String {
    version_label(&report.local_version, report.latest_version.as_deref())
}

pub fn version_label(local: &str, latest: Option<&str>) -> String {
    match latest {
        Some(latest) => format!("Version: {local} | Latest: {latest}"),
        None => format!("Version: {local}"),
    }
}

/// One-line summary of a check.
pub fn check_status(report: &CheckReport) -> String {
    if report.fetch_error.is_some() {
        return "No update check. Connect only.".to_string();
    }

    let latest = report.latest_version.as_deref().unwrap_or("-");
    match report.decision.reason {
        UpdateReason::InvalidManifest => "Manifest invalid. Connect only.".to_string(),
        UpdateReason::IntegrityMismatch => {
            format!("Integrity mismatch. Update required ({latest})")
        }
        UpdateReason::NotInstalled | UpdateReason::VersionNewer => {
            format!("Update available: {latest}")
        }
        UpdateReason::NoManifest => format!("Ready (v{})", report.local_version),
        UpdateReason::NoPayload | UpdateReason::UpToDate => {
            if report.installed {
                format!("Ready (v{})", report.local_version)
            } else {
                "Game missing. Upload update payload.".to_string()
            }
        }
    }
}

/// One-line summary of an apply.
pub fn apply_status(outcome: &ApplyOutcome) -> String {
    if outcome.success {
        format!("Updated to {}", outcome.applied_version)
    } else {
        format!(
            "Update failed: {}",
            outcome.failure_detail.as_deref().unwrap_or("unknown error")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kw_update::{UpdateDecision, UpdateError};
    use pretty_assertions::assert_eq;

    fn report(decision: UpdateDecision, installed: bool, latest: Option<&str>) -> CheckReport {
        CheckReport {
            decision,
            local_version: "1.0.0".to_string(),
            latest_version: latest.map(String::from),
            installed,
            fetch_error: None,
        }
    }

    #[test]
    fn test_version_line() {
        let r = report(UpdateDecision::not_required(UpdateReason::UpToDate), true, None);
        assert_eq!(version_line(&r), "Version: 1.0.0");

        let r = report(
            UpdateDecision::required(UpdateReason::VersionNewer),
            true,
            Some("1.1.0"),
        );
        assert_eq!(version_line(&r), "Version: 1.0.0 | Latest: 1.1.0");
    }

    #[test]
    fn test_check_status_messages() {
        let cases = [
            (
                report(UpdateDecision::required(UpdateReason::VersionNewer), true, Some("1.1.0")),
                "Update available: 1.1.0",
            ),
            (
                report(
                    UpdateDecision::required(UpdateReason::IntegrityMismatch),
                    true,
                    Some("1.0.0"),
                ),
                "Integrity mismatch. Update required (1.0.0)",
            ),
            (
                report(UpdateDecision::not_required(UpdateReason::UpToDate), true, Some("1.0.0")),
                "Ready (v1.0.0)",
            ),
            (
                report(UpdateDecision::not_required(UpdateReason::NoPayload), false, Some("1.0.0")),
                "Game missing. Upload update payload.",
            ),
            (
                report(UpdateDecision::not_required(UpdateReason::InvalidManifest), true, None),
                "Manifest invalid. Connect only.",
            ),
            (
                report(UpdateDecision::not_required(UpdateReason::NoManifest), false, None),
                "Ready (v1.0.0)",
            ),
        ];

        for (report, expected) in cases {
            assert_eq!(check_status(&report), expected);
        }
    }

    #[test]
    fn test_fetch_error_status() {
        let mut r = report(UpdateDecision::not_required(UpdateReason::InvalidManifest), true, None);
        r.fetch_error = Some(UpdateError::ManifestFetch {
            message: "timed out".to_string(),
        });
        assert_eq!(check_status(&r), "No update check. Connect only.");
    }

    #[test]
    fn test_apply_status() {
        let ok = ApplyOutcome {
            success: true,
            applied_version: "1.0.1".to_string(),
            failure_detail: None,
            error_kind: None,
        };
        assert_eq!(apply_status(&ok), "Updated to 1.0.1");

        let failed = ApplyOutcome {
            success: false,
            applied_version: "1.0.1".to_string(),
            failure_detail: Some("Integrity check failed after update (game executable)".to_string()),
            error_kind: None,
        };
        assert_eq!(
            apply_status(&failed),
            "Update failed: Integrity check failed after update (game executable)"
        );
    }
}
