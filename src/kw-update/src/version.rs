//! Version comparison.
//!
//! Versions are compared by their decimal digit runs, so `"1.2.0"`,
//! `"v1.2"` and `"build 1-2"` all read as `[1, 2, ...]`. Anything without a
//! digit compares as `0.0.0`.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// Result of comparing two versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComparison {
    /// Current is older than target
    Older,
    /// Current equals target
    Equal,
    /// Current is newer than target
    Newer,
}

/// Compare two version strings.
pub fn compare_versions(current: &str, target: &str) -> VersionComparison {
    match cmp_components(&parse_version(current), &parse_version(target)) {
        Ordering::Less => VersionComparison::Older,
        Ordering::Equal => VersionComparison::Equal,
        Ordering::Greater => VersionComparison::Newer,
    }
}

/// Strict greater-than: equal versions are never newer.
pub fn is_newer(remote: &str, local: &str) -> bool {
    compare_versions(remote, local) == VersionComparison::Newer
}

/// Parse a version string into its numeric components.
fn parse_version(version: &str) -> Vec<u64> {
    let parts: Vec<u64> = DIGIT_RUN
        .find_iter(version)
        .map(|m| m.as_str().parse().unwrap_or(0))
        .collect();

    if parts.is_empty() { vec![0] } else { parts }
}

fn cmp_components(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
