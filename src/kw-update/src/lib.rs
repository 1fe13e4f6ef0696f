//! KW Update - update resolution and apply engine for the KW launcher.
//!
//! Decides whether the locally installed game is current and, if not,
//! downloads and installs the payload named by the remote manifest:
//! - Version comparison over numeric components
//! - SHA256 integrity checks of installed artifacts
//! - Bundled-archive or per-artifact installation with temp-file staging
//!
//! # Example
//!
//! ```rust,ignore
//! use kw_update::{EngineConfig, InstallLayout, UpdateEngine};
//!
//! let engine = UpdateEngine::new(InstallLayout::new(root), EngineConfig {
//!     manifest_url: Some("https://cdn.example.com/kw/manifest.json".into()),
//!     ..Default::default()
//! })?;
//!
//! let report = engine.check_for_update().await?;
//! if report.decision.required {
//!     let outcome = engine.apply_update().await?;
//!     println!("updated: {}", outcome.success);
//! }
//! ```

mod apply;
mod archive;
mod engine;
mod error;
mod install;
mod manifest;
mod resolve;
mod transport;
mod verify;
mod version;

pub use apply::{AppliedPayload, ApplyStrategy, UpdateApplier};
pub use archive::extract_package;
pub use engine::{ApplyOutcome, CheckReport, EngineConfig, EngineState, UpdateEngine};
pub use error::{ErrorKind, UpdateError, UpdateResult};
pub use install::{Artifact, DEFAULT_LOCAL_VERSION, InstallLayout, InstallState};
pub use manifest::UpdateManifest;
pub use resolve::{IntegrityPolicy, ManifestResolver, UpdateDecision, UpdateReason};
pub use transport::{HttpTransport, UpdateTransport};
pub use verify::{IntegrityVerifier, digest_matches, digest_of};
pub use version::{VersionComparison, compare_versions, is_newer};
