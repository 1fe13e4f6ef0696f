//! Starting the game client.

use std::path::PathBuf;

use kw_common::LauncherConfig;
use kw_update::{Artifact, InstallLayout};
use thiserror::Error;

/// Errors that prevent the game from starting.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{0} not found")]
    MissingArtifact(String),

    #[error("Launch failed: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Everything needed to start the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl LaunchPlan {
    /// Check that both artifacts exist and build the client command line.
    pub async fn prepare(
        layout: &InstallLayout,
        config: &LauncherConfig,
    ) -> Result<Self, LaunchError> {
        for artifact in [Artifact::Binary, Artifact::DataPackage] {
            let present = tokio::fs::metadata(layout.artifact_path(artifact))
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !present {
                return Err(LaunchError::MissingArtifact(artifact.file_name().to_string()));
            }
        }

        Ok(Self {
            program: layout.binary_path(),
            args: vec![
                "--mode=client".to_string(),
                format!("--host={}", config.default_host),
                format!("--port={}", config.default_port),
            ],
            working_dir: layout.root().to_path_buf(),
        })
    }

    /// Start the client without waiting for it.
    pub fn spawn(&self) -> Result<tokio::process::Child, LaunchError> {
        tracing::info!(program = %self.program.display(), args = ?self.args, "Launching game");
        let child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .spawn()?;
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_binary_reported_first() {
        let dir = TempDir::new().unwrap();
        let layout = InstallLayout::new(dir.path());
        let err = LaunchPlan::prepare(&layout, &LauncherConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "kw.exe not found");
    }

    #[tokio::test]
    async fn test_directory_is_not_an_artifact() {
        let dir = TempDir::new().unwrap();
        let layout = InstallLayout::new(dir.path());
        std::fs::create_dir(layout.binary_path()).unwrap();
        std::fs::write(layout.data_path(), b"pck").unwrap();
        let err = LaunchPlan::prepare(&layout, &LauncherConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::MissingArtifact(ref name) if name == "kw.exe"));
    }

    #[tokio::test]
    async fn test_missing_data_package() {
        let dir = TempDir::new().unwrap();
        let layout = InstallLayout::new(dir.path());
        std::fs::write(layout.binary_path(), b"exe").unwrap();
        let err = LaunchPlan::prepare(&layout, &LauncherConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "kw.pck not found");
    }

    #[tokio::test]
    async fn test_launch_arguments() {
        let dir = TempDir::new().unwrap();
        let layout = InstallLayout::new(dir.path());
        std::fs::write(layout.binary_path(), b"exe").unwrap();
        std::fs::write(layout.data_path(), b"pck").unwrap();

        let config = LauncherConfig {
            default_host: "play.example.com".to_string(),
            default_port: 7777,
            ..Default::default()
        };
        let plan = LaunchPlan::prepare(&layout, &config).await.unwrap();
        assert_eq!(plan.program, layout.binary_path());
        assert_eq!(
            plan.args,
            vec!["--mode=client", "--host=play.example.com", "--port=7777"]
        );
        assert_eq!(plan.working_dir, dir.path());
    }
}
