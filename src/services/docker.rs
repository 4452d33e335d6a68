//! Docker-backed health check for the PlantUML rendering container.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::core::config::PlantumlConfig;

use super::HealthCheck;

/// Failure to bring the backing container up at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("docker is not installed or not on PATH")]
    DockerMissing,

    #[error("failed to launch container '{container}': {detail}")]
    Launch { container: String, detail: String },

    #[error("container '{container}' did not become ready within {timeout:?}")]
    Timeout {
        container: String,
        timeout: Duration,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Manages the lifecycle of one named container.
pub struct DockerService {
    container_name: String,
    image: String,
    port: u16,
    startup_timeout: Duration,
}

impl DockerService {
    pub fn new(config: &PlantumlConfig) -> Self {
        Self {
            container_name: config.container_name.clone(),
            image: config.image.clone(),
            port: config.port,
            startup_timeout: Duration::from_secs(config.startup_timeout_secs),
        }
    }

    async fn check_install(&self) -> Result<(), StartupError> {
        let status = Command::new("docker").arg("--version").output().await;
        match status {
            Ok(output) if output.status.success() => Ok(()),
            _ => Err(StartupError::DockerMissing),
        }
    }

    /// Launch the container, falling back to `docker start` when the name
    /// is already taken by a stopped container. The name conflict is also
    /// what makes concurrent `ensure_started` calls safe: at most one
    /// `docker run` wins, the others restart or observe the same container.
    async fn launch(&self) -> Result<(), StartupError> {
        let publish = format!("{}:8080", self.port);
        let run = Command::new("docker")
            .args([
                "run",
                "-d",
                "-p",
                &publish,
                "--name",
                &self.container_name,
                &self.image,
            ])
            .output()
            .await?;
        if run.status.success() {
            info!(container = %self.container_name, "launched container");
            return Ok(());
        }

        debug!(container = %self.container_name, "docker run failed, trying docker start");
        let start = Command::new("docker")
            .args(["start", &self.container_name])
            .output()
            .await?;
        if start.status.success() {
            info!(container = %self.container_name, "restarted existing container");
            return Ok(());
        }

        Err(StartupError::Launch {
            container: self.container_name.clone(),
            detail: String::from_utf8_lossy(&run.stderr).trim().to_string(),
        })
    }

    async fn wait_until_ready(&self) -> Result<(), StartupError> {
        let deadline = tokio::time::Instant::now() + self.startup_timeout;
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if self.is_ready().await {
                return Ok(());
            }
        }
        warn!(container = %self.container_name, "timed out waiting for container");
        Err(StartupError::Timeout {
            container: self.container_name.clone(),
            timeout: self.startup_timeout,
        })
    }
}

#[async_trait]
impl HealthCheck for DockerService {
    async fn is_ready(&self) -> bool {
        let name_filter = format!("name={}", self.container_name);
        let output = Command::new("docker")
            .args([
                "ps",
                "--filter",
                &name_filter,
                "--filter",
                "status=running",
                "--format",
                "{{.Names}}",
            ])
            .output()
            .await;
        match output {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).contains(&self.container_name)
            }
            Ok(output) => {
                warn!(
                    container = %self.container_name,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "docker ps failed"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, "could not run docker ps");
                false
            }
        }
    }

    async fn ensure_started(&self) -> Result<(), StartupError> {
        if self.is_ready().await {
            return Ok(());
        }
        self.check_install().await?;
        self.launch().await?;
        self.wait_until_ready().await
    }
}
