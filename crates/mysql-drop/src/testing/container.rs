//! Docker container management for drop benchmarks

use crate::config::MySQLConfig;
use anyhow::{Context, Result};
use clap::ValueEnum;
use mysql_async::prelude::*;
use std::fmt;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// MySQL server versions the benchmark is run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MySQLImage {
    #[value(name = "8.2.0")]
    Mysql8_2_0,
    #[value(name = "8.0.35")]
    Mysql8_0_35,
    #[value(name = "5.7.44")]
    Mysql5_7_44,
}

impl MySQLImage {
    pub fn tag(&self) -> &'static str {
        match self {
            MySQLImage::Mysql8_2_0 => "8.2.0",
            MySQLImage::Mysql8_0_35 => "8.0.35",
            MySQLImage::Mysql5_7_44 => "5.7.44",
        }
    }

    pub fn image_name(&self) -> String {
        format!("docker.io/mysql:{}", self.tag())
    }
}

impl fmt::Display for MySQLImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A disposable MySQL server, stopped and removed when dropped
pub struct MySQLContainer {
    /// Container name
    pub container_name: String,
    /// Host port mapped to the container's 3306
    pub host_port: u16,
    pub image: MySQLImage,
    config: MySQLConfig,
}

impl MySQLContainer {
    pub fn new(container_name: &str, image: MySQLImage, host_port: u16) -> Self {
        Self {
            container_name: container_name.to_string(),
            host_port,
            image,
            config: MySQLConfig::root("127.0.0.1", host_port),
        }
    }

    /// Connection settings for the running container
    pub fn config(&self) -> &MySQLConfig {
        &self.config
    }

    /// Starts the MySQL container
    pub fn start(&self) -> Result<()> {
        info!(
            "Starting MySQL {} container: {}",
            self.image, self.container_name
        );

        // Remove leftovers from an earlier run with the same name
        let _ = Command::new("docker")
            .args(["rm", "-f", &self.container_name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        let output = Command::new("docker")
            .args([
                "run",
                "--name",
                &self.container_name,
                "-e",
                &format!("MYSQL_ROOT_PASSWORD={}", self.config.password),
                "-e",
                &format!("MYSQL_DATABASE={}", self.config.database),
                "-p",
                &format!("{}:3306", self.host_port),
                "-d",
                &self.image.image_name(),
            ])
            .output()
            .context("Failed to start Docker container")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to start container: {stderr}");
        }

        let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("Started container: {}", container_id);

        Ok(())
    }

    /// Waits for MySQL to be ready to accept connections
    pub async fn wait_until_ready(&self, timeout_secs: u64) -> Result<()> {
        info!("Waiting for MySQL to be ready...");

        let start = Instant::now();
        let timeout = Duration::from_secs(timeout_secs);

        while start.elapsed() < timeout {
            match self.test_connection().await {
                Ok(_) => {
                    info!("MySQL is ready after {:?}", start.elapsed());
                    return Ok(());
                }
                Err(e) => {
                    debug!("Connection attempt failed: {}", e);
                    tokio::time::sleep(Duration::from_millis(1000)).await;
                }
            }
        }

        anyhow::bail!("MySQL did not become ready within {timeout_secs} seconds")
    }

    async fn test_connection(&self) -> Result<()> {
        let pool = self.get_pool();
        let mut conn = pool.get_conn().await.context("Failed to get connection")?;

        let _: Option<i32> = conn
            .query_first("SELECT 1")
            .await
            .context("Failed to execute test query")?;

        drop(conn);
        pool.disconnect()
            .await
            .context("Failed to disconnect pool")?;

        Ok(())
    }

    /// Gets a connection pool for the container
    pub fn get_pool(&self) -> mysql_async::Pool {
        mysql_async::Pool::new(self.config.opts())
    }

    /// Stops and removes the container
    pub fn stop(&self) -> Result<()> {
        info!("Stopping container: {}", self.container_name);

        let output = Command::new("docker")
            .args(["rm", "-f", &self.container_name])
            .output()
            .context("Failed to remove container")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("Failed to remove container (may not exist): {}", stderr);
        }

        info!("Container stopped and removed");
        Ok(())
    }

    /// Gets logs from the container
    pub fn get_logs(&self) -> Result<String> {
        let output = Command::new("docker")
            .args(["logs", &self.container_name])
            .output()
            .context("Failed to get container logs")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        Ok(format!("STDOUT:\n{stdout}\n\nSTDERR:\n{stderr}"))
    }
}

impl Drop for MySQLContainer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to clean up container {}: {e:#}", self.container_name);
        }
    }
}
