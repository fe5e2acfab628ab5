use super::defaults::MAX_BATCH_SIZE;
use super::settings::AppConfig;
use anyhow::{Context, Result};

impl AppConfig {
    /// Validate configuration values are sane.
    pub(crate) fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.port > 0, "Port must be > 0");
        anyhow::ensure!(self.worker_threads <= 256, "worker_threads must be between 0 and 256");
        anyhow::ensure!(
            self.batch_size <= MAX_BATCH_SIZE,
            "batch_size must be between 0 and {MAX_BATCH_SIZE}"
        );
        anyhow::ensure!(self.event_capacity > 0, "event_capacity must be > 0");
        self.params.validate().context("Invalid simulation parameters")?;
        Ok(())
    }
}
