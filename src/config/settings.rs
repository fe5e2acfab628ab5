use super::defaults::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONFIG_PATH, DEFAULT_EVENT_CAPACITY, DEFAULT_PORT,
    DEFAULT_WORKER_THREADS,
};
use crate::simulation::SimulationParams;
use crate::trials::default_worker_count;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AppConfig {
    pub port: u16,
    pub config_path: String,
    /// Trial worker threads. 0 = hardware threads minus one.
    pub worker_threads: usize,
    /// Trials per batch. 0 = one per worker.
    pub batch_size: usize,
    /// Fixed base seed for reproducible runs; drawn from OS entropy when unset.
    pub seed: Option<u64>,
    pub event_capacity: usize,
    /// Fabric parameters the daemon starts with.
    pub params: SimulationParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            worker_threads: DEFAULT_WORKER_THREADS,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            params: SimulationParams::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration, merging defaults with config file values and env overrides.
    pub(crate) fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("FD_CONFIG_PATH") {
            config.config_path = path;
        }

        let cfg_path = Path::new(&config.config_path);
        if cfg_path.exists() {
            let contents = fs::read_to_string(cfg_path)
                .with_context(|| format!("Failed to read config file: {}", config.config_path))?;
            config.parse_ini(&contents);
        }

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("FD_PORT") {
            self.port = port.parse().context("FD_PORT must be a valid port number")?;
        }
        if let Ok(threads) = std::env::var("FD_WORKER_THREADS") {
            self.worker_threads =
                threads.parse().context("FD_WORKER_THREADS must be a non-negative integer")?;
        }
        if let Ok(seed) = std::env::var("FD_SEED") {
            self.seed = Some(seed.parse().context("FD_SEED must be an unsigned 64-bit integer")?);
        }
        Ok(())
    }

    /// Worker count after resolving the "auto" setting.
    pub(crate) fn effective_workers(&self) -> usize {
        if self.worker_threads == 0 {
            default_worker_count()
        } else {
            self.worker_threads
        }
    }

    /// Trials per batch after resolving the "one per worker" setting.
    pub(crate) fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            self.effective_workers()
        } else {
            self.batch_size
        }
    }
}
