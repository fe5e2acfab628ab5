use super::settings::AppConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl AppConfig {
    /// Parse the simple KEY="VALUE" config format. Unparseable values keep
    /// their current setting.
    pub(crate) fn parse_ini(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "PORT" => set_parsed(&mut self.port, value),
                "WORKER_THREADS" => set_parsed(&mut self.worker_threads, value),
                "BATCH_SIZE" => set_parsed(&mut self.batch_size, value),
                "SEED" => {
                    if value.is_empty() {
                        self.seed = None;
                    } else if let Ok(v) = value.parse() {
                        self.seed = Some(v);
                    }
                }
                "EVENT_CAPACITY" => set_parsed(&mut self.event_capacity, value),
                "DISKS_PER_DC" => set_parsed(&mut self.params.disks_per_dc, value),
                "DISK_SIZE_GB" => set_parsed(&mut self.params.disk_size_gb, value),
                "FAILURE_RATE" => set_parsed(&mut self.params.failure_rate_per_day, value),
                "SPARE_DISKS_PER_DC" => set_parsed(&mut self.params.spare_disks_per_dc, value),
                "WRITE_SPEED_MBPS" => set_parsed(&mut self.params.write_speed_mbps, value),
                "PDISK_RECOVERY_HOURS" => {
                    set_parsed(&mut self.params.pdisk_recovery_hours, value);
                }
                _ => {} // Ignore unknown keys
            }
        }
    }

    /// Save current config back to the config file.
    pub(crate) fn save(&self) -> Result<()> {
        let seed = self.seed.map(|s| s.to_string()).unwrap_or_default();

        let contents = format!(
            r#"# fabric-durability configuration
# Auto-generated, parameter changes made through the API are written here
PORT="{}"
WORKER_THREADS="{}"
BATCH_SIZE="{}"
SEED="{}"
EVENT_CAPACITY="{}"
DISKS_PER_DC="{}"
DISK_SIZE_GB="{}"
FAILURE_RATE="{}"
SPARE_DISKS_PER_DC="{}"
WRITE_SPEED_MBPS="{}"
PDISK_RECOVERY_HOURS="{}"
"#,
            self.port,
            self.worker_threads,
            self.batch_size,
            seed,
            self.event_capacity,
            self.params.disks_per_dc,
            self.params.disk_size_gb,
            self.params.failure_rate_per_day,
            self.params.spare_disks_per_dc,
            self.params.write_speed_mbps,
            self.params.pdisk_recovery_hours,
        );

        if let Some(parent) = Path::new(&self.config_path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.config_path, contents)
            .with_context(|| format!("Failed to write config to {}", self.config_path))?;

        Ok(())
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, value: &str) {
    if let Ok(v) = value.parse() {
        *slot = v;
    }
}
