use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub(crate) const DISKS_PER_DC_RANGE: RangeInclusive<u32> = 10..=1000;
pub(crate) const DISK_SIZE_GB_RANGE: RangeInclusive<u32> = 100..=16384;
pub(crate) const FAILURE_RATE_RANGE: RangeInclusive<u32> = 1..=100;
pub(crate) const SPARE_DISKS_PER_DC_RANGE: RangeInclusive<u32> = 1..=100;
pub(crate) const WRITE_SPEED_MBPS_RANGE: RangeInclusive<u32> = 50..=1000;

/// The knobs of one fabric configuration. Changing any of them invalidates
/// every statistic gathered so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SimulationParams {
    pub disks_per_dc: u32,
    pub disk_size_gb: u32,
    /// Failed disks per day across the whole fabric.
    pub failure_rate_per_day: u32,
    pub spare_disks_per_dc: u32,
    pub write_speed_mbps: u32,
    /// Hours until a broken PDisk returns as a spare. 0 disables recovery.
    #[serde(default)]
    pub pdisk_recovery_hours: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            disks_per_dc: 100,
            disk_size_gb: 4096,
            failure_rate_per_day: 3,
            spare_disks_per_dc: 10,
            write_speed_mbps: 100,
            pdisk_recovery_hours: 0,
        }
    }
}

impl SimulationParams {
    /// Hours needed to rebuild one VDisk onto a spare.
    pub(crate) fn replication_hours(&self) -> f64 {
        let size_mb = f64::from(self.disk_size_gb) * 1024.0;
        size_mb / f64::from(self.write_speed_mbps) / 3600.0
    }

    /// Expected number of PDisk failures in one simulated hour.
    pub(crate) fn failures_per_hour(&self) -> f64 {
        f64::from(self.failure_rate_per_day) / 24.0
    }

    pub(crate) const fn recovery_hours(&self) -> Option<u32> {
        if self.pdisk_recovery_hours == 0 {
            None
        } else {
            Some(self.pdisk_recovery_hours)
        }
    }

    /// Check the values a user may pick. The engine itself tolerates values
    /// outside these ranges.
    pub(crate) fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            DISKS_PER_DC_RANGE.contains(&self.disks_per_dc),
            "disks_per_dc must be between {} and {}",
            DISKS_PER_DC_RANGE.start(),
            DISKS_PER_DC_RANGE.end()
        );
        anyhow::ensure!(
            DISK_SIZE_GB_RANGE.contains(&self.disk_size_gb),
            "disk_size_gb must be between {} and {}",
            DISK_SIZE_GB_RANGE.start(),
            DISK_SIZE_GB_RANGE.end()
        );
        anyhow::ensure!(
            FAILURE_RATE_RANGE.contains(&self.failure_rate_per_day),
            "failure_rate_per_day must be between {} and {}",
            FAILURE_RATE_RANGE.start(),
            FAILURE_RATE_RANGE.end()
        );
        anyhow::ensure!(
            SPARE_DISKS_PER_DC_RANGE.contains(&self.spare_disks_per_dc),
            "spare_disks_per_dc must be between {} and {}",
            SPARE_DISKS_PER_DC_RANGE.start(),
            SPARE_DISKS_PER_DC_RANGE.end()
        );
        anyhow::ensure!(
            WRITE_SPEED_MBPS_RANGE.contains(&self.write_speed_mbps),
            "write_speed_mbps must be between {} and {}",
            WRITE_SPEED_MBPS_RANGE.start(),
            WRITE_SPEED_MBPS_RANGE.end()
        );
        Ok(())
    }
}
