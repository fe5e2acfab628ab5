use super::ids::{GroupId, PDiskId, VDiskId};
use thiserror::Error;

/// Internal consistency failures that abort a single trial.
///
/// Saturation (no healthy disk left to fail, no spare to replicate onto) is a
/// legitimate state of the fabric and is never reported through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum SimError {
    #[error("trial exceeded the limit of {limit} hourly ticks")]
    IterationLimit { limit: u32 },

    #[error("pdisk {pdisk} referenced by vdisk {vdisk:?} is not in the topology")]
    UnknownPDisk { pdisk: PDiskId, vdisk: Option<VDiskId> },

    #[error("vdisk {vdisk} referenced by group {group:?} is not in the topology")]
    UnknownVDisk { vdisk: VDiskId, group: Option<GroupId> },
}
