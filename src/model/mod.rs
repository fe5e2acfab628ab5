mod error;
mod group;
mod ids;
mod pdisk;
mod vdisk;

pub(crate) use error::SimError;
pub(crate) use group::{is_data_lost, Group, VDISKS_PER_DC_IN_GROUP, VDISKS_PER_GROUP};
pub(crate) use ids::{DcId, GroupId, PDiskId, VDiskId, DC_COUNT};
pub(crate) use pdisk::{PDisk, PDiskState, VDISK_SLOTS_PER_PDISK};
pub(crate) use vdisk::{VDisk, VDiskState};
