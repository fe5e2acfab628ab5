use super::error::SimError;
use super::ids::{DcId, GroupId, VDiskId, DC_COUNT};
use super::vdisk::VDisk;
use std::collections::BTreeSet;

/// Replicas a group keeps in each datacenter.
pub(crate) const VDISKS_PER_DC_IN_GROUP: usize = 3;

/// Total replicas in a group.
pub(crate) const VDISKS_PER_GROUP: usize = VDISKS_PER_DC_IN_GROUP * DC_COUNT;

/// Decide whether a group with the given per-datacenter counts of impaired
/// (Faulty or Replicating) replicas has lost data.
///
/// With the counts sorted as `a >= b >= c`, data is lost once a whole
/// datacenter is impaired (`a == 3`), or once one datacenter has two impaired
/// replicas while both other datacenters are impaired as well (`a >= 2 && c >= 1`).
/// `b >= 2 && a >= 3` is subsumed by `a == 3`.
pub(crate) fn is_data_lost(impaired_by_dc: [usize; DC_COUNT]) -> bool {
    let mut sorted = impaired_by_dc;
    sorted.sort_unstable_by(|x, y| y.cmp(x));
    let [a, b, c] = sorted;

    a == VDISKS_PER_DC_IN_GROUP || (b >= 2 && a >= 3) || (a >= 2 && c >= 1)
}

/// A redundancy unit of nine VDisks, three per datacenter, each on its own PDisk.
///
/// The group only indexes its members; the VDisks themselves live in the
/// simulation's arena.
#[derive(Debug, Clone)]
pub(crate) struct Group {
    id: GroupId,
    members: BTreeSet<VDiskId>,
    vdisks_by_dc: [Vec<VDiskId>; DC_COUNT],
}

impl Group {
    pub(crate) fn new(id: GroupId) -> Self {
        Self { id, members: BTreeSet::new(), vdisks_by_dc: Default::default() }
    }

    pub(crate) const fn id(&self) -> GroupId {
        self.id
    }

    pub(crate) fn add_vdisk(&mut self, vdisk: VDiskId, dc_id: DcId) {
        if self.members.insert(vdisk) {
            self.vdisks_by_dc[dc_id.index()].push(vdisk);
        }
    }

    pub(crate) const fn members(&self) -> &BTreeSet<VDiskId> {
        &self.members
    }

    pub(crate) fn vdisks_in_dc(&self, dc_id: DcId) -> &[VDiskId] {
        &self.vdisks_by_dc[dc_id.index()]
    }

    /// Count impaired members per datacenter.
    pub(crate) fn impaired_by_dc(&self, vdisks: &[VDisk]) -> Result<[usize; DC_COUNT], SimError> {
        let mut counts = [0usize; DC_COUNT];
        for dc in DcId::ALL {
            for &vdisk_id in self.vdisks_in_dc(dc) {
                let vdisk = vdisks
                    .get(vdisk_id.index())
                    .ok_or(SimError::UnknownVDisk { vdisk: vdisk_id, group: Some(self.id) })?;
                if vdisk.state().is_impaired() {
                    counts[dc.index()] += 1;
                }
            }
        }
        Ok(counts)
    }

    /// Evaluate the data-loss predicate against the current VDisk states.
    /// Reads only; repeated calls on unchanged state agree.
    pub(crate) fn check_data_loss(&self, vdisks: &[VDisk]) -> Result<bool, SimError> {
        self.impaired_by_dc(vdisks).map(is_data_lost)
    }
}
