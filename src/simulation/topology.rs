use super::params::SimulationParams;
use crate::model::{
    DcId, Group, GroupId, PDisk, PDiskId, PDiskState, VDisk, VDiskId, DC_COUNT,
    VDISKS_PER_DC_IN_GROUP, VDISKS_PER_GROUP, VDISK_SLOTS_PER_PDISK,
};
use std::collections::HashSet;

/// The arenas of one freshly built fabric. Every id equals its entity's
/// position in the owning vector.
#[derive(Debug, Default)]
pub(crate) struct Topology {
    pub pdisks: Vec<PDisk>,
    pub vdisks: Vec<VDisk>,
    pub groups: Vec<Group>,
    pub pdisks_by_dc: [Vec<PDiskId>; DC_COUNT],
}

/// Build PDisks, VDisks and groups for the given disk counts.
///
/// Each datacenter gets `disks_per_dc` active PDisks followed by
/// `spare_disks_per_dc` spares, every one hosting a full complement of
/// VDisks. Groups take three VDisks per datacenter from three PDisks that no
/// other group uses, scanning in ascending id order, so the result is
/// `disks_per_dc / 3` groups and is identical for identical inputs.
pub(crate) fn build(params: &SimulationParams) -> Topology {
    let mut topo = Topology::default();
    let mut vdisks_by_dc: [Vec<VDiskId>; DC_COUNT] = Default::default();

    for dc in DcId::ALL {
        let total = params.disks_per_dc + params.spare_disks_per_dc;
        for i in 0..total {
            let state =
                if i < params.disks_per_dc { PDiskState::Active } else { PDiskState::Spare };
            let pdisk_id = PDiskId::from_raw(topo.pdisks.len() as u32);
            let mut pdisk = PDisk::new(pdisk_id, dc, state);

            for _ in 0..VDISK_SLOTS_PER_PDISK {
                let vdisk_id = VDiskId::from_raw(topo.vdisks.len() as u32);
                topo.vdisks.push(VDisk::new(vdisk_id, pdisk_id, dc));
                pdisk.host_vdisk(vdisk_id);
                vdisks_by_dc[dc.index()].push(vdisk_id);
            }

            topo.pdisks.push(pdisk);
            topo.pdisks_by_dc[dc.index()].push(pdisk_id);
        }
    }

    form_groups(&mut topo, &vdisks_by_dc);
    topo
}

/// Cursor over one datacenter's VDisks in ascending id order.
///
/// A candidate that is skipped never becomes eligible again: it either joined
/// a group, or its PDisk is a spare or already backs a group. That keeps the
/// scan monotonic.
struct DcPicker<'a> {
    candidates: &'a [VDiskId],
    cursor: usize,
    used_pdisks: HashSet<PDiskId>,
}

impl<'a> DcPicker<'a> {
    fn new(candidates: &'a [VDiskId]) -> Self {
        Self { candidates, cursor: 0, used_pdisks: HashSet::new() }
    }

    fn pick(&mut self, pdisks: &[PDisk], vdisks: &[VDisk]) -> Option<[VDiskId; 3]> {
        let mut picked = Vec::with_capacity(VDISKS_PER_DC_IN_GROUP);
        let mut picked_pdisks = Vec::with_capacity(VDISKS_PER_DC_IN_GROUP);

        while picked.len() < VDISKS_PER_DC_IN_GROUP {
            let &vdisk_id = self.candidates.get(self.cursor)?;
            self.cursor += 1;

            let vdisk = &vdisks[vdisk_id.index()];
            let pdisk_id = vdisk.pdisk_id();
            let eligible = vdisk.group_id().is_none()
                && pdisks[pdisk_id.index()].state() == PDiskState::Active
                && !self.used_pdisks.contains(&pdisk_id)
                && !picked_pdisks.contains(&pdisk_id);

            if eligible {
                picked.push(vdisk_id);
                picked_pdisks.push(pdisk_id);
            }
        }

        self.used_pdisks.extend(picked_pdisks);
        picked.try_into().ok()
    }
}

fn form_groups(topo: &mut Topology, vdisks_by_dc: &[Vec<VDiskId>; DC_COUNT]) {
    let mut pickers = vdisks_by_dc.each_ref().map(|ids| DcPicker::new(ids));

    loop {
        let mut round: Vec<(DcId, [VDiskId; 3])> = Vec::with_capacity(DC_COUNT);
        for dc in DcId::ALL {
            match pickers[dc.index()].pick(&topo.pdisks, &topo.vdisks) {
                Some(ids) => round.push((dc, ids)),
                None => return,
            }
        }

        let group_id = GroupId::from_raw(topo.groups.len() as u32);
        let mut group = Group::new(group_id);
        for (dc, ids) in round {
            for vdisk_id in ids {
                topo.vdisks[vdisk_id.index()].assign_to_group(group_id);
                group.add_vdisk(vdisk_id, dc);
            }
        }
        debug_assert_eq!(group.members().len(), VDISKS_PER_GROUP);
        topo.groups.push(group);
    }
}
