use super::ids::{DcId, PDiskId, VDiskId};

/// Number of VDisk slots every PDisk offers.
pub(crate) const VDISK_SLOTS_PER_PDISK: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PDiskState {
    Active,
    Spare,
    Broken,
}

/// A physical disk, the unit of hardware failure.
#[derive(Debug, Clone)]
pub(crate) struct PDisk {
    id: PDiskId,
    dc_id: DcId,
    state: PDiskState,
    available_vdisk_slots: u32,
    /// Simulation hour of the most recent failure, zero while healthy.
    broken_time: f64,
    vdisks: Vec<VDiskId>,
}

impl PDisk {
    pub(crate) const fn new(id: PDiskId, dc_id: DcId, state: PDiskState) -> Self {
        let available_vdisk_slots =
            if matches!(state, PDiskState::Broken) { 0 } else { VDISK_SLOTS_PER_PDISK };
        Self { id, dc_id, state, available_vdisk_slots, broken_time: 0.0, vdisks: Vec::new() }
    }

    pub(crate) const fn id(&self) -> PDiskId {
        self.id
    }

    pub(crate) const fn dc_id(&self) -> DcId {
        self.dc_id
    }

    pub(crate) const fn state(&self) -> PDiskState {
        self.state
    }

    pub(crate) const fn is_broken(&self) -> bool {
        matches!(self.state, PDiskState::Broken)
    }

    pub(crate) const fn available_vdisk_slots(&self) -> u32 {
        self.available_vdisk_slots
    }

    pub(crate) const fn broken_time(&self) -> f64 {
        self.broken_time
    }

    /// VDisks placed on this disk at topology construction.
    pub(crate) fn vdisks(&self) -> &[VDiskId] {
        &self.vdisks
    }

    pub(crate) fn host_vdisk(&mut self, vdisk: VDiskId) {
        self.vdisks.push(vdisk);
    }

    /// Forget VDisks whose data now lives on another disk.
    pub(crate) fn release_vdisks(&mut self, moved: &[VDiskId]) {
        self.vdisks.retain(|id| !moved.contains(id));
    }

    /// Claim one slot for an incoming replica. Returns `false` when the disk
    /// is broken or has no free slot left.
    pub(crate) fn take_slot(&mut self) -> bool {
        if self.is_broken() || self.available_vdisk_slots == 0 {
            return false;
        }
        self.available_vdisk_slots -= 1;
        true
    }

    /// Mark the disk broken at `now`. Returns `false` if it already was.
    ///
    /// Cascading the failure to hosted VDisks is the caller's job, since the
    /// VDisks live in the simulation's arena.
    pub(crate) fn fail(&mut self, now: f64) -> bool {
        if self.is_broken() {
            return false;
        }
        self.state = PDiskState::Broken;
        self.available_vdisk_slots = 0;
        self.broken_time = now;
        true
    }

    /// Bring a broken disk back as an empty spare.
    pub(crate) fn recover(&mut self) -> bool {
        if !self.is_broken() {
            return false;
        }
        self.state = PDiskState::Spare;
        self.available_vdisk_slots = VDISK_SLOTS_PER_PDISK;
        self.broken_time = 0.0;
        true
    }
}
