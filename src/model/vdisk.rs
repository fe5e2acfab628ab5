use super::ids::{DcId, GroupId, PDiskId, VDiskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VDiskState {
    Active,
    Faulty,
    Replicating,
    Replicated,
}

impl VDiskState {
    /// Faulty and Replicating copies do not currently hold durable data.
    pub(crate) const fn is_impaired(self) -> bool {
        matches!(self, Self::Faulty | Self::Replicating)
    }
}

/// A virtual disk: one replica of a group's data, placed on a single PDisk.
#[derive(Debug, Clone)]
pub(crate) struct VDisk {
    id: VDiskId,
    pdisk_id: PDiskId,
    dc_id: DcId,
    group_id: Option<GroupId>,
    state: VDiskState,
    replication_triggered: bool,
    replication_complete_time: Option<f64>,
}

impl VDisk {
    pub(crate) const fn new(id: VDiskId, pdisk_id: PDiskId, dc_id: DcId) -> Self {
        Self {
            id,
            pdisk_id,
            dc_id,
            group_id: None,
            state: VDiskState::Active,
            replication_triggered: false,
            replication_complete_time: None,
        }
    }

    pub(crate) const fn id(&self) -> VDiskId {
        self.id
    }

    pub(crate) const fn pdisk_id(&self) -> PDiskId {
        self.pdisk_id
    }

    pub(crate) const fn dc_id(&self) -> DcId {
        self.dc_id
    }

    pub(crate) const fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    pub(crate) const fn state(&self) -> VDiskState {
        self.state
    }

    pub(crate) const fn replication_triggered(&self) -> bool {
        self.replication_triggered
    }

    pub(crate) const fn replication_complete_time(&self) -> Option<f64> {
        self.replication_complete_time
    }

    pub(crate) fn assign_to_group(&mut self, group_id: GroupId) {
        self.group_id = Some(group_id);
    }

    /// The hosting PDisk failed. This is a new fault: any in-flight
    /// replication is forgotten and one fresh dispatch attempt is allowed.
    pub(crate) fn mark_faulty(&mut self) {
        self.state = VDiskState::Faulty;
        self.replication_triggered = false;
        self.replication_complete_time = None;
    }

    /// Record the single replication attempt for the current fault.
    ///
    /// With a completion time the VDisk starts replicating; without one it
    /// stays Faulty. Either way no further attempt is made for this fault.
    pub(crate) fn trigger_replication(&mut self, complete_time: Option<f64>) {
        if self.state != VDiskState::Faulty {
            return;
        }
        self.replication_triggered = true;
        if let Some(t) = complete_time {
            self.state = VDiskState::Replicating;
            self.replication_complete_time = Some(t);
        }
    }

    /// Finish replication if its deadline has passed. Returns whether the
    /// VDisk transitioned to Replicated.
    pub(crate) fn complete_replication(&mut self, now: f64) -> bool {
        match (self.state, self.replication_complete_time) {
            (VDiskState::Replicating, Some(done_at)) if done_at <= now => {
                self.state = VDiskState::Replicated;
                self.replication_complete_time = None;
                true
            }
            _ => false,
        }
    }

    /// Whether this copy was rebuilt, or is being rebuilt, onto a spare.
    pub(crate) const fn has_moved(&self) -> bool {
        matches!(self.state, VDiskState::Replicating | VDiskState::Replicated)
    }

    /// Allow a standing fault to be retried, used after its PDisk recovers.
    pub(crate) fn rearm_replication(&mut self) -> bool {
        if self.state == VDiskState::Faulty && self.replication_triggered {
            self.replication_triggered = false;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: VDiskState) {
        self.state = state;
    }
}
