mod params;
mod topology;

pub(crate) use crate::model::SimError;
pub(crate) use params::SimulationParams;

use crate::model::{
    DcId, Group, GroupId, PDisk, PDiskId, PDiskState, VDisk, VDiskId, VDiskState, DC_COUNT,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::AddAssign;
use tracing::debug;

/// Days in one trial.
pub(crate) const TRIAL_DAYS: u32 = 30;

pub(crate) const HOURS_PER_DAY: u32 = 24;

/// Upper bound on hourly ticks a single trial may execute.
pub(crate) const MAX_TICKS: u32 = TRIAL_DAYS * HOURS_PER_DAY;

/// Counters describing what happened inside one trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) struct SimulationDiagnostics {
    pub failures_injected: u64,
    /// Hours in which failure injection gave up because no healthy PDisk was found.
    pub saturated_hours: u64,
    pub replications_started: u64,
    /// Faults whose single replication attempt found no spare slot.
    pub replications_without_spare: u64,
    pub replications_completed: u64,
    pub pdisks_recovered: u64,
}

impl AddAssign for SimulationDiagnostics {
    fn add_assign(&mut self, rhs: Self) {
        self.failures_injected += rhs.failures_injected;
        self.saturated_hours += rhs.saturated_hours;
        self.replications_started += rhs.replications_started;
        self.replications_without_spare += rhs.replications_without_spare;
        self.replications_completed += rhs.replications_completed;
        self.pdisks_recovered += rhs.pdisks_recovered;
    }
}

/// All state of one trial: the fabric, its clock and its random stream.
#[derive(Debug)]
pub(crate) struct Simulation {
    params: SimulationParams,
    rng: ChaCha8Rng,
    pdisks: Vec<PDisk>,
    vdisks: Vec<VDisk>,
    groups: Vec<Group>,
    pdisks_by_dc: [Vec<PDiskId>; DC_COUNT],
    /// VDisks with a scheduled replication, in dispatch order.
    replicating: Vec<VDiskId>,
    /// Groups found unrecoverable, with the hour of detection.
    lost_groups: BTreeMap<GroupId, f64>,
    current_time: f64,
    ticks: u32,
    diagnostics: SimulationDiagnostics,
}

impl Simulation {
    /// Build a fresh fabric for `params`, drawing randomness from `seed`.
    pub(crate) fn new(params: SimulationParams, seed: u64) -> Self {
        let mut sim = Self {
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pdisks: Vec::new(),
            vdisks: Vec::new(),
            groups: Vec::new(),
            pdisks_by_dc: Default::default(),
            replicating: Vec::new(),
            lost_groups: BTreeMap::new(),
            current_time: 0.0,
            ticks: 0,
            diagnostics: SimulationDiagnostics::default(),
        };
        sim.reset();
        sim
    }

    /// Rebuild the topology and rewind the clock. The random stream continues.
    pub(crate) fn reset(&mut self) {
        let topo = topology::build(&self.params);
        self.pdisks = topo.pdisks;
        self.vdisks = topo.vdisks;
        self.groups = topo.groups;
        self.pdisks_by_dc = topo.pdisks_by_dc;
        self.replicating.clear();
        self.lost_groups.clear();
        self.current_time = 0.0;
        self.ticks = 0;
        self.diagnostics = SimulationDiagnostics::default();
        debug!(
            pdisks = self.pdisks.len(),
            vdisks = self.vdisks.len(),
            groups = self.groups.len(),
            "Topology built"
        );
    }

    #[cfg(test)]
    pub(crate) fn pdisks(&self) -> &[PDisk] {
        &self.pdisks
    }

    #[cfg(test)]
    pub(crate) fn vdisks(&self) -> &[VDisk] {
        &self.vdisks
    }

    #[cfg(test)]
    pub(crate) fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub(crate) fn pdisks_in_dc(&self, dc: DcId) -> &[PDiskId] {
        &self.pdisks_by_dc[dc.index()]
    }

    pub(crate) const fn lost_groups(&self) -> &BTreeMap<GroupId, f64> {
        &self.lost_groups
    }

    pub(crate) const fn current_time(&self) -> f64 {
        self.current_time
    }

    pub(crate) const fn diagnostics(&self) -> SimulationDiagnostics {
        self.diagnostics
    }

    #[cfg(test)]
    pub(crate) fn pdisk(&self, id: PDiskId) -> Result<&PDisk, SimError> {
        self.pdisks.get(id.index()).ok_or(SimError::UnknownPDisk { pdisk: id, vdisk: None })
    }

    pub(crate) fn vdisk(&self, id: VDiskId) -> Result<&VDisk, SimError> {
        self.vdisks.get(id.index()).ok_or(SimError::UnknownVDisk { vdisk: id, group: None })
    }

    fn vdisk_mut(&mut self, id: VDiskId) -> Result<&mut VDisk, SimError> {
        self.vdisks.get_mut(id.index()).ok_or(SimError::UnknownVDisk { vdisk: id, group: None })
    }

    /// Advance the fabric by one hour: inject failures, recover disks, evaluate
    /// groups and dispatch replication, then finish due replications.
    pub(crate) fn simulate_hour(&mut self) -> Result<(), SimError> {
        if self.ticks >= MAX_TICKS {
            return Err(SimError::IterationLimit { limit: MAX_TICKS });
        }

        let failures = self.draw_failure_count();
        self.process_failures(failures)?;
        self.recover_pdisks()?;
        self.process_groups()?;
        self.complete_replications()?;

        self.current_time += 1.0;
        self.ticks += 1;
        Ok(())
    }

    /// Whole expected failures are certain; the fractional part is one
    /// Bernoulli draw.
    fn draw_failure_count(&mut self) -> u32 {
        let expected = self.params.failures_per_hour();
        let whole = expected.floor();
        let extra = u32::from(self.rng.gen::<f64>() < expected - whole);
        whole as u32 + extra
    }

    pub(crate) fn process_failures(&mut self, failures: u32) -> Result<(), SimError> {
        let max_attempts = self.pdisks.len();

        for _ in 0..failures {
            let mut target = None;
            for _ in 0..max_attempts {
                let candidate = self.rng.gen_range(0..self.pdisks.len());
                if !self.pdisks[candidate].is_broken() {
                    target = Some(self.pdisks[candidate].id());
                    break;
                }
            }

            let Some(pdisk_id) = target else {
                debug!(
                    time = self.current_time,
                    attempts = max_attempts,
                    "No healthy PDisk found, skipping remaining failures this hour"
                );
                self.diagnostics.saturated_hours += 1;
                break;
            };

            self.fail_pdisk(pdisk_id)?;
        }
        Ok(())
    }

    /// Break a PDisk now and fault every VDisk it hosts. Returns `false` if it
    /// was already broken.
    pub(crate) fn fail_pdisk(&mut self, pdisk_id: PDiskId) -> Result<bool, SimError> {
        let now = self.current_time;
        let pdisk = self
            .pdisks
            .get_mut(pdisk_id.index())
            .ok_or(SimError::UnknownPDisk { pdisk: pdisk_id, vdisk: None })?;
        if !pdisk.fail(now) {
            return Ok(false);
        }
        let dc = pdisk.dc_id();
        let hosted = pdisk.vdisks().to_vec();

        debug!(pdisk = %pdisk_id, %dc, time = now, vdisks = hosted.len(), "PDisk failed");
        for vdisk_id in hosted {
            self.vdisk_mut(vdisk_id)?.mark_faulty();
        }
        self.diagnostics.failures_injected += 1;
        Ok(true)
    }

    /// Return broken PDisks to the spare pool once their recovery delay has
    /// elapsed. No-op unless recovery is configured.
    fn recover_pdisks(&mut self) -> Result<(), SimError> {
        let Some(delay) = self.params.recovery_hours() else {
            return Ok(());
        };
        let now = self.current_time;

        let due: Vec<PDiskId> = self
            .pdisks
            .iter()
            .filter(|p| p.is_broken() && p.broken_time() + f64::from(delay) <= now)
            .map(PDisk::id)
            .collect();

        for pdisk_id in due {
            let pdisk = &mut self.pdisks[pdisk_id.index()];
            pdisk.recover();
            let hosted = pdisk.vdisks().to_vec();

            // Copies rebuilt (or rebuilding) elsewhere no longer live here and
            // must not fault with this disk again.
            let mut moved = Vec::new();
            for vdisk_id in hosted {
                let vdisk = self.vdisk_mut(vdisk_id)?;
                if vdisk.has_moved() {
                    moved.push(vdisk_id);
                } else {
                    vdisk.rearm_replication();
                }
            }
            self.pdisks[pdisk_id.index()].release_vdisks(&moved);

            self.diagnostics.pdisks_recovered += 1;
            debug!(pdisk = %pdisk_id, time = now, "PDisk recovered as spare");
        }
        Ok(())
    }

    fn process_groups(&mut self) -> Result<(), SimError> {
        for group_idx in 0..self.groups.len() {
            let group_id = self.groups[group_idx].id();
            if self.lost_groups.contains_key(&group_id) {
                continue;
            }

            if self.groups[group_idx].check_data_loss(&self.vdisks)? {
                debug!(group = %group_id, time = self.current_time, "Group lost data");
                self.lost_groups.insert(group_id, self.current_time);
                continue;
            }

            let mut pending = Vec::new();
            for &vdisk_id in self.groups[group_idx].members() {
                let vdisk = self.vdisk(vdisk_id)?;
                if vdisk.state() == VDiskState::Faulty && !vdisk.replication_triggered() {
                    pending.push(vdisk_id);
                }
            }

            for vdisk_id in pending {
                self.dispatch_replication(vdisk_id)?;
            }
        }
        Ok(())
    }

    /// Pick the spare in the VDisk's datacenter with the most free slots
    /// (first found on ties) and schedule the rebuild there.
    fn dispatch_replication(&mut self, vdisk_id: VDiskId) -> Result<(), SimError> {
        let dc = self.vdisk(vdisk_id)?.dc_id();

        let mut best: Option<(PDiskId, u32)> = None;
        for &pdisk_id in self.pdisks_in_dc(dc) {
            let pdisk = self
                .pdisks
                .get(pdisk_id.index())
                .ok_or(SimError::UnknownPDisk { pdisk: pdisk_id, vdisk: Some(vdisk_id) })?;
            if pdisk.state() != PDiskState::Spare {
                continue;
            }
            let slots = pdisk.available_vdisk_slots();
            match best {
                Some((_, best_slots)) if slots <= best_slots => {}
                _ => best = Some((pdisk_id, slots)),
            }
        }

        let target = best.filter(|&(_, slots)| slots > 0).map(|(id, _)| id);
        let complete_time = match target {
            Some(pdisk_id) if self.pdisks[pdisk_id.index()].take_slot() => {
                Some(self.current_time + self.params.replication_hours())
            }
            _ => None,
        };

        self.vdisk_mut(vdisk_id)?.trigger_replication(complete_time);
        match complete_time {
            Some(done_at) => {
                self.replicating.push(vdisk_id);
                self.diagnostics.replications_started += 1;
                debug!(vdisk = %vdisk_id, %dc, done_at, "Replication started");
            }
            None => {
                self.diagnostics.replications_without_spare += 1;
                debug!(vdisk = %vdisk_id, %dc, "No spare slot, fault left standing");
            }
        }
        Ok(())
    }

    fn complete_replications(&mut self) -> Result<(), SimError> {
        let now = self.current_time;
        let mut still_running = Vec::with_capacity(self.replicating.len());

        for vdisk_id in std::mem::take(&mut self.replicating) {
            let vdisk = self.vdisk_mut(vdisk_id)?;
            if vdisk.complete_replication(now) {
                debug!(vdisk = %vdisk.id(), time = now, "Replication completed");
                self.diagnostics.replications_completed += 1;
            } else if vdisk.replication_complete_time().is_some() {
                still_running.push(vdisk_id);
            }
        }

        self.replicating = still_running;
        Ok(())
    }
}
