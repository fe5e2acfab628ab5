use crate::simulation::{
    SimError, Simulation, SimulationDiagnostics, SimulationParams, HOURS_PER_DAY, TRIAL_DAYS,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::debug;

/// How a completed trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrialOutcome {
    /// First day (0-based) on which some group lost data.
    Lost(u32),
    Survived,
}

impl TrialOutcome {
    pub(crate) const fn loss_day(self) -> Option<u32> {
        match self {
            Self::Lost(day) => Some(day),
            Self::Survived => None,
        }
    }
}

/// A finished trial together with the seed that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrialReport {
    pub seed: u64,
    pub outcome: TrialOutcome,
    pub diagnostics: SimulationDiagnostics,
}

/// A trial that was aborted by an internal error.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrialFailure {
    pub seed: u64,
    pub error: SimError,
}

pub(crate) type TrialResult = Result<TrialReport, TrialFailure>;

/// Drive an already constructed simulation for up to 30 days, stopping at the
/// first day on which a group is newly found lost.
pub(crate) fn run_simulation(sim: &mut Simulation) -> Result<TrialOutcome, SimError> {
    for day in 0..TRIAL_DAYS {
        let lost_at_day_start = sim.lost_groups().len();
        for _ in 0..HOURS_PER_DAY {
            sim.simulate_hour()?;
            if sim.lost_groups().len() > lost_at_day_start {
                debug!(day, time = sim.current_time(), "Trial lost data");
                return Ok(TrialOutcome::Lost(day));
            }
        }
    }
    Ok(TrialOutcome::Survived)
}

/// Run one complete trial from a fresh fabric.
pub(crate) fn run_trial(params: SimulationParams, seed: u64) -> TrialResult {
    let mut sim = Simulation::new(params, seed);
    match run_simulation(&mut sim) {
        Ok(outcome) => Ok(TrialReport { seed, outcome, diagnostics: sim.diagnostics() }),
        Err(error) => Err(TrialFailure { seed, error }),
    }
}

/// Mix a batch base seed with a trial index into an independent stream seed
/// (splitmix64 finalizer).
pub(crate) const fn trial_seed(base: u64, index: u64) -> u64 {
    let mut z = base.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Default worker count: every hardware thread but one, at least one.
pub(crate) fn default_worker_count() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get().saturating_sub(1)).max(1)
}

/// A fixed-size pool that runs batches of independent trials.
///
/// Each batch forks one task per seed and joins them all before returning;
/// nothing outlives the call.
pub(crate) struct TrialPool {
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for TrialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrialPool").field("workers", &self.workers()).finish()
    }
}

impl TrialPool {
    pub(crate) fn new(workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("trial-worker-{i}"))
            .build()
            .context("Failed to build trial worker pool")?;
        Ok(Self { pool })
    }

    pub(crate) fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run one trial per seed and return the results in seed order.
    pub(crate) fn run_batch(&self, params: SimulationParams, seeds: &[u64]) -> Vec<TrialResult> {
        self.pool.install(|| seeds.par_iter().map(|&seed| run_trial(params, seed)).collect())
    }
}
