mod driver;
mod stats;

pub(crate) use driver::{
    default_worker_count, run_simulation, run_trial, trial_seed, TrialFailure, TrialOutcome,
    TrialPool, TrialReport, TrialResult,
};
pub(crate) use stats::{BatchSummary, LossStatistics};
