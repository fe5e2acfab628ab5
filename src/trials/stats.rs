use super::driver::{TrialFailure, TrialReport, TrialResult};
use crate::simulation::{SimulationDiagnostics, TRIAL_DAYS};
use tracing::warn;

const DAYS: usize = TRIAL_DAYS as usize;

/// Cumulative per-day loss counters over every trial merged since the last
/// restart.
///
/// A trial that lost data on day `d` stays lost for all later days, so every
/// successful trial counts towards every day and both arrays are
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LossStatistics {
    pub total_sims_by_day: [u64; DAYS],
    pub data_loss_by_day: [u64; DAYS],
    pub total_sims: u64,
    /// Trials aborted by an internal error; never part of the estimate.
    pub failed_trials: u64,
}

impl Default for LossStatistics {
    fn default() -> Self {
        Self {
            total_sims_by_day: [0; DAYS],
            data_loss_by_day: [0; DAYS],
            total_sims: 0,
            failed_trials: 0,
        }
    }
}

/// What one merged batch contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BatchSummary {
    pub trials: u64,
    pub losses: u64,
    pub failures: Vec<TrialFailure>,
    pub diagnostics: SimulationDiagnostics,
}

impl LossStatistics {
    pub(crate) fn record(&mut self, report: &TrialReport) {
        let loss_day = report.outcome.loss_day().map(|d| d as usize);
        for day in 0..DAYS {
            self.total_sims_by_day[day] += 1;
            if loss_day.is_some_and(|lost| lost <= day) {
                self.data_loss_by_day[day] += 1;
            }
        }
        self.total_sims += 1;
    }

    /// Fold a joined batch into the counters. Order within the batch does not
    /// matter.
    pub(crate) fn merge_batch(&mut self, results: Vec<TrialResult>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for result in results {
            match result {
                Ok(report) => {
                    self.record(&report);
                    summary.trials += 1;
                    if report.outcome.loss_day().is_some() {
                        summary.losses += 1;
                    }
                    summary.diagnostics += report.diagnostics;
                }
                Err(failure) => {
                    warn!(seed = failure.seed, error = %failure.error, "Trial aborted");
                    self.failed_trials += 1;
                    summary.failures.push(failure);
                }
            }
        }
        summary
    }

    /// Cumulative probability of loss by the end of each day.
    pub(crate) fn probability_by_day(&self) -> Vec<f64> {
        self.total_sims_by_day
            .iter()
            .zip(&self.data_loss_by_day)
            .map(|(&total, &lost)| if total == 0 { 0.0 } else { lost as f64 / total as f64 })
            .collect()
    }

    /// Probability of losing data within the whole 30-day horizon.
    pub(crate) fn data_loss_probability(&self) -> f64 {
        let total = self.total_sims_by_day[DAYS - 1];
        if total == 0 {
            return 0.0;
        }
        self.data_loss_by_day[DAYS - 1] as f64 / total as f64
    }
}
