use crate::simulation::SimulationParams;
use crate::state::RunResults;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) const fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub(crate) fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

/// Request body for POST /api/params. Omitted fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ParamsUpdateRequest {
    pub disks_per_dc: Option<u32>,
    pub disk_size_gb: Option<u32>,
    pub failure_rate_per_day: Option<u32>,
    pub spare_disks_per_dc: Option<u32>,
    pub write_speed_mbps: Option<u32>,
    pub pdisk_recovery_hours: Option<u32>,
}

impl ParamsUpdateRequest {
    pub(crate) fn apply(&self, mut params: SimulationParams) -> SimulationParams {
        if let Some(v) = self.disks_per_dc {
            params.disks_per_dc = v;
        }
        if let Some(v) = self.disk_size_gb {
            params.disk_size_gb = v;
        }
        if let Some(v) = self.failure_rate_per_day {
            params.failure_rate_per_day = v;
        }
        if let Some(v) = self.spare_disks_per_dc {
            params.spare_disks_per_dc = v;
        }
        if let Some(v) = self.write_speed_mbps {
            params.write_speed_mbps = v;
        }
        if let Some(v) = self.pdisk_recovery_hours {
            params.pdisk_recovery_hours = v;
        }
        params
    }
}

/// Reply to parameter changes and restarts.
#[derive(Debug, Serialize)]
pub(crate) struct RestartResponse {
    pub generation: u64,
    pub params: SimulationParams,
    pub persisted: bool,
}

/// Runner summary returned by the status endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse {
    pub state: crate::RunnerState,
    pub detail: Option<String>,
    pub version: String,
    pub workers: usize,
    pub batch_size: usize,
}

/// Everything the presentation layer needs to draw the loss curve.
#[derive(Debug, Serialize)]
pub(crate) struct ResultsResponse {
    pub run_id: Uuid,
    pub params: SimulationParams,
    pub started_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub total_sims: u64,
    pub failed_trials: u64,
    /// Cumulative probability of data loss within 30 days.
    pub data_loss_probability: f64,
    /// Cumulative probability of data loss by the end of each day, days 0 to 29.
    pub probability_by_day: Vec<f64>,
    pub data_loss_by_day: Vec<u64>,
    pub total_sims_by_day: Vec<u64>,
}

impl From<&RunResults> for ResultsResponse {
    fn from(run: &RunResults) -> Self {
        Self {
            run_id: run.run_id,
            params: run.params,
            started_at: run.started_at,
            updated_at: run.updated_at,
            total_sims: run.stats.total_sims,
            failed_trials: run.stats.failed_trials,
            data_loss_probability: run.stats.data_loss_probability(),
            probability_by_day: run.stats.probability_by_day(),
            data_loss_by_day: run.stats.data_loss_by_day.to_vec(),
            total_sims_by_day: run.stats.total_sims_by_day.to_vec(),
        }
    }
}
