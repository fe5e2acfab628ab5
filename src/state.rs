use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::events::EventHub;
use crate::simulation::SimulationParams;
use crate::trials::LossStatistics;

/// Shared application state passed to all API handlers via axum's State extractor.
pub(crate) struct AppState {
    pub config: AppConfig,
    pub event_hub: EventHub,
    pub status: tokio::sync::RwLock<RunnerStatus>,
    /// Parameters requested by the presentation side, tagged with a generation
    /// that bumps on every restart request.
    requested: tokio::sync::RwLock<RequestedParams>,
    /// Statistics of the current run. Only the runner writes here.
    pub results: tokio::sync::RwLock<RunResults>,
    /// Stops the runner at the next batch boundary.
    pub shutdown: CancellationToken,
    /// Handle to the trial runner task.
    pub runner_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RequestedParams {
    pub params: SimulationParams,
    pub generation: u64,
}

impl AppState {
    pub(crate) fn new(config: AppConfig, event_hub: EventHub) -> Self {
        let params = config.params;
        Self {
            config,
            event_hub,
            status: tokio::sync::RwLock::new(RunnerStatus::starting()),
            requested: tokio::sync::RwLock::new(RequestedParams { params, generation: 0 }),
            results: tokio::sync::RwLock::new(RunResults::new(params)),
            shutdown: CancellationToken::new(),
            runner_task: tokio::sync::Mutex::new(None),
        }
    }

    pub(crate) async fn requested(&self) -> RequestedParams {
        *self.requested.read().await
    }

    /// Ask the runner to discard its statistics and start over, optionally
    /// with new parameters. Takes effect at the next batch boundary.
    pub(crate) async fn request_restart(&self, params: Option<SimulationParams>) -> u64 {
        let mut requested = self.requested.write().await;
        if let Some(p) = params {
            requested.params = p;
        }
        requested.generation += 1;
        requested.generation
    }
}

/// The runner's operating state, serialized to the API as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RunnerState {
    Starting,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunnerStatus {
    pub state: RunnerState,
    pub detail: Option<String>,
}

impl RunnerStatus {
    pub(crate) const fn starting() -> Self {
        Self { state: RunnerState::Starting, detail: None }
    }

    pub(crate) fn running(detail: impl Into<String>) -> Self {
        Self { state: RunnerState::Running, detail: Some(detail.into()) }
    }

    pub(crate) fn stopped(detail: impl Into<String>) -> Self {
        Self { state: RunnerState::Stopped, detail: Some(detail.into()) }
    }
}

/// Statistics of one run: everything merged since the last restart.
#[derive(Debug, Clone)]
pub(crate) struct RunResults {
    pub run_id: Uuid,
    pub params: SimulationParams,
    pub started_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub stats: LossStatistics,
}

impl RunResults {
    pub(crate) fn new(params: SimulationParams) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            params,
            started_at: Utc::now(),
            updated_at: None,
            stats: LossStatistics::default(),
        }
    }
}
