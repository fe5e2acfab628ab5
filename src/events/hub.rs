use crate::simulation::{SimulationDiagnostics, SimulationParams};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events that flow from the trial runner to SSE subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub(crate) enum Event {
    /// A batch of trials has been merged into the running statistics.
    BatchComplete {
        run_id: Uuid,
        batch_trials: u64,
        batch_losses: u64,
        total_sims: u64,
        failed_trials: u64,
        /// Cumulative probability of data loss within 30 days.
        probability: f64,
        diagnostics: SimulationDiagnostics,
    },

    /// Statistics were discarded and a new run started.
    StatisticsReset { run_id: Uuid, params: SimulationParams },

    /// A single trial hit an internal error and was left out of the estimate.
    TrialAborted { run_id: Uuid, seed: u64, error: String },

    /// A generic error event.
    DaemonError { message: String },
}

impl Event {
    /// Returns the SSE event type name for this event variant.
    pub(crate) const fn event_type(&self) -> &'static str {
        match self {
            Self::BatchComplete { .. } => "batch_complete",
            Self::StatisticsReset { .. } => "statistics_reset",
            Self::TrialAborted { .. } => "trial_aborted",
            Self::DaemonError { .. } => "daemon_error",
        }
    }
}

/// The central event broadcast hub.
///
/// The runner publishes via `publish()`; SSE handlers subscribe via
/// `subscribe()` and forward events to the client.
#[derive(Debug, Clone)]
pub(crate) struct EventHub {
    sender: broadcast::Sender<Event>,
}

impl EventHub {
    /// Subscribers that fall more than `capacity` events behind receive a
    /// `Lagged` error and miss intermediate events.
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Errs when nobody is subscribed, which callers ignore.
    pub(crate) fn publish(
        &self,
        event: Event,
    ) -> Result<usize, broadcast::error::SendError<Event>> {
        self.sender.send(event)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}
