mod seeder;

pub(crate) use seeder::BatchSeeder;

use crate::events::Event;
use crate::simulation::SimulationParams;
use crate::state::{AppState, RunResults, RunnerStatus};
use crate::trials::{BatchSummary, TrialPool, TrialResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Run trial batches until shutdown is requested.
///
/// Each iteration picks up the currently requested parameters, runs one
/// batch on the worker pool, and merges it unless a restart arrived while it
/// was running. Restarts and shutdown only take effect between batches.
pub(crate) async fn run(state: Arc<AppState>, pool: Arc<TrialPool>, batch_size: usize) {
    let mut seeder = BatchSeeder::new(state.config.seed);
    let mut active_generation = state.requested().await.generation;

    info!(workers = pool.workers(), batch_size, "Trial runner started");
    *state.status.write().await = RunnerStatus::running(format!(
        "{} workers, {} trials per batch",
        pool.workers(),
        batch_size
    ));

    while !state.shutdown.is_cancelled() {
        let requested = state.requested().await;
        if requested.generation != active_generation {
            reset_statistics(&state, requested.params).await;
            seeder.restart();
            active_generation = requested.generation;
        }

        let seeds = seeder.next_batch(batch_size);
        let batch_pool = Arc::clone(&pool);
        let params = requested.params;
        let joined =
            tokio::task::spawn_blocking(move || batch_pool.run_batch(params, &seeds)).await;

        let results = match joined {
            Ok(results) => results,
            Err(e) => {
                error!("Trial batch panicked: {}", e);
                let _ = state
                    .event_hub
                    .publish(Event::DaemonError { message: format!("Trial batch failed: {e}") });
                continue;
            }
        };

        if state.requested().await.generation != active_generation {
            debug!("Discarding batch finished after a restart request");
            continue;
        }

        merge_batch(&state, results).await;
    }

    *state.status.write().await = RunnerStatus::stopped("Shutdown requested");
    info!("Trial runner stopped");
}

/// Replace the current run with an empty one for `params`.
pub(crate) async fn reset_statistics(state: &AppState, params: SimulationParams) {
    let fresh = RunResults::new(params);
    let run_id = fresh.run_id;
    *state.results.write().await = fresh;

    info!(%run_id, ?params, "Statistics reset");
    let _ = state.event_hub.publish(Event::StatisticsReset { run_id, params });
}

/// Fold a joined batch into the shared statistics and announce it.
pub(crate) async fn merge_batch(state: &AppState, results: Vec<TrialResult>) -> BatchSummary {
    let mut run = state.results.write().await;
    let summary = run.stats.merge_batch(results);
    run.updated_at = Some(Utc::now());

    let run_id = run.run_id;
    let total_sims = run.stats.total_sims;
    let failed_trials = run.stats.failed_trials;
    let probability = run.stats.data_loss_probability();
    drop(run);

    debug!(
        trials = summary.trials,
        losses = summary.losses,
        total_sims,
        probability,
        "Batch merged"
    );

    if summary.diagnostics.saturated_hours > 0 {
        warn!(
            saturated_hours = summary.diagnostics.saturated_hours,
            "Failure injection saturated: almost every PDisk is broken"
        );
    }

    for failure in &summary.failures {
        let _ = state.event_hub.publish(Event::TrialAborted {
            run_id,
            seed: failure.seed,
            error: failure.error.to_string(),
        });
    }
    if !summary.failures.is_empty() {
        warn!(
            aborted = summary.failures.len(),
            failed_trials, "Trials aborted by internal errors, estimate excludes them"
        );
    }

    let _ = state.event_hub.publish(Event::BatchComplete {
        run_id,
        batch_trials: summary.trials,
        batch_losses: summary.losses,
        total_sims,
        failed_trials,
        probability,
        diagnostics: summary.diagnostics,
    });

    summary
}
