use crate::api::responses::{ApiResponse, ParamsUpdateRequest, RestartResponse};
use crate::simulation::SimulationParams;
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn get_params(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<SimulationParams>> {
    Json(ApiResponse::ok(state.requested().await.params))
}

/// Change fabric parameters. Any accepted change restarts the statistics.
pub(crate) async fn update_params(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParamsUpdateRequest>,
) -> Json<ApiResponse<RestartResponse>> {
    let current = state.requested().await;
    let params = req.apply(current.params);

    if let Err(e) = params.validate() {
        return Json(ApiResponse::err(format!("Invalid parameters: {e}")));
    }

    if params == current.params {
        return Json(ApiResponse::ok(RestartResponse {
            generation: current.generation,
            params,
            persisted: false,
        }));
    }

    let generation = state.request_restart(Some(params)).await;
    info!(generation, ?params, "Parameters changed, restart requested");

    let mut config = state.config.clone();
    config.params = params;
    let persisted = match config.save() {
        Ok(()) => true,
        Err(e) => {
            warn!("Parameters applied but not saved: {:#}", e);
            false
        }
    };

    Json(ApiResponse::ok(RestartResponse { generation, params, persisted }))
}

/// Discard the statistics and start over with the current parameters.
pub(crate) async fn restart(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<RestartResponse>> {
    let generation = state.request_restart(None).await;
    let params = state.requested().await.params;
    info!(generation, "Restart requested");
    Json(ApiResponse::ok(RestartResponse { generation, params, persisted: false }))
}
