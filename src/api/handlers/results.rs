use crate::api::responses::{ApiResponse, ResultsResponse};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

pub(crate) async fn get_results(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<ResultsResponse>> {
    let run = state.results.read().await;
    Json(ApiResponse::ok(ResultsResponse::from(&*run)))
}
