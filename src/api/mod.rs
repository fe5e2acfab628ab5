pub(crate) mod handlers;
pub(crate) mod responses;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete API router.
pub(crate) fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        // Status
        .route("/api/status", get(handlers::get_status))
        // Results
        .route("/api/results", get(handlers::get_results))
        // Parameters
        .route("/api/params", get(handlers::get_params))
        .route("/api/params", post(handlers::update_params))
        .route("/api/restart", post(handlers::restart))
        // SSE events
        .route("/api/events", get(handlers::sse_events))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}
