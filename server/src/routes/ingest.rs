//! Ingest endpoint routes.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::handlers::{
    handle_ingest, ingest_status, IngestMode, IngestResponse, IngestStatusResponse,
};
use crate::AppState;

/// Create ingest routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products/ingest", post(ingest_handler))
        .route("/products/ingest/manual", post(manual_handler))
        .route("/products/ingest/status", get(status_handler))
}

/// POST /products/ingest - Run a sync pass, queueing behind any running pass.
async fn ingest_handler(State(state): State<AppState>) -> Result<Json<IngestResponse>> {
    let response = handle_ingest(&state.reconciler, IngestMode::Queued).await?;
    Ok(Json(response))
}

/// POST /products/ingest/manual - Run a sync pass unless one is running.
async fn manual_handler(State(state): State<AppState>) -> Result<Json<IngestResponse>> {
    let response = handle_ingest(&state.reconciler, IngestMode::Manual).await?;
    Ok(Json(response))
}

/// GET /products/ingest/status - Scheduler settings and last pass.
async fn status_handler(State(state): State<AppState>) -> Json<IngestStatusResponse> {
    Json(ingest_status(&state.reconciler, &state.config.sync))
}
