//! Segment evaluation routes.

use axum::{extract::State, routing::post, Json, Router};

use crate::error::Result;
use crate::handlers::{handle_evaluate, EvaluateRequest, EvaluateResponse};
use crate::AppState;

/// Create segment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/segments/evaluate", post(evaluate_handler))
}

/// POST /segments/evaluate - Filter stored products by a text condition.
async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>> {
    let response = handle_evaluate(state.store.as_ref(), request).await?;
    Ok(Json(response))
}
