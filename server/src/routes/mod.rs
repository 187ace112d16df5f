//! HTTP route definitions.

mod health;
mod ingest;
mod products;
mod segments;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(products::routes())
        .merge(ingest::routes())
        .merge(segments::routes())
}
