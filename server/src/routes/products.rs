//! Product read routes.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use catalog_engine::{LocalProduct, ProductId};

use crate::error::Result;
use crate::handlers::{get_product, list_products, ProductsResponse};
use crate::AppState;

/// Create product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_handler))
        .route("/products/{id}", get(get_handler))
}

/// GET /products - List all stored products.
async fn list_handler(State(state): State<AppState>) -> Result<Json<ProductsResponse>> {
    let response = list_products(state.store.as_ref()).await?;
    Ok(Json(response))
}

/// GET /products/{id} - Fetch one product.
async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<LocalProduct>> {
    let product = get_product(state.store.as_ref(), id).await?;
    Ok(Json(product))
}
