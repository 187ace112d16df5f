//! Product read handlers.

use crate::error::{AppError, Result};
use catalog_engine::{LocalProduct, ProductId, ProductStore, SegmentCondition};
use serde::Serialize;

/// Response for the product listing.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<LocalProduct>,
    pub count: usize,
    pub message: String,
}

/// List every stored product, ordered by id.
pub async fn list_products(store: &dyn ProductStore) -> Result<ProductsResponse> {
    let products = store.query(&SegmentCondition::default()).await?;

    Ok(ProductsResponse {
        count: products.len(),
        products,
        message: "Products fetched successfully".to_string(),
    })
}

/// Fetch a single product by id.
pub async fn get_product(store: &dyn ProductStore, id: ProductId) -> Result<LocalProduct> {
    store
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
}
