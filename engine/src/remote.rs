//! Raw product records as returned by the remote catalog.
//!
//! The shape follows the WooCommerce REST API (`/wp-json/wc/v3/products`).
//! Only the fields the mapper reads are declared; everything else in the
//! payload is ignored, and missing fields fall back to their defaults.

use crate::ProductId;
use serde::{Deserialize, Serialize};

/// A category or tag reference embedded in a remote product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl Term {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A product exactly as the remote catalog describes it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal as a string; empty for products without a price
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub sku: String,
    /// Null when stock is not managed remotely
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub stock_status: String,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub categories: Vec<Term>,
    #[serde(default)]
    pub tags: Vec<Term>,
    /// Publication status (`publish`, `draft`, `pending`, `private`)
    #[serde(default)]
    pub status: String,
}

impl RemoteProduct {
    /// Create a published product with the given id and name.
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: "publish".to_string(),
            stock_status: "instock".to_string(),
            ..Self::default()
        }
    }
}
