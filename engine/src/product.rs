//! Local product entity mirrored from the remote catalog.

use crate::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stock availability of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
}

impl StockStatus {
    /// The wire and column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "instock",
            StockStatus::OutOfStock => "outofstock",
            StockStatus::OnBackorder => "onbackorder",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known stock statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stock status: {0}")]
pub struct UnknownStockStatus(pub String);

impl FromStr for StockStatus {
    type Err = UnknownStockStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instock" => Ok(StockStatus::InStock),
            "outofstock" => Ok(StockStatus::OutOfStock),
            "onbackorder" => Ok(StockStatus::OnBackorder),
            _ => Err(UnknownStockStatus(s.to_string())),
        }
    }
}

/// A product row in the local store.
///
/// `id` is the remote identifier and never changes once the row exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalProduct {
    /// Remote identifier, also the local primary key
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Current selling price
    pub price: Decimal,
    /// Stock keeping unit (not unique locally)
    pub sku: String,
    /// Units in stock
    pub stock: i32,
    pub stock_status: StockStatus,
    pub on_sale: bool,
    /// Category names, comma-joined in source order
    pub category: String,
    /// Tag names, comma-joined in source order
    pub tags: String,
    /// Whether the product is published remotely
    pub is_active: bool,
}

impl LocalProduct {
    /// Create a product with the given id and every other field empty.
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price: Decimal::ZERO,
            sku: String::new(),
            stock: 0,
            stock_status: StockStatus::default(),
            on_sale: false,
            category: String::new(),
            tags: String::new(),
            is_active: true,
        }
    }
}
