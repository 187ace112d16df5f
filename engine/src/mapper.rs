//! Mapping from remote records to local products.
//!
//! Mapping is pure and total: malformed numeric fields fall back to zero and
//! unknown enumerations fall back to their defaults instead of failing, so a
//! sync pass never aborts halfway through a record.

use crate::{LocalProduct, RemoteProduct, StockStatus, Term};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Separator used when flattening category and tag lists.
pub const LIST_SEPARATOR: &str = ", ";

/// Publication status that marks a remote product as active.
const PUBLISHED: &str = "publish";

/// Transform one remote record into the local entity shape.
pub fn map_product(remote: &RemoteProduct) -> LocalProduct {
    LocalProduct {
        id: remote.id,
        name: remote.name.clone(),
        description: remote.description.clone(),
        price: parse_price(&remote.price),
        sku: remote.sku.clone(),
        stock: parse_stock(remote.stock_quantity),
        stock_status: StockStatus::from_str(&remote.stock_status).unwrap_or_default(),
        on_sale: remote.on_sale,
        category: join_terms(&remote.categories),
        tags: join_terms(&remote.tags),
        is_active: remote.status.trim().eq_ignore_ascii_case(PUBLISHED),
    }
}

fn parse_price(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or(Decimal::ZERO)
}

fn parse_stock(raw: Option<i64>) -> i32 {
    raw.and_then(|qty| i32::try_from(qty).ok()).unwrap_or(0)
}

fn join_terms(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|t| t.name.trim())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
