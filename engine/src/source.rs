//! Catalog source seam.
//!
//! A source hands the engine one finite batch of raw remote records per
//! sync pass. Pagination, authentication and transport retries are the
//! source's business.

use crate::{error::Result, RemoteProduct};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Supplier of remote product records.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the complete remote catalog.
    ///
    /// Fails with [`crate::Error::SourceUnavailable`] when no records can be
    /// obtained at all.
    async fn fetch_all(&self) -> Result<Vec<RemoteProduct>>;
}

/// A source serving a fixed, replaceable list of records.
#[derive(Debug, Default)]
pub struct StaticSource {
    products: Mutex<Vec<RemoteProduct>>,
}

impl StaticSource {
    pub fn new(products: Vec<RemoteProduct>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    /// Build a source from a JSON array in the remote wire format.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Replace the records served by subsequent fetches.
    pub fn replace(&self, products: Vec<RemoteProduct>) {
        *self.products.lock().unwrap_or_else(PoisonError::into_inner) = products;
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<RemoteProduct>> {
        Ok(self
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
