//! Record store seam and the in-memory implementation.
//!
//! The engine never talks to a database directly. Anything that can find,
//! insert, update and filter products by key can back a sync pass: the
//! server plugs in PostgreSQL, tests and embedders use [`MemoryStore`].

use crate::{error::Result, Error, LocalProduct, ProductId, SegmentCondition};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Key-based product persistence.
///
/// Implementations enforce uniqueness of `id`: `insert` fails for an existing
/// id and `update` fails for a missing one.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Look up a product by id.
    async fn find(&self, id: ProductId) -> Result<Option<LocalProduct>>;

    /// Create a new row. Fails with [`Error::StoreWriteFailed`] if the id exists.
    async fn insert(&self, product: &LocalProduct) -> Result<()>;

    /// Overwrite every field of an existing row, keyed by `product.id`.
    async fn update(&self, product: &LocalProduct) -> Result<()>;

    /// All rows satisfying every clause of `condition`.
    async fn query(&self, condition: &SegmentCondition) -> Result<Vec<LocalProduct>>;
}

/// Products held in memory, ordered by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: RwLock<BTreeMap<ProductId, LocalProduct>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with products.
    pub fn with_products(products: impl IntoIterator<Item = LocalProduct>) -> Self {
        let products = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: RwLock::new(products),
        }
    }

    /// Get a product by id without going through the async seam.
    pub fn get(&self, id: ProductId) -> Option<LocalProduct> {
        self.read().get(&id).cloned()
    }

    /// Every product, ordered by id.
    pub fn all(&self) -> Vec<LocalProduct> {
        self.read().values().cloned().collect()
    }

    /// Count of stored products.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store holds no products.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave a half-written map behind,
    // every mutation is a single insert.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<ProductId, LocalProduct>> {
        self.products.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<ProductId, LocalProduct>> {
        self.products.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find(&self, id: ProductId) -> Result<Option<LocalProduct>> {
        Ok(self.get(id))
    }

    async fn insert(&self, product: &LocalProduct) -> Result<()> {
        let mut products = self.write();
        if products.contains_key(&product.id) {
            return Err(Error::write_failed(product.id, "product already exists"));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &LocalProduct) -> Result<()> {
        let mut products = self.write();
        let existing = products
            .get_mut(&product.id)
            .ok_or_else(|| Error::write_failed(product.id, "product not found"))?;
        *existing = product.clone();
        Ok(())
    }

    async fn query(&self, condition: &SegmentCondition) -> Result<Vec<LocalProduct>> {
        Ok(self
            .read()
            .values()
            .filter(|p| condition.matches(p))
            .cloned()
            .collect())
    }
}
