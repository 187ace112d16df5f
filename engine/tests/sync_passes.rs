//! Sync pass tests for catalog-engine
//!
//! These run full passes against the in-memory store.

use async_trait::async_trait;
use catalog_engine::{
    compile, evaluate, CatalogSource, Error, LocalProduct, MemoryStore, ProductId, ProductStore,
    Reconciler, RemoteProduct, SegmentCondition, StaticSource, SyncPhase, SyncPolicy, SyncSummary,
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Notify;

fn remote(ids: &[ProductId]) -> Vec<RemoteProduct> {
    ids.iter()
        .map(|id| RemoteProduct::new(*id, format!("product {}", id)))
        .collect()
}

fn setup(products: Vec<RemoteProduct>) -> (Reconciler, Arc<StaticSource>, Arc<MemoryStore>) {
    let source = Arc::new(StaticSource::new(products));
    let store = Arc::new(MemoryStore::new());
    let reconciler = Reconciler::new(source.clone(), store.clone());
    (reconciler, source, store)
}

/// Memory store that refuses to write one particular id.
struct RejectingStore {
    inner: MemoryStore,
    reject: ProductId,
}

#[async_trait]
impl ProductStore for RejectingStore {
    async fn find(&self, id: ProductId) -> catalog_engine::error::Result<Option<LocalProduct>> {
        self.inner.find(id).await
    }

    async fn insert(&self, product: &LocalProduct) -> catalog_engine::error::Result<()> {
        if product.id == self.reject {
            return Err(Error::write_failed(product.id, "constraint violated"));
        }
        self.inner.insert(product).await
    }

    async fn update(&self, product: &LocalProduct) -> catalog_engine::error::Result<()> {
        self.inner.update(product).await
    }

    async fn query(
        &self,
        condition: &SegmentCondition,
    ) -> catalog_engine::error::Result<Vec<LocalProduct>> {
        self.inner.query(condition).await
    }
}

/// Source that blocks inside `fetch_all` until released.
#[derive(Default)]
struct GatedSource {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl CatalogSource for GatedSource {
    async fn fetch_all(&self) -> catalog_engine::error::Result<Vec<RemoteProduct>> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(remote(&[1]))
    }
}

// ============================================================================
// Counting
// ============================================================================

#[tokio::test]
async fn first_pass_on_empty_store_imports_all() {
    let (reconciler, _source, store) = setup(remote(&[10, 20, 30, 40]));

    let summary = reconciler.run().await.unwrap();

    assert_eq!(
        summary,
        SyncSummary {
            imported: 4,
            updated: 0,
            failed: 0
        }
    );
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn second_identical_pass_updates_all() {
    let (reconciler, _source, store) = setup(remote(&[1, 2, 3]));

    reconciler.run().await.unwrap();
    let summary = reconciler.run().await.unwrap();

    assert_eq!(summary.imported, 0);
    assert_eq!(summary.updated, 3);
    assert_eq!(store.len(), 3);
    assert_eq!(reconciler.status().passes, 2);
}

#[tokio::test]
async fn empty_catalog_is_a_successful_pass() {
    let (reconciler, _source, store) = setup(Vec::new());
    let summary = reconciler.run().await.unwrap();
    assert_eq!(summary, SyncSummary::default());
    assert!(store.is_empty());
    assert_eq!(reconciler.status().phase, SyncPhase::Done);
}

#[tokio::test]
async fn updates_overwrite_every_field() {
    let (reconciler, source, store) = setup(remote(&[1]));
    reconciler.run().await.unwrap();

    let mut changed = RemoteProduct::new(1, "Renamed");
    changed.price = "42.00".into();
    changed.on_sale = true;
    changed.stock_status = "outofstock".into();
    changed.status = "draft".into();
    source.replace(vec![changed]);

    let summary = reconciler.run().await.unwrap();
    assert_eq!(summary.updated, 1);

    let stored = store.get(1).unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.price.to_string(), "42.00");
    assert!(stored.on_sale);
    assert!(!stored.is_active);
}

#[tokio::test]
async fn vanished_products_are_kept() {
    let (reconciler, source, store) = setup(remote(&[1, 2, 3]));
    reconciler.run().await.unwrap();

    source.replace(remote(&[2]));
    let summary = reconciler.run().await.unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(store.len(), 3);
    assert!(store.get(1).is_some());
}

#[tokio::test]
async fn duplicate_ids_in_one_batch_count_once_each() {
    let (reconciler, _source, store) = setup(remote(&[7, 7, 8]));
    let summary = reconciler.run().await.unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(store.len(), 2);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn store_failure_aborts_fail_fast_pass() {
    let source = Arc::new(StaticSource::new(remote(&[1, 2, 3])));
    let store = Arc::new(RejectingStore {
        inner: MemoryStore::new(),
        reject: 2,
    });
    let reconciler = Reconciler::new(source, store.clone());

    let err = reconciler.run().await.unwrap_err();

    assert_eq!(err, Error::write_failed(2, "constraint violated"));
    // Record 3 is never reached.
    assert!(store.inner.get(3).is_none());
    let status = reconciler.status();
    assert_eq!(status.phase, SyncPhase::Failed);
    assert!(status.last_summary.is_none());
}

#[tokio::test]
async fn isolate_policy_counts_failures_and_continues() {
    let source = Arc::new(StaticSource::new(remote(&[1, 2, 3])));
    let store = Arc::new(RejectingStore {
        inner: MemoryStore::new(),
        reject: 2,
    });
    let reconciler = Reconciler::new(source, store.clone()).with_policy(SyncPolicy::Isolate);

    let summary = reconciler.run().await.unwrap();

    assert_eq!(
        summary,
        SyncSummary {
            imported: 2,
            updated: 0,
            failed: 1
        }
    );
    assert!(store.inner.get(3).is_some());
    assert_eq!(reconciler.status().phase, SyncPhase::Done);
}

#[tokio::test]
async fn success_clears_previous_error() {
    let source = Arc::new(StaticSource::new(remote(&[1, 2])));
    let store = Arc::new(RejectingStore {
        inner: MemoryStore::new(),
        reject: 2,
    });
    let reconciler = Reconciler::new(source.clone(), store);

    assert!(reconciler.run().await.is_err());
    assert!(reconciler.status().last_error.is_some());

    source.replace(remote(&[1]));
    reconciler.run().await.unwrap();
    assert!(reconciler.status().last_error.is_none());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn only_one_pass_in_flight() {
    let source = Arc::new(GatedSource::default());
    let store = Arc::new(MemoryStore::new());
    let reconciler = Arc::new(Reconciler::new(source.clone(), store.clone()));

    let running = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.run().await })
    };
    source.entered.notified().await;

    assert!(reconciler.is_running());
    assert_eq!(reconciler.status().phase, SyncPhase::Fetching);
    assert_eq!(reconciler.try_run().await, Err(Error::SyncInProgress));

    source.release.notify_one();
    let summary = running.await.unwrap().unwrap();
    assert_eq!(summary.imported, 1);
    assert!(!reconciler.is_running());
}

#[tokio::test]
async fn queued_pass_runs_after_in_flight_pass() {
    let source = Arc::new(GatedSource::default());
    let store = Arc::new(MemoryStore::new());
    let reconciler = Arc::new(Reconciler::new(source.clone(), store.clone()));

    let first = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.run().await })
    };
    source.entered.notified().await;

    let second = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.run().await })
    };

    source.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap().imported, 1);

    source.entered.notified().await;
    source.release.notify_one();
    assert_eq!(second.await.unwrap().unwrap().updated, 1);
    assert_eq!(reconciler.status().passes, 2);
}

// ============================================================================
// Sync then segment
// ============================================================================

#[tokio::test]
async fn two_product_scenario() {
    let mut first = RemoteProduct::new(1, "Canvas Tote");
    first.price = "20".into();
    first.stock_status = "instock".into();
    first.on_sale = false;

    let mut second = RemoteProduct::new(2, "Leather Bag");
    second.price = "80".into();
    second.stock_status = "outofstock".into();
    second.on_sale = true;

    let (reconciler, _source, store) = setup(vec![first, second]);
    let summary = reconciler.run().await.unwrap();
    assert_eq!((summary.imported, summary.updated), (2, 0));

    let on_sale = evaluate(store.as_ref(), "on sale").await.unwrap();
    assert_eq!(on_sale.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);

    let cheap = evaluate(store.as_ref(), "price < 50").await.unwrap();
    assert_eq!(cheap.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);

    let expensive = evaluate(store.as_ref(), "price > 50").await.unwrap();
    assert_eq!(expensive.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);
}

#[tokio::test]
async fn empty_condition_returns_every_product() {
    let (reconciler, _source, store) = setup(remote(&[3, 1, 2]));
    reconciler.run().await.unwrap();

    let all = evaluate(store.as_ref(), "").await.unwrap();
    assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[tokio::test]
async fn conflicting_stock_triggers_match_nothing() {
    let mut in_stock = RemoteProduct::new(1, "Canvas Tote");
    in_stock.stock_status = "instock".into();
    let mut out_of_stock = RemoteProduct::new(2, "Leather Bag");
    out_of_stock.stock_status = "outofstock".into();

    let (reconciler, _source, store) = setup(vec![in_stock, out_of_stock]);
    reconciler.run().await.unwrap();

    let both = evaluate(store.as_ref(), "in stock out of stock").await.unwrap();
    assert!(both.is_empty());
}

// ============================================================================
// Properties
// ============================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn every_record_is_classified_once(ids in prop::collection::vec(0i64..50, 0..40)) {
        let (reconciler, _source, _store) = setup(remote(&ids));
        let summary = block_on(reconciler.run()).unwrap();
        prop_assert_eq!(summary.imported + summary.updated, ids.len());
        prop_assert_eq!(summary.failed, 0);

        let distinct: BTreeSet<_> = ids.iter().collect();
        prop_assert_eq!(summary.imported, distinct.len());
    }

    #[test]
    fn repeat_pass_only_updates(ids in prop::collection::btree_set(0i64..1000, 0..40)) {
        let ids: Vec<_> = ids.into_iter().collect();
        let (reconciler, _source, store) = setup(remote(&ids));

        let first = block_on(reconciler.run()).unwrap();
        prop_assert_eq!(first.imported, ids.len());
        prop_assert_eq!(first.updated, 0);

        let second = block_on(reconciler.run()).unwrap();
        prop_assert_eq!(second.imported, 0);
        prop_assert_eq!(second.updated, ids.len());

        let everything = block_on(store.query(&compile(""))).unwrap();
        prop_assert_eq!(everything.len(), ids.len());
    }
}
