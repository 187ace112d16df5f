//! Reconciliation of the remote catalog into the local store.
//!
//! One sync pass fetches every remote record, maps it, and upserts it keyed
//! by id. Records missing from the remote side are left untouched.
//!
//! # Algorithm
//!
//! 1. Fetch the full remote catalog from the [`CatalogSource`]
//! 2. Map each record with [`map_product`]
//! 3. Look the id up in the [`ProductStore`]
//! 4. Update the existing row, or insert a new one
//! 5. Count imported, updated (and, when isolating failures, failed) records
//!
//! # Pass lifecycle
//!
//! `Idle → Fetching → Reconciling → Done`, with any error, or a pass future
//! dropped mid-flight, moving the pass to `Failed`. There is no resumable
//! state; the next pass starts from scratch. At most one pass runs at a time
//! per [`Reconciler`].

use crate::{
    error::Result, map_product, CatalogSource, Error, LocalProduct, ProductStore, RemoteProduct,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What to do when a single record cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// Abort the pass on the first store error (default)
    #[default]
    FailFast,
    /// Log and count the failure, then continue with the next record
    Isolate,
}

/// Phase of the current or most recent pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Reconciling,
    Done,
    Failed,
}

/// Classification of one record within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Id was new, row created
    Imported,
    /// Id existed, row overwritten
    Updated,
    /// Store rejected the record (only under [`SyncPolicy::Isolate`])
    Failed,
}

/// Aggregate counts of one pass.
///
/// `imported + updated + failed` always equals the number of records the
/// source returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub imported: usize,
    pub updated: usize,
    pub failed: usize,
}

impl SyncSummary {
    /// Count one record outcome.
    pub fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Imported => self.imported += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::Failed => self.failed += 1,
        }
    }

    /// Number of records processed.
    pub fn total(&self) -> usize {
        self.imported + self.updated + self.failed
    }
}

/// Observable state of a reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Passes started since creation
    pub passes: u64,
    /// Counts of the last successful pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summary: Option<SyncSummary>,
    /// Error of the last failed pass, cleared by the next success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Runs sync passes from a catalog source into a product store.
pub struct Reconciler {
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn ProductStore>,
    policy: SyncPolicy,
    /// Held for the whole pass; serializes passes
    gate: tokio::sync::Mutex<()>,
    status: Mutex<SyncStatus>,
}

impl Reconciler {
    /// Create a reconciler with the fail-fast policy.
    pub fn new(source: Arc<dyn CatalogSource>, store: Arc<dyn ProductStore>) -> Self {
        Self {
            source,
            store,
            policy: SyncPolicy::default(),
            gate: tokio::sync::Mutex::new(()),
            status: Mutex::new(SyncStatus::default()),
        }
    }

    /// Set the per-record failure policy.
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> SyncStatus {
        self.status_lock().clone()
    }

    /// Check whether a pass is in flight.
    pub fn is_running(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Run one pass, waiting for any in-flight pass to finish first.
    pub async fn run(&self) -> Result<SyncSummary> {
        let _pass = self.gate.lock().await;
        self.run_pass().await
    }

    /// Run one pass, or fail with [`Error::SyncInProgress`] if one is in flight.
    pub async fn try_run(&self) -> Result<SyncSummary> {
        let _pass = self.gate.try_lock().map_err(|_| Error::SyncInProgress)?;
        self.run_pass().await
    }

    async fn run_pass(&self) -> Result<SyncSummary> {
        let pass = ActivePass::start(self);
        tracing::info!(policy = ?self.policy, "sync pass started");

        let result = self.fetch_and_reconcile().await;
        pass.settle(result)
    }

    async fn fetch_and_reconcile(&self) -> Result<SyncSummary> {
        let remote = self.source.fetch_all().await?;

        self.status_lock().phase = SyncPhase::Reconciling;
        tracing::debug!(records = remote.len(), "reconciling remote records");

        self.reconcile(&remote).await
    }

    async fn reconcile(&self, remote: &[RemoteProduct]) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();

        for record in remote {
            let product = map_product(record);
            match apply(self.store.as_ref(), &product).await {
                Ok(outcome) => summary.record(outcome),
                Err(err) if self.policy == SyncPolicy::Isolate => {
                    tracing::warn!(product_id = product.id, error = %err, "skipping product");
                    summary.record(SyncOutcome::Failed);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(summary)
    }

    fn fail(&self, err: Error) -> Error {
        tracing::error!(error = %err, "sync pass failed");
        let mut status = self.status_lock();
        status.phase = SyncPhase::Failed;
        status.last_error = Some(err.to_string());
        err
    }

    fn status_lock(&self) -> MutexGuard<'_, SyncStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Status error left behind by a pass whose future was dropped.
const CANCELLED: &str = "sync pass cancelled";

/// A pass between `Fetching` and its final phase.
///
/// Dropping it before [`ActivePass::settle`] marks the pass `Failed`, so a
/// cancelled pass never leaves the status stuck mid-flight.
struct ActivePass<'a> {
    reconciler: &'a Reconciler,
    settled: bool,
}

impl<'a> ActivePass<'a> {
    fn start(reconciler: &'a Reconciler) -> Self {
        let mut status = reconciler.status_lock();
        status.phase = SyncPhase::Fetching;
        status.passes += 1;

        Self {
            reconciler,
            settled: false,
        }
    }

    fn settle(mut self, result: Result<SyncSummary>) -> Result<SyncSummary> {
        self.settled = true;

        match result {
            Ok(summary) => {
                let mut status = self.reconciler.status_lock();
                status.phase = SyncPhase::Done;
                status.last_summary = Some(summary);
                status.last_error = None;
                tracing::info!(
                    imported = summary.imported,
                    updated = summary.updated,
                    failed = summary.failed,
                    "sync pass finished"
                );
                Ok(summary)
            }
            Err(err) => Err(self.reconciler.fail(err)),
        }
    }
}

impl Drop for ActivePass<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        tracing::warn!("{}", CANCELLED);
        let mut status = self.reconciler.status_lock();
        status.phase = SyncPhase::Failed;
        status.last_error = Some(CANCELLED.to_string());
    }
}

/// Upsert one mapped product: update if the id exists, insert otherwise.
///
/// The lookup and the write form one logical unit; callers must not run two
/// of these for the same id concurrently.
pub async fn apply(store: &dyn ProductStore, product: &LocalProduct) -> Result<SyncOutcome> {
    if store.find(product.id).await?.is_some() {
        store.update(product).await?;
        Ok(SyncOutcome::Updated)
    } else {
        store.insert(product).await?;
        Ok(SyncOutcome::Imported)
    }
}
