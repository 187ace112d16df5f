//! Ingest handler - runs sync passes from the remote catalog.

use crate::config::SyncConfig;
use crate::error::Result;
use catalog_engine::{Reconciler, SyncPolicy, SyncStatus, SyncSummary};
use serde::Serialize;

/// How an ingest request treats a pass that is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Wait for the in-flight pass, then run another
    Queued,
    /// Refuse with a conflict while a pass is in flight
    Manual,
}

impl IngestMode {
    fn message(self) -> &'static str {
        match self {
            IngestMode::Queued => "Products ingested successfully",
            IngestMode::Manual => "Manual ingestion triggered successfully",
        }
    }
}

/// Response for an ingest request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub message: String,
    pub imported: usize,
    pub updated: usize,
    pub failed: usize,
    pub total: usize,
}

impl IngestResponse {
    fn new(message: &str, summary: SyncSummary) -> Self {
        Self {
            message: message.to_string(),
            imported: summary.imported,
            updated: summary.updated,
            failed: summary.failed,
            total: summary.total(),
        }
    }
}

/// Scheduler settings as reported by the status endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInfo {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
    pub run_on_startup: bool,
    pub policy: SyncPolicy,
}

impl From<&SyncConfig> for ScheduleInfo {
    fn from(config: &SyncConfig) -> Self {
        Self {
            enabled: config.interval.is_some(),
            interval_secs: config.interval.map(|i| i.as_secs()),
            run_on_startup: config.run_on_startup,
            policy: config.policy,
        }
    }
}

/// Response for the ingest status endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStatusResponse {
    pub schedule: ScheduleInfo,
    pub sync: SyncStatus,
}

/// Run one sync pass.
pub async fn handle_ingest(reconciler: &Reconciler, mode: IngestMode) -> Result<IngestResponse> {
    tracing::info!(?mode, "ingest requested");

    let summary = match mode {
        IngestMode::Queued => reconciler.run().await?,
        IngestMode::Manual => reconciler.try_run().await?,
    };

    Ok(IngestResponse::new(mode.message(), summary))
}

/// Report scheduler settings and the reconciler's current status.
pub fn ingest_status(reconciler: &Reconciler, schedule: &SyncConfig) -> IngestStatusResponse {
    IngestStatusResponse {
        schedule: schedule.into(),
        sync: reconciler.status(),
    }
}
