//! Scheduled sync passes.
//!
//! The scheduler owns the clock: it triggers [`Reconciler::try_run`] on a
//! fixed interval and skips a tick while another pass is still in flight.

use catalog_engine::{Error, Reconciler};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::SyncConfig;

/// Spawn the scheduler task.
///
/// Returns `None` when there is nothing to schedule: no interval and no
/// startup pass.
pub fn spawn(reconciler: Arc<Reconciler>, config: SyncConfig) -> Option<JoinHandle<()>> {
    if config.interval.is_none() && !config.run_on_startup {
        tracing::info!("sync scheduler disabled");
        return None;
    }

    tracing::info!(
        interval = ?config.interval,
        run_on_startup = config.run_on_startup,
        policy = ?config.policy,
        "sync scheduler started"
    );
    Some(tokio::spawn(run(reconciler, config)))
}

async fn run(reconciler: Arc<Reconciler>, config: SyncConfig) {
    if config.run_on_startup {
        trigger(&reconciler, "startup").await;
    }

    let Some(period) = config.interval else {
        return;
    };

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        trigger(&reconciler, "interval").await;
    }
}

async fn trigger(reconciler: &Reconciler, reason: &'static str) {
    match reconciler.try_run().await {
        Ok(summary) => tracing::info!(
            reason,
            imported = summary.imported,
            updated = summary.updated,
            failed = summary.failed,
            "scheduled sync finished"
        ),
        Err(Error::SyncInProgress) => {
            tracing::info!(reason, "sync already in progress, skipping tick")
        }
        Err(err) => tracing::error!(reason, error = %err, "scheduled sync failed"),
    }
}
