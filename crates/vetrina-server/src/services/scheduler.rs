//! Sync Scheduler - periodic incremental catalog sync
//!
//! Keeps the vector store tracking the upstream catalog without operator
//! intervention. Ticks that overlap a running sync are skipped (syncs are
//! exclusive).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use vetrina::DomainError;

use crate::application::sync_service::SyncHandle;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between incremental syncs
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

/// Periodic sync loop
pub struct SyncScheduler {
    sync: Arc<dyn SyncHandle>,
    config: SchedulerConfig,
}

impl SyncScheduler {
    pub fn new(sync: Arc<dyn SyncHandle>, config: Option<SchedulerConfig>) -> Self {
        Self {
            sync,
            config: config.unwrap_or_default(),
        }
    }

    /// Start the scheduler (runs in background)
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        tracing::info!(
            "Sync scheduler started (interval: {:?})",
            self.config.interval
        );

        let mut ticker = interval(self.config.interval);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            tracing::info!("Scheduler: starting incremental sync...");
            match self.sync.run_sync(false).await {
                Ok(report) => {
                    tracing::info!(
                        "Scheduler: sync done ({} created, {} updated, {} failed)",
                        report.created,
                        report.updated,
                        report.failed
                    );
                }
                Err(DomainError::SyncInProgress) => {
                    tracing::info!("Scheduler: sync already running, skipping tick");
                }
                Err(e) => {
                    tracing::warn!("Scheduler: sync failed: {}", e);
                }
            }
        }
    }
}

/// Start the scheduler when an interval is configured
pub fn maybe_start_scheduler(
    sync: Arc<dyn SyncHandle>,
    interval_secs: Option<u64>,
) -> Option<tokio::task::JoinHandle<()>> {
    let interval_secs = interval_secs?;

    let config = SchedulerConfig {
        interval: Duration::from_secs(interval_secs),
    };

    Some(SyncScheduler::new(sync, Some(config)).start())
}
