//! Catalog sync DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vetrina::SyncReport;

/// Sync request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SyncRequest {
    /// Pull the full catalog instead of changed-since-last-sync
    #[serde(default)]
    pub full: bool,
}

/// Sync outcome summary
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResponse {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Per-record failure reasons (capped)
    pub failures: Vec<String>,
    pub duration_ms: u64,
    pub full: bool,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            created: report.created,
            updated: report.updated,
            skipped: report.skipped,
            failed: report.failed,
            failures: report.failures,
            duration_ms: report.duration_ms,
            full: report.full,
        }
    }
}
