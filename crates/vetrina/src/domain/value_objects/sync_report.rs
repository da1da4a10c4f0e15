//! Sync and trending summaries

use serde::{Deserialize, Serialize};

/// Outcome of one catalog sync run.
///
/// Individual record failures are non-fatal: they are listed here and the
/// sync continues. A report with `failed > 0` is a partial success, not an
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Products stored for the first time
    pub created: usize,
    /// Products re-stored over an existing record
    pub updated: usize,
    /// Records skipped (unchanged in incremental mode)
    pub skipped: usize,
    /// Records that failed normalization or embedding
    pub failed: usize,
    /// Per-record failure reasons, capped to keep reports bounded
    #[serde(default)]
    pub failures: Vec<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Whether a full snapshot was pulled (vs changed-since-watermark)
    pub full: bool,
}

const MAX_FAILURE_NOTES: usize = 50;

impl SyncReport {
    pub fn record_failure(&mut self, note: impl Into<String>) {
        self.failed += 1;
        if self.failures.len() < MAX_FAILURE_NOTES {
            self.failures.push(note.into());
        }
    }

    pub fn processed(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed
    }
}

/// One row of the trending listing: interaction count over the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub product_id: i64,
    pub interactions: usize,
}
