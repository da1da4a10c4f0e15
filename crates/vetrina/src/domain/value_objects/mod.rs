//! Value Objects

mod context_signal;
mod ranking_weights;
mod search_filters;
mod sync_report;

pub use context_signal::{ContextSignal, PriceBand};
pub use ranking_weights::RankingWeights;
pub use search_filters::SearchFilters;
pub use sync_report::{SyncReport, TrendingEntry};
