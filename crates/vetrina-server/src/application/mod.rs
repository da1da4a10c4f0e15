//! Application Services (Use Cases)
//!
//! Orchestrate domain operations over the port traits:
//! - `sync_service`: exclusive catalog ingestion with embedding fan-out
//! - `context_service`: per-session interaction history and signals
//! - `search_service`: ranking & response composition

pub mod context_service;
pub mod search_service;
pub mod sync_service;

pub use context_service::ContextService;
pub use search_service::{SearchOutcome, SearchService};
pub use sync_service::{SyncHandle, SyncService};
