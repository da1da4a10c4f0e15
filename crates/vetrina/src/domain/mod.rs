//! Domain Layer
//!
//! Pure business entities and value types, free of infrastructure concerns.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{
    order_results, InteractionEvent, InteractionKind, Product, QueryEvent, RankedResult, Session,
};
pub use errors::DomainError;
pub use value_objects::{
    ContextSignal, PriceBand, RankingWeights, SearchFilters, SyncReport, TrendingEntry,
};
