//! Vetrina Domain Library
//!
//! Core domain types and interfaces for the Vetrina product
//! recommendation engine.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Product, Session, RankedResult)
//!   - `value_objects/`: Immutable value types (SearchFilters, ContextSignal,
//!     RankingWeights, SyncReport)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces over the vector store
//!   - `services/`: External service interfaces (embedding provider,
//!     catalog source)
//!
//! # Usage
//!
//! ```rust,ignore
//! use vetrina::domain::{Product, Session, ContextSignal};
//! use vetrina::ports::{ProductRepository, EmbeddingProvider};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    order_results, ContextSignal, DomainError, InteractionEvent, InteractionKind, PriceBand,
    Product, QueryEvent, RankedResult, RankingWeights, SearchFilters, Session, SyncReport,
    TrendingEntry,
};
pub use ports::{
    CatalogPage, CatalogSource, EmbeddingProvider, InteractionRepository, ProductRepository,
    SessionRepository,
};
