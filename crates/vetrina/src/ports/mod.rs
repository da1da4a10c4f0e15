//! Ports - Abstract Interfaces
//!
//! Traits the application layer depends on, implemented by infrastructure
//! adapters (Qdrant gateway, OpenAI client, catalog client).

pub mod repositories;
pub mod services;

pub use repositories::{InteractionRepository, ProductRepository, SessionRepository};
pub use services::{CatalogPage, CatalogSource, EmbeddingProvider};
