//! Infrastructure Adapters
//!
//! Concrete implementations of the domain ports:
//! - `qdrant`: vector store gateway (products, sessions, interactions)
//! - `woocommerce`: upstream catalog source

pub mod qdrant;
pub mod woocommerce;

pub use qdrant::VectorGateway;
pub use woocommerce::WooCatalog;
