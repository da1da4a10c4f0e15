//! Service Ports - external collaborator interfaces

mod catalog;
mod embedding;

pub use catalog::{CatalogPage, CatalogSource};
pub use embedding::EmbeddingProvider;
