//! External service clients and in-process infrastructure

pub mod catalog_cache;
pub mod embedding;
pub mod scheduler;

pub use catalog_cache::CatalogCache;
pub use embedding::OpenAiEmbedding;
