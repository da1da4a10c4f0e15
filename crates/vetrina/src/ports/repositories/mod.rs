//! Repository Ports
//!
//! All persisted state - products, sessions, interactions - is owned by the
//! vector store gateway behind these traits. Nothing else touches the store.

mod interaction_repository;
mod product_repository;
mod session_repository;

pub use interaction_repository::InteractionRepository;
pub use product_repository::ProductRepository;
pub use session_repository::SessionRepository;
