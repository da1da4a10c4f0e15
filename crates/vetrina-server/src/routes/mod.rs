//! Vetrina API Routes
//!
//! - POST /search - semantic product search
//! - GET /recommendations/:product_id - similar products
//! - GET /trending - most-interacted products over a window
//! - POST /catalog/sync - catalog ingestion (bearer-token protected)
//! - GET /health - dependency reachability

pub mod recommendations;
pub mod search;
pub mod swagger;
pub mod sync;
pub mod trending;
