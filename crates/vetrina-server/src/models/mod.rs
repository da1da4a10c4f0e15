//! Vetrina API Data Models
//!
//! Request/response DTOs for the HTTP surface plus the structured error
//! body every endpoint returns on failure.

mod error;
mod health;
mod search;
mod sync;
mod trending;

pub use error::*;
pub use health::*;
pub use search::*;
pub use sync::*;
pub use trending::*;
