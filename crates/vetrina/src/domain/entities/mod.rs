//! Domain Entities

mod interaction;
mod product;
mod ranked;
mod session;

pub use interaction::{InteractionEvent, InteractionKind};
pub use product::Product;
pub use ranked::{order_results, RankedResult};
pub use session::{QueryEvent, Session};
