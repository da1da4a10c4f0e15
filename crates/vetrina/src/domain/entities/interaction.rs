//! Interaction events - per-product activity feeding the trending window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of interaction touched a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Product appeared in a search result set
    SearchResult,
    /// Product was requested through the recommendations endpoint
    ProductView,
    /// Client explicitly selected the product
    Selection,
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::SearchResult => write!(f, "search_result"),
            InteractionKind::ProductView => write!(f, "product_view"),
            InteractionKind::Selection => write!(f, "selection"),
        }
    }
}

/// A single product interaction, recorded asynchronously after responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub kind: InteractionKind,
    pub timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn now(product_id: i64, session_id: Option<String>, kind: InteractionKind) -> Self {
        Self {
            product_id,
            session_id,
            kind,
            timestamp: Utc::now(),
        }
    }
}
