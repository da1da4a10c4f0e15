//! Product - Normalized catalog record
//!
//! Pure domain entity without infrastructure dependencies. The stored copy
//! in the vector store carries exactly one embedding, produced by the model
//! recorded in `embedding_model`; sync re-embeds when that model changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product - a normalized record from the upstream catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier sourced from the upstream catalog
    pub id: i64,
    /// Display name
    pub name: String,
    /// Long description (HTML already stripped)
    pub description: String,
    /// Short description (HTML already stripped)
    #[serde(default)]
    pub short_description: String,
    /// Category names
    #[serde(default)]
    pub categories: Vec<String>,
    /// Tag names
    #[serde(default)]
    pub tags: Vec<String>,
    /// Current price as a decimal amount
    pub price: f64,
    /// ISO currency code the price is tagged with
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Upstream stock status ("instock" / "outofstock")
    #[serde(default)]
    pub stock_status: String,
    /// Primary image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Public product page URL
    #[serde(default)]
    pub permalink: String,
    /// Average review rating (0.0 - 5.0)
    #[serde(default)]
    pub rating: f32,
    /// Number of reviews behind the rating
    #[serde(default)]
    pub review_count: i64,
    /// When this record was last synced from the catalog
    pub synced_at: DateTime<Utc>,
    /// Embedding model version the stored vector was produced with
    #[serde(default)]
    pub embedding_model: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Product {
    /// Text used for embedding generation, one line per salient field
    pub fn embedding_text(&self) -> String {
        let parts = [
            format!("Product: {}", self.name),
            format!("Description: {}", self.description),
            format!("Short Description: {}", self.short_description),
            format!("Categories: {}", self.categories.join(", ")),
            format!("Tags: {}", self.tags.join(", ")),
            format!("Price: {} {}", self.price, self.currency),
            format!("Stock: {}", self.stock_status),
            format!("Rating: {}/5 ({} reviews)", self.rating, self.review_count),
        ];
        parts
            .iter()
            .filter(|p| !p.ends_with(": "))
            .cloned()
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn in_stock(&self) -> bool {
        self.stock_status == "instock"
    }
}
