//! Structured filters applied before the nearest-neighbor pass

use serde::{Deserialize, Serialize};

/// Search filter for product queries. All fields are optional; an empty
/// filter matches everything.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to products carrying any of these categories
    #[serde(default)]
    pub categories: Vec<String>,
    /// Restrict to products carrying any of these tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Minimum price, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    /// Maximum price, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    /// Only products currently in stock
    #[serde(default)]
    pub in_stock_only: bool,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.tags.is_empty()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && !self.in_stock_only
    }

    /// Post-filter predicate, used by the lexical fallback path where the
    /// store's pre-filtering is unavailable.
    pub fn matches(
        &self,
        categories: &[String],
        tags: &[String],
        price: f64,
        in_stock: bool,
    ) -> bool {
        if !self.categories.is_empty()
            && !self
                .categories
                .iter()
                .any(|c| categories.iter().any(|pc| pc.eq_ignore_ascii_case(c)))
        {
            return false;
        }
        if !self.tags.is_empty()
            && !self
                .tags
                .iter()
                .any(|t| tags.iter().any(|pt| pt.eq_ignore_ascii_case(t)))
        {
            return false;
        }
        if let Some(min) = self.price_min {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if price > max {
                return false;
            }
        }
        if self.in_stock_only && !in_stock {
            return false;
        }
        true
    }
}
