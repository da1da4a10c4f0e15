//! ContextSignal - aggregated per-session preference signal
//!
//! Computed lazily from a session's history; never persisted. An unknown
//! or expired session yields the empty signal, which biases nothing.

use serde::{Deserialize, Serialize};

/// Price range a session's interactions cluster around
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub low: f64,
    pub high: f64,
}

impl PriceBand {
    pub fn width(&self) -> f64 {
        (self.high - self.low).max(0.0)
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }

    /// Distance of `price` from the band, normalized to [0,1] against the
    /// band's own scale.
    pub fn deviation(&self, price: f64) -> f64 {
        if self.contains(price) {
            return 0.0;
        }
        let distance = if price < self.low {
            self.low - price
        } else {
            price - self.high
        };
        let scale = self.width().max(self.high.max(1.0));
        (distance / scale).clamp(0.0, 1.0)
    }
}

/// Aggregated preference signal for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSignal {
    /// Most frequent categories among viewed/selected products, at most 3
    pub top_categories: Vec<String>,
    /// Average price band of interacted products
    pub price_band: Option<PriceBand>,
    /// Recency-weighted query terms, heaviest first
    pub weighted_terms: Vec<(String, f32)>,
    /// Number of interactions the signal was derived from
    pub interaction_count: usize,
}

impl ContextSignal {
    /// The neutral signal: no categories, no band, no terms.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.top_categories.is_empty()
            && self.price_band.is_none()
            && self.weighted_terms.is_empty()
    }

    /// 1.0 when the product shares a category with the session's top
    /// categories, else 0.0.
    pub fn category_affinity(&self, categories: &[String]) -> f32 {
        let matched = categories
            .iter()
            .any(|c| self.top_categories.iter().any(|t| t.eq_ignore_ascii_case(c)));
        if matched {
            1.0
        } else {
            0.0
        }
    }

    /// Price deviation term in [0,1]; 0 with no band.
    pub fn price_deviation(&self, price: f64) -> f32 {
        match &self.price_band {
            Some(band) => band.deviation(price) as f32,
            None => 0.0,
        }
    }
}
