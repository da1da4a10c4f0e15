//! Blending weights for the ranking composer

use serde::{Deserialize, Serialize};

/// Weights for the blended score:
///
/// `blended = w_similarity * similarity
///          + w_category * category_affinity
///          + w_recency * catalog_recency
///          - w_price * price_deviation`
///
/// All component terms are normalized to [0,1] before weighting. Defaults
/// are illustrative, not normative; deployments tune them via config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankingWeights {
    pub similarity: f32,
    pub category_affinity: f32,
    pub catalog_recency: f32,
    pub price_deviation: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            similarity: 0.7,
            category_affinity: 0.15,
            catalog_recency: 0.05,
            price_deviation: 0.1,
        }
    }
}

impl RankingWeights {
    /// Compute the blended score from normalized component terms.
    pub fn blend(
        &self,
        similarity: f32,
        category_affinity: f32,
        catalog_recency: f32,
        price_deviation: f32,
    ) -> f32 {
        self.similarity * similarity + self.category_affinity * category_affinity
            + self.catalog_recency * catalog_recency
            - self.price_deviation * price_deviation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_blend() {
        let weights = RankingWeights::default();
        let score = weights.blend(1.0, 1.0, 1.0, 0.0);
        assert!((score - 0.9).abs() < 1e-6);
        // Price deviation only subtracts
        assert!(weights.blend(1.0, 1.0, 1.0, 1.0) < score);
    }
}
