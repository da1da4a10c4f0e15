//! RankedResult - a product with its scoring breakdown

use serde::Serialize;

use crate::domain::entities::Product;

/// One entry of a ranked result set.
///
/// Invariant: a result set is a total order by descending `blended`, ties
/// broken by ascending product id, so identical inputs rank identically.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub product: Product,
    /// Normalized similarity in [0,1] (lexical match score in degraded mode)
    pub similarity: f32,
    /// Sum of the contextual terms (category affinity, recency, price), weighted
    pub contextual_boost: f32,
    /// Final blended score the ordering is defined by
    pub blended: f32,
    /// 1-based position in the result set
    pub rank: usize,
}

/// Sort candidates into their final deterministic order and assign ranks.
pub fn order_results(mut candidates: Vec<RankedResult>) -> Vec<RankedResult> {
    candidates.sort_by(|a, b| {
        b.blended
            .partial_cmp(&a.blended)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product.id.cmp(&b.product.id))
    });
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64) -> Product {
        Product {
            id,
            name: format!("p{}", id),
            description: String::new(),
            short_description: String::new(),
            categories: vec![],
            tags: vec![],
            price: 0.0,
            currency: "INR".to_string(),
            stock_status: "instock".to_string(),
            image_url: None,
            permalink: String::new(),
            rating: 0.0,
            review_count: 0,
            synced_at: Utc::now(),
            embedding_model: String::new(),
        }
    }

    fn entry(id: i64, blended: f32) -> RankedResult {
        RankedResult {
            product: product(id),
            similarity: blended,
            contextual_boost: 0.0,
            blended,
            rank: 0,
        }
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let ordered = order_results(vec![entry(9, 0.5), entry(3, 0.5), entry(1, 0.8)]);
        let ids: Vec<i64> = ordered.iter().map(|r| r.product.id).collect();
        assert_eq!(ids, vec![1, 3, 9]);
        assert_eq!(ordered[0].rank, 1);
        assert_eq!(ordered[2].rank, 3);
    }
}
