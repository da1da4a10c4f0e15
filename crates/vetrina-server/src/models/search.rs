//! Search and recommendation DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vetrina::{RankedResult, SearchFilters};

/// Search request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Opaque session identifier; generated when absent
    #[serde(default)]
    pub session_id: Option<String>,
    /// Result limit, default 10, max 50
    #[serde(default)]
    pub limit: Option<i64>,
    /// Structured filters applied before the nearest-neighbor pass
    #[serde(default)]
    pub filters: Option<FiltersDto>,
}

/// Structured filter object
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FiltersDto {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_max: Option<f64>,
    #[serde(default)]
    pub in_stock_only: bool,
}

impl From<FiltersDto> for SearchFilters {
    fn from(dto: FiltersDto) -> Self {
        SearchFilters {
            categories: dto.categories,
            tags: dto.tags,
            price_min: dto.price_min,
            price_max: dto.price_max,
            in_stock_only: dto.in_stock_only,
        }
    }
}

/// One ranked product in a response
#[derive(Debug, Serialize, ToSchema)]
pub struct RankedProduct {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub permalink: String,
    pub in_stock: bool,
    pub rating: f32,
    /// Final blended score the ordering is defined by
    pub score: f32,
    /// Normalized similarity component of the score
    pub similarity: f32,
    /// 1-based rank position
    pub rank: usize,
}

impl From<RankedResult> for RankedProduct {
    fn from(result: RankedResult) -> Self {
        let in_stock = result.product.in_stock();
        Self {
            product_id: result.product.id,
            name: result.product.name,
            price: result.product.price,
            currency: result.product.currency,
            image_url: result.product.image_url,
            permalink: result.product.permalink,
            in_stock,
            rating: result.product.rating,
            score: result.blended,
            similarity: result.similarity,
            rank: result.rank,
        }
    }
}

/// Search / recommendation response
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<RankedProduct>,
    /// Up to 3 follow-up suggestions
    pub suggestions: Vec<String>,
    /// Conversational summary of the result set
    pub message: String,
    /// Session the interaction was recorded under
    pub session_id: String,
    /// True when the lexical fallback served this response
    pub degraded: bool,
}
