//! Trending DTOs

use serde::Serialize;
use utoipa::ToSchema;

use vetrina::Product;

/// One trending product with its interaction count over the window
#[derive(Debug, Serialize, ToSchema)]
pub struct TrendingProduct {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub permalink: String,
    pub interactions: usize,
}

impl TrendingProduct {
    pub fn from_product(product: Product, interactions: usize) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            price: product.price,
            currency: product.currency,
            image_url: product.image_url,
            permalink: product.permalink,
            interactions,
        }
    }
}

/// Trending listing response
#[derive(Debug, Serialize, ToSchema)]
pub struct TrendingResponse {
    /// Rolling window the counts cover (e.g. "24h")
    pub window: String,
    pub products: Vec<TrendingProduct>,
}
