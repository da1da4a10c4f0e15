//! Trending route - interaction counts over a rolling window

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::models::{ApiError, ErrorBody, TrendingProduct, TrendingResponse};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    /// Window spec like "30m", "24h" or "7d"
    pub window: Option<String>,
    pub limit: Option<i64>,
}

/// Most-interacted products over a rolling window
#[utoipa::path(
    get,
    path = "/trending",
    params(
        ("window" = Option<String>, Query, description = "Rolling window, e.g. 24h or 7d"),
        ("limit" = Option<i64>, Query, description = "Result limit, default 10, max 50")
    ),
    responses(
        (status = 200, description = "Products ordered by interaction count", body = TrendingResponse),
        (status = 400, description = "Unparseable window or limit", body = ErrorBody),
        (status = 503, description = "Vector store unavailable", body = ErrorBody)
    ),
    tag = "Trending"
)]
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<TrendingResponse>, ApiError> {
    let (window, listing) = state
        .search_service
        .trending(params.window, params.limit)
        .await?;

    Ok(Json(TrendingResponse {
        window,
        products: listing
            .into_iter()
            .map(|(product, count)| TrendingProduct::from_product(product, count))
            .collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/trending", get(trending))
}
