//! Recommendations route - similar products for a catalog item

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::models::{ApiError, ErrorBody, SearchResponse};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    pub session_id: Option<String>,
    pub limit: Option<i64>,
}

/// Products similar to a given product
#[utoipa::path(
    get,
    path = "/recommendations/{product_id}",
    params(
        ("product_id" = i64, Path, description = "Catalog product id"),
        ("session_id" = Option<String>, Query, description = "Session to personalize for"),
        ("limit" = Option<i64>, Query, description = "Result limit, default 5, max 50")
    ),
    responses(
        (status = 200, description = "Similar products, seed excluded", body = SearchResponse),
        (status = 404, description = "Unknown product", body = ErrorBody),
        (status = 503, description = "Vector store unavailable", body = ErrorBody)
    ),
    tag = "Recommendations"
)]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let outcome = state
        .search_service
        .recommend(product_id, params.session_id, params.limit)
        .await?;

    Ok(Json(SearchResponse {
        results: outcome.results.into_iter().map(Into::into).collect(),
        suggestions: outcome.suggestions,
        message: outcome.message,
        session_id: outcome.session_id,
        degraded: outcome.degraded,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/recommendations/:product_id", get(recommendations))
}
