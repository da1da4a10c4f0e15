//! Search route - HTTP surface over SearchService

use axum::{extract::State, routing::post, Json, Router};

use crate::models::{ApiError, ErrorBody, SearchRequest, SearchResponse};
use crate::AppState;

/// Semantic product search
#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Ranked results with suggestions", body = SearchResponse),
        (status = 400, description = "Empty query or limit out of range", body = ErrorBody),
        (status = 502, description = "Embedding provider failure", body = ErrorBody)
    ),
    tag = "Search"
)]
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let filters = payload.filters.unwrap_or_default().into();
    let outcome = state
        .search_service
        .search(&payload.query, payload.session_id, payload.limit, filters)
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
    Router::new().route("/search", post(search))
}
