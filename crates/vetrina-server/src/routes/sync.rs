//! Catalog sync route - administrative ingestion trigger

use axum::{extract::State, middleware, routing::post, Json, Router};

use crate::auth;
use crate::models::{ApiError, ErrorBody, SyncRequest, SyncResponse};
use crate::AppState;

/// Trigger a catalog sync
#[utoipa::path(
    post,
    path = "/catalog/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Sync report (failed > 0 is a partial success)", body = SyncResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 409, description = "A sync is already running", body = ErrorBody),
        (status = 502, description = "Upstream catalog failure", body = ErrorBody)
    ),
    tag = "Catalog"
)]
pub async fn sync_catalog(
    State(state): State<AppState>,
    payload: Option<Json<SyncRequest>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let full = payload.map(|Json(p)| p.full).unwrap_or(false);
    let report = state.sync_service.sync(full).await?;
    Ok(Json(report.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog/sync", post(sync_catalog))
        .layer(middleware::from_fn(auth::require_api_key))
}
