//! Bearer-token gate for administrative endpoints (catalog sync)

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// API key from the environment, set once at startup
static API_KEY: std::sync::OnceLock<String> = std::sync::OnceLock::new();

pub fn init_api_key(key: String) {
    let _ = API_KEY.set(key);
}

fn configured_key() -> Option<&'static str> {
    API_KEY.get().map(|s| s.as_str()).filter(|s| !s.is_empty())
}

/// Validates `Authorization: Bearer <key>` against the configured API key.
/// With no key configured the gate is open (development mode).
pub async fn require_api_key(request: Request, next: Next) -> Result<Response, StatusCode> {
    let Some(expected) = configured_key() else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Sync request with invalid API key");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Sync request without Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
