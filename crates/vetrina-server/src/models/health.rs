//! Health check DTO

use serde::Serialize;
use utoipa::ToSchema;

/// Health response. The endpoint itself never fails; unreachable
/// dependencies show up as `false`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub store_reachable: bool,
    pub embedding_provider_reachable: bool,
    pub version: String,
}
