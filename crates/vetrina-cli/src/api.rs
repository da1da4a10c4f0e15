//! Vetrina API Client

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// API Client for Vetrina
pub struct VetrinaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

// ============================================
// API Request/Response Types
// ============================================

#[derive(Debug, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

#[derive(Debug, Default, Serialize)]
pub struct Filters {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub in_stock_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct RankedProduct {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub permalink: String,
    pub in_stock: bool,
    pub score: f32,
    pub rank: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<RankedProduct>,
    pub suggestions: Vec<String>,
    pub message: String,
    pub session_id: String,
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct TrendingProduct {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub interactions: usize,
}

#[derive(Debug, Deserialize)]
pub struct TrendingResponse {
    pub window: String,
    pub products: Vec<TrendingProduct>,
}

#[derive(Debug, Serialize)]
pub struct SyncRequest {
    pub full: bool,
}

#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<String>,
    pub duration_ms: u64,
    pub full: bool,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_reachable: bool,
    pub embedding_provider_reachable: bool,
    pub version: String,
}

impl VetrinaClient {
    /// Create a new API client
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Service health
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to Vetrina API")?;
        let health: HealthResponse = resp.json().await.context("Failed to parse response")?;
        Ok(health)
    }

    /// Run a search
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to connect to Vetrina API")?;

        Self::parse(resp).await
    }

    /// Products similar to a given product
    pub async fn recommend(
        &self,
        product_id: i64,
        session_id: Option<&str>,
        limit: Option<i64>,
    ) -> Result<SearchResponse> {
        let mut url = format!("{}/recommendations/{}", self.base_url, product_id);
        let mut params = Vec::new();
        if let Some(session_id) = session_id {
            params.push(format!("session_id={}", urlencoding::encode(session_id)));
        }
        if let Some(limit) = limit {
            params.push(format!("limit={}", limit));
        }
        if !params.is_empty() {
            url = format!("{}?{}", url, params.join("&"));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to Vetrina API")?;

        Self::parse(resp).await
    }

    /// Trending listing
    pub async fn trending(
        &self,
        window: Option<&str>,
        limit: Option<i64>,
    ) -> Result<TrendingResponse> {
        let mut url = format!("{}/trending", self.base_url);
        let mut params = Vec::new();
        if let Some(window) = window {
            params.push(format!("window={}", urlencoding::encode(window)));
        }
        if let Some(limit) = limit {
            params.push(format!("limit={}", limit));
        }
        if !params.is_empty() {
            url = format!("{}?{}", url, params.join("&"));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to Vetrina API")?;

        Self::parse(resp).await
    }

    /// Trigger a catalog sync (requires the API key)
    pub async fn sync(&self, full: bool) -> Result<SyncResponse> {
        let url = format!("{}/catalog/sync", self.base_url);
        let mut request = self.client.post(&url).json(&SyncRequest { full });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let resp = request
            .send()
            .await
            .context("Failed to connect to Vetrina API")?;

        Self::parse(resp).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }
        resp.json().await.context("Failed to parse response")
    }
}
