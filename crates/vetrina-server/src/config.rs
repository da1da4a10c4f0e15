//! Server configuration from environment variables
//!
//! Every tunable carries a documented default; none of the defaults are
//! normative (similarity metric, weights and windows are deployment policy).

use std::time::Duration;

use vetrina::RankingWeights;

/// Application configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port (PORT, default 8001; parse failures fall back)
    pub port: u16,
    /// Qdrant endpoint (QDRANT_URL)
    pub qdrant_url: String,
    /// Optional Qdrant API key (QDRANT_API_KEY)
    pub qdrant_api_key: Option<String>,
    /// OpenAI API key for embeddings (OPENAI_API_KEY)
    pub openai_api_key: String,
    /// Embedding model tag (EMBEDDING_MODEL, default text-embedding-3-small)
    pub embedding_model: String,
    /// Embedding dimension (EMBEDDING_DIM, default 1536)
    pub embedding_dim: u64,
    /// Upstream catalog products endpoint (CATALOG_URL)
    pub catalog_url: String,
    /// Catalog API credentials (CATALOG_KEY / CATALOG_SECRET)
    pub catalog_key: String,
    pub catalog_secret: String,
    /// Optional bearer token protecting the sync endpoint (VETRINA_API_KEY)
    pub api_key: Option<String>,
    /// Optional periodic incremental sync interval (SYNC_INTERVAL_SECS)
    pub sync_interval_secs: Option<u64>,
    /// Ranking weights (RANK_W_SIMILARITY / RANK_W_CATEGORY /
    /// RANK_W_RECENCY / RANK_W_PRICE)
    pub weights: RankingWeights,
    /// Session inactivity window (SESSION_TTL_SECS, default 1800)
    pub session_ttl: Duration,
    /// Geometric decay per prior query (QUERY_DECAY, default 0.7)
    pub query_decay: f32,
    /// Candidate over-fetch factor (OVERFETCH_FACTOR, default 3)
    pub overfetch_factor: usize,
    /// Query-path embedding timeout (EMBED_TIMEOUT_SECS, default 5)
    pub embed_timeout: Duration,
    /// Default trending window (TRENDING_WINDOW, default "24h")
    pub trending_window: String,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Only the store, embedding and catalog credentials are required;
    /// everything else has a default.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(port) => Some(port),
                Err(e) => {
                    tracing::warn!("Failed to parse PORT '{}': {}, using default", raw, e);
                    None
                }
            })
            .unwrap_or(8001);

        let weights = RankingWeights {
            similarity: env_f32("RANK_W_SIMILARITY", 0.7),
            category_affinity: env_f32("RANK_W_CATEGORY", 0.15),
            catalog_recency: env_f32("RANK_W_RECENCY", 0.05),
            price_deviation: env_f32("RANK_W_PRICE", 0.1),
        };

        Ok(Self {
            port,
            qdrant_url: required("QDRANT_URL")?,
            qdrant_api_key: std::env::var("QDRANT_API_KEY").ok(),
            openai_api_key: required("OPENAI_API_KEY")?,
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            embedding_dim: env_u64("EMBEDDING_DIM", 1536),
            catalog_url: required("CATALOG_URL")?,
            catalog_key: std::env::var("CATALOG_KEY").unwrap_or_default(),
            catalog_secret: std::env::var("CATALOG_SECRET").unwrap_or_default(),
            api_key: std::env::var("VETRINA_API_KEY").ok().filter(|k| !k.is_empty()),
            sync_interval_secs: std::env::var("SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
            weights,
            session_ttl: Duration::from_secs(env_u64("SESSION_TTL_SECS", 1800)),
            query_decay: env_f32("QUERY_DECAY", 0.7),
            overfetch_factor: env_u64("OVERFETCH_FACTOR", 3) as usize,
            embed_timeout: Duration::from_secs(env_u64("EMBED_TIMEOUT_SECS", 5)),
            trending_window: std::env::var("TRENDING_WINDOW")
                .unwrap_or_else(|_| "24h".to_string()),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("{} must be set", key))
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse a rolling-window spec like "24h", "30m" or "7d" into a duration.
pub fn parse_window(spec: &str) -> Option<Duration> {
    let mut chars = spec.trim().chars();
    let unit = chars.next_back()?;
    let value: u64 = chars.as_str().parse().ok()?;
    match unit {
        'm' => Some(Duration::from_secs(value * 60)),
        'h' => Some(Duration::from_secs(value * 3600)),
        'd' => Some(Duration::from_secs(value * 86400)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("24h"), Some(Duration::from_secs(86400)));
        assert_eq!(parse_window("30m"), Some(Duration::from_secs(1800)));
        assert_eq!(parse_window("7d"), Some(Duration::from_secs(604800)));
        assert_eq!(parse_window("yesterday"), None);
        assert_eq!(parse_window(""), None);
    }

    #[test]
    fn test_parse_window_rejects_multibyte_units() {
        // The unit may be any char the client sends; never a panic
        assert_eq!(parse_window("1µ"), None);
        assert_eq!(parse_window("µ"), None);
        assert_eq!(parse_window("24時"), None);
    }
}
