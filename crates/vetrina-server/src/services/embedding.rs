//! Embedding client for OpenAI's embeddings endpoint
//!
//! Batches multiple texts per provider call and retries transport and
//! rate-limit failures with exponential backoff (3 attempts, 500ms
//! doubling) before surfacing `DomainError::EmbeddingProvider`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use vetrina::{DomainError, EmbeddingProvider};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const MODELS_URL: &str = "https://api.openai.com/v1/models";

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Embedding service for generating vectors
#[derive(Clone)]
pub struct OpenAiEmbedding {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedding {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    /// Provider reachability for the health endpoint
    pub async fn reachable(&self) -> bool {
        self.client
            .get(MODELS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RequestError> {
        let request = EmbeddingRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| RequestError::retryable(format!("transport: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("provider returned {}: {}", status, body);
            // Rate limits and server-side failures are worth retrying;
            // a rejected request (bad key, oversized input) is not.
            return if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                Err(RequestError::retryable(message))
            } else {
                Err(RequestError::fatal(message))
            };
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RequestError::fatal(format!("malformed response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(RequestError::fatal(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The provider tags each embedding with its input index
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    async fn with_retries(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut backoff = BASE_BACKOFF;
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            match self.request_embeddings(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(RequestError { message, retryable }) => {
                    if !retryable {
                        return Err(DomainError::EmbeddingProvider(message));
                    }
                    last_error = message;
                    if attempt < MAX_ATTEMPTS {
                        tracing::warn!(
                            "Embedding attempt {}/{} failed: {}, retrying in {:?}",
                            attempt,
                            MAX_ATTEMPTS,
                            last_error,
                            backoff
                        );
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(DomainError::EmbeddingProvider(format!(
            "retries exhausted: {}",
            last_error
        )))
    }
}

struct RequestError {
    message: String,
    retryable: bool,
}

impl RequestError {
    fn retryable(message: String) -> Self {
        Self {
            message,
            retryable: true,
        }
    }

    fn fatal(message: String) -> Self {
        Self {
            message,
            retryable: false,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let texts = [text.to_string()];
        let mut vectors = self.with_retries(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| DomainError::EmbeddingProvider("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.with_retries(texts).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
