//! Embedding provider implementations

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    /// The generated embeddings, one per input text
    pub embeddings: Vec<Vec<f32>>,
    /// The dimension of each embedding vector
    pub dimension: usize,
}

impl EmbeddingResult {
    /// Create a new embedding result, inferring the dimension from the first
    /// vector (0 when empty).
    pub fn new(embeddings: Vec<Vec<f32>>) -> Self {
        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        Self {
            embeddings,
            dimension,
        }
    }

    /// Number of embedding vectors in this result.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Whether this result contains no embedding vectors.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Trait for embedding providers that can generate embeddings from text.
///
/// The retrieval pipeline consumes providers through this narrow contract:
/// a batch of texts in, one vector per text out, in input order. Batch
/// sizing is the caller's concern; a single `embed_texts` call maps to a
/// single provider request.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let result = self.embed_texts(&texts).await?;
        result
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::malformed_response("no embedding generated for text"))
    }

    /// Generate embeddings for multiple texts in one request
    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult>;

    /// Name/identifier of this provider
    fn provider_name(&self) -> &str;
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

/// Provider backed by a remote OpenAI-compatible `/embeddings` endpoint.
///
/// Construction validates the configuration (see [`EmbedConfig::validate`]);
/// a missing API key is reported here, not on the first request.
#[derive(Debug, Clone)]
pub struct RemoteEmbeddingProvider {
    client: reqwest::Client,
    config: EmbedConfig,
}

impl RemoteEmbeddingProvider {
    /// Create a provider for the given configuration.
    pub fn new(config: EmbedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    /// The configuration this provider was built from.
    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        if texts.is_empty() {
            return Ok(EmbeddingResult::new(vec![]));
        }

        tracing::debug!(count = texts.len(), model = %self.config.model, "requesting embeddings");

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingsRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Provider { status, body });
        }

        let payload: EmbeddingsResponse = response.json().await?;
        if payload.data.len() != texts.len() {
            return Err(EmbedError::malformed_response(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                payload.data.len()
            )));
        }

        // Rows may arrive out of order; place each by its declared index.
        let mut embeddings = vec![Vec::new(); texts.len()];
        for row in payload.data {
            let slot = embeddings.get_mut(row.index).ok_or_else(|| {
                EmbedError::malformed_response(format!(
                    "embedding row index {} out of range for {} inputs",
                    row.index,
                    texts.len()
                ))
            })?;
            *slot = row.embedding;
        }

        Ok(EmbeddingResult::new(embeddings))
    }

    fn provider_name(&self) -> &str {
        "remote-openai"
    }
}
