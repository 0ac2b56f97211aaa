//! Second-pass re-ranking of a preselected candidate pool.
//!
//! Re-ranking models score query/document pairs directly, which is far more
//! precise than embedding cosine similarity but also far more expensive per
//! item. The pipeline therefore delegates recall to the cosine stage and
//! hands the re-ranker only a small pool.
//!
//! The stage is a strategy object chosen at retriever construction:
//! [`NoopReranker`] keeps the pool order (two-stage plumbing with one-stage
//! behavior), [`CohereReranker`] calls a Cohere-compatible `/rerank`
//! endpoint. Configuration problems (missing key, unknown kind) surface at
//! construction, distinctly from query-time provider failures.

use super::chunk::Candidate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for re-ranking operations.
pub type RerankResult<T> = std::result::Result<T, RerankError>;

/// Errors from re-ranker construction and re-ranking calls.
#[derive(Debug, thiserror::Error)]
pub enum RerankError {
    /// Construction-time configuration problem; fatal, never retried
    #[error("Invalid reranker configuration: {message}")]
    InvalidConfig { message: String },

    /// The HTTP request itself failed (connect, timeout, decode)
    #[error("Rerank request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status
    #[error("Rerank provider returned {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider referenced a document position it was never sent
    #[error("Rerank result referenced position {position}, but only {sent} documents were sent")]
    UnknownPosition { position: usize, sent: usize },
}

impl RerankError {
    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// One candidate handed to a re-ranker: the chunk's corpus index plus its
/// text. Carrying the corpus index through the call is what lets results be
/// mapped back after the provider reorders or drops documents.
#[derive(Debug, Clone)]
pub struct RerankItem {
    /// Position of the chunk in the caller's corpus
    pub index: usize,
    /// Chunk text submitted as a document
    pub text: String,
}

impl RerankItem {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Strategy interface for the optional re-ranking stage.
///
/// Implementations return candidates in descending score order. Every
/// returned [`Candidate::index`] must be one of the submitted
/// [`RerankItem::index`] values — never a provider-internal position — even
/// when the provider reorders or drops documents.
#[async_trait]
pub trait Reranker: Send + Sync + std::fmt::Debug {
    /// Short identifier, used in logs
    fn name(&self) -> &str;

    /// Score `items` against `query`, descending by score.
    async fn rerank(&self, query: &str, items: &[RerankItem]) -> RerankResult<Vec<Candidate>>;
}

/// Passthrough re-ranker: preserves pool order with a neutral score of 0.0.
#[derive(Debug, Default)]
pub struct NoopReranker;

#[async_trait]
impl Reranker for NoopReranker {
    fn name(&self) -> &str {
        "none"
    }

    async fn rerank(&self, _query: &str, items: &[RerankItem]) -> RerankResult<Vec<Candidate>> {
        Ok(items
            .iter()
            .map(|item| Candidate::new(item.index, 0.0))
            .collect())
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<&'a str>,
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankRow>,
}

#[derive(Deserialize)]
struct RerankRow {
    index: usize,
    relevance_score: f32,
}

/// Environment variable consulted when no Cohere key is supplied explicitly.
pub const COHERE_API_KEY_ENV: &str = "COHERE_API_KEY";

/// Re-ranker backed by a Cohere-compatible `/rerank` endpoint.
#[derive(Debug)]
pub struct CohereReranker {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl CohereReranker {
    /// Default rerank model.
    pub const DEFAULT_MODEL: &'static str = "rerank-multilingual-v3.0";
    /// Default API base for hosted Cohere.
    pub const DEFAULT_API_BASE: &'static str = "https://api.cohere.com/v2";

    /// Create a re-ranker, resolving the API key from `api_key` or the
    /// [`COHERE_API_KEY_ENV`] environment variable.
    ///
    /// A missing key is a configuration error reported here, not on the
    /// first query.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> RerankResult<Self> {
        let api_key = api_key
            .or_else(|| std::env::var(COHERE_API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RerankError::invalid_config(format!("{COHERE_API_KEY_ENV} is not set"))
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            model: model.into(),
            api_key,
        })
    }

    /// Override the API base URL (self-hosted or proxy deployments).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    fn name(&self) -> &str {
        "cohere"
    }

    async fn rerank(&self, query: &str, items: &[RerankItem]) -> RerankResult<Vec<Candidate>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(pool = items.len(), model = %self.model, "reranking candidates");

        let response = self
            .client
            .post(format!("{}/rerank", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&RerankRequest {
                model: &self.model,
                query,
                documents: items.iter().map(|item| item.text.as_str()).collect(),
                top_n: items.len(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RerankError::Provider { status, body });
        }

        let payload: RerankResponse = response.json().await?;

        // Each row's `index` points into the documents list we sent, which
        // the provider reorders and may shorten. Map through `items` to
        // recover corpus indices; positional correspondence cannot be
        // assumed.
        payload
            .results
            .into_iter()
            .map(|row| {
                let item = items.get(row.index).ok_or(RerankError::UnknownPosition {
                    position: row.index,
                    sent: items.len(),
                })?;
                Ok(Candidate::new(item.index, row.relevance_score))
            })
            .collect()
    }
}

/// Build a re-ranker by kind name: `none`/`noop`/`off` for the passthrough,
/// `cohere`/`cohere-v3`/`cohere-multi` for the Cohere-backed one. Unknown
/// kinds are configuration errors.
pub fn make_reranker(
    kind: &str,
    model: Option<String>,
    api_key: Option<String>,
) -> RerankResult<Box<dyn Reranker>> {
    match kind.to_ascii_lowercase().as_str() {
        "" | "none" | "noop" | "off" => Ok(Box::new(NoopReranker)),
        "cohere" | "cohere-v3" | "cohere-multi" => {
            let model = model.unwrap_or_else(|| CohereReranker::DEFAULT_MODEL.to_string());
            Ok(Box::new(CohereReranker::new(model, api_key)?))
        }
        other => Err(RerankError::invalid_config(format!(
            "unknown reranker kind: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_preserves_order_with_neutral_scores() {
        let items = vec![RerankItem::new(5, "cat"), RerankItem::new(9, "dog")];
        let result = NoopReranker.rerank("animals", &items).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0], Candidate::new(5, 0.0));
        assert_eq!(result[1], Candidate::new(9, 0.0));
    }

    #[tokio::test]
    async fn noop_on_empty_pool() {
        let result = NoopReranker.rerank("anything", &[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn cohere_requires_a_key() {
        // Explicitly blank key so an ambient COHERE_API_KEY cannot leak in.
        let err = CohereReranker::new("rerank-test", Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, RerankError::InvalidConfig { .. }));
    }

    #[test]
    fn factory_maps_noop_kinds() {
        for kind in ["none", "noop", "off", "NONE", ""] {
            let reranker = make_reranker(kind, None, None).unwrap();
            assert_eq!(reranker.name(), "none");
        }
    }

    #[test]
    fn factory_builds_cohere_with_explicit_key() {
        let reranker = make_reranker("cohere", None, Some("test-key".to_string())).unwrap();
        assert_eq!(reranker.name(), "cohere");
    }

    #[test]
    fn factory_rejects_unknown_kinds() {
        let err = make_reranker("bm25", None, None).unwrap_err();
        assert!(matches!(err, RerankError::InvalidConfig { .. }));
    }
}
