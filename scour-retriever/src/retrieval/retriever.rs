//! Two-stage retrieval orchestration.
//!
//! Composes the pipeline: cache lookup → batched embedding → cosine
//! preselection → optional re-ranking. Stage 1 (cosine over every embedded
//! chunk) is cheap and recall-oriented; stage 2 hands a wider pool —
//! `top_k * preselect_factor` candidates — to the re-ranker, which is
//! precision-oriented and expensive per item. Without a re-ranker the
//! retriever behaves exactly like the classic single-stage cosine top-k.
//!
//! Steps within one call are strictly sequential; the only suspension
//! points are the provider calls. Concurrent `embed_chunks` and `query`
//! against the same corpus are not coordinated here — usage is
//! single-writer, read-after-write-complete.

use super::cache::EmbeddingCache;
use super::chunk::{Candidate, DocChunk};
use super::preselect::preselect;
use super::rerank::{Reranker, RerankItem};
use anyhow::{Context, Result, ensure};
use scour_embed::EmbeddingProvider;

/// Pending chunks are embedded in fixed-size batches to bound request size
/// and amortize network latency.
pub const EMBED_BATCH_SIZE: usize = 16;

/// Default width multiplier for the stage-1 pool when a re-ranker is
/// configured.
pub const DEFAULT_PRESELECT_FACTOR: usize = 5;

/// Counters from one [`Retriever::embed_chunks`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedStats {
    /// Chunks that already carried a vector
    pub already_embedded: usize,
    /// Chunks filled from the cache without a provider call
    pub cache_hits: usize,
    /// Chunks embedded through the provider in this pass
    pub newly_embedded: usize,
}

/// Orchestrates embedding, preselection, and optional re-ranking over an
/// in-memory chunk corpus.
///
/// Built from an [`EmbeddingProvider`] plus optional collaborators via
/// `with_*` methods:
///
/// ```no_run
/// use scour_embed::{EmbedConfig, RemoteEmbeddingProvider};
/// use scour_retriever::retrieval::{EmbeddingCache, Retriever};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let provider = RemoteEmbeddingProvider::new(EmbedConfig::from_env())?;
/// let cache = EmbeddingCache::open(Path::new(".scour/cache"))?;
/// let retriever = Retriever::new(Box::new(provider))
///     .with_cache(cache)
///     .with_preselect_factor(5)
///     .with_rerank_threshold(0.2);
/// # Ok(())
/// # }
/// ```
pub struct Retriever {
    provider: Box<dyn EmbeddingProvider>,
    cache: Option<EmbeddingCache>,
    reranker: Option<Box<dyn Reranker>>,
    preselect_factor: usize,
    rerank_top_k: Option<usize>,
    rerank_threshold: Option<f32>,
}

impl Retriever {
    /// Create a single-stage retriever with no cache and no re-ranker.
    pub fn new(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            cache: None,
            reranker: None,
            preselect_factor: DEFAULT_PRESELECT_FACTOR,
            rerank_top_k: None,
            rerank_threshold: None,
        }
    }

    /// Attach a durable embedding cache.
    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a re-ranking stage, switching `query` to two-stage mode.
    pub fn with_reranker(mut self, reranker: Box<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Set the stage-1 pool multiplier (floored at 1).
    pub fn with_preselect_factor(mut self, factor: usize) -> Self {
        self.preselect_factor = factor.max(1);
        self
    }

    /// Override the final result count after re-ranking (defaults to the
    /// `top_k` passed to `query`).
    pub fn with_rerank_top_k(mut self, top_k: usize) -> Self {
        self.rerank_top_k = Some(top_k);
        self
    }

    /// Drop re-ranked candidates scoring below `threshold`. Applied before
    /// the final truncation, so the result may be smaller than `top_k`.
    pub fn with_rerank_threshold(mut self, threshold: f32) -> Self {
        self.rerank_threshold = Some(threshold);
        self
    }

    /// Populate `vector` on every chunk, in place.
    ///
    /// Chunks are partitioned into already-vectorized, cache-hit, and
    /// pending; only pending chunks reach the provider, in batches of
    /// [`EMBED_BATCH_SIZE`]. Freshly embedded vectors are staged and written
    /// to the cache in one bulk append at the end. Idempotent: a second pass
    /// over the same corpus issues no provider calls.
    ///
    /// A provider failure on any batch fails the whole call; the caller
    /// decides whether to retry the operation. A cache write failure does
    /// not — vectors are already assigned in memory, and the worst case is
    /// re-embedding on the next run.
    pub async fn embed_chunks(&mut self, chunks: &mut [DocChunk]) -> Result<EmbedStats> {
        let mut stats = EmbedStats::default();
        let mut pending: Vec<usize> = Vec::new();

        for (position, chunk) in chunks.iter_mut().enumerate() {
            if chunk.is_embedded() {
                stats.already_embedded += 1;
                continue;
            }
            if let Some(cache) = &self.cache {
                if let Some(vector) = cache.get(&chunk.source_id, chunk.index, &chunk.text) {
                    chunk.vector = Some(vector.to_vec());
                    stats.cache_hits += 1;
                    continue;
                }
            }
            pending.push(position);
        }

        tracing::debug!(
            ready = stats.already_embedded,
            cache_hits = stats.cache_hits,
            pending = pending.len(),
            "embedding coverage before provider calls"
        );

        if pending.is_empty() {
            return Ok(stats);
        }

        let mut staged: Vec<(String, usize, String, Vec<f32>)> = Vec::new();
        for batch in pending.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch
                .iter()
                .map(|&position| chunks[position].text.clone())
                .collect();

            let result = self
                .provider
                .embed_texts(&texts)
                .await
                .context("embedding provider call failed")?;
            ensure!(
                result.len() == batch.len(),
                "provider returned {} vectors for a batch of {}",
                result.len(),
                batch.len()
            );

            for (&position, vector) in batch.iter().zip(result.embeddings) {
                let chunk = &mut chunks[position];
                if self.cache.is_some() {
                    staged.push((
                        chunk.source_id.clone(),
                        chunk.index,
                        chunk.text.clone(),
                        vector.clone(),
                    ));
                }
                chunk.vector = Some(vector);
                stats.newly_embedded += 1;
            }
        }

        if !staged.is_empty() {
            if let Some(cache) = &mut self.cache {
                // Treat a failed append as a cache miss on the next run rather
                // than failing an embedding pass that already succeeded.
                if let Err(error) = cache.put_many(staged) {
                    tracing::warn!(%error, "failed to persist embeddings to cache");
                }
            }
        }

        Ok(stats)
    }

    /// Retrieve the `top_k` most relevant chunks for `question`.
    ///
    /// Without a re-ranker this is single-stage cosine top-k. With one, a
    /// pool of `top_k * preselect_factor` candidates is preselected, the
    /// re-ranker reorders it, an optional relevance threshold filters it,
    /// and the result is truncated to `rerank_top_k` (or `top_k`).
    ///
    /// Chunks without vectors never rank; a corpus with zero scorable
    /// chunks yields an empty result, not an error.
    pub async fn query(
        &self,
        chunks: &[DocChunk],
        question: &str,
        top_k: usize,
    ) -> Result<Vec<Candidate>> {
        let query_vector = self
            .provider
            .embed_text(question)
            .await
            .context("failed to embed the query")?;

        let Some(reranker) = &self.reranker else {
            return Ok(preselect(chunks, &query_vector, top_k.min(chunks.len())));
        };

        let pool_k = (top_k.saturating_mul(self.preselect_factor)).max(top_k);
        let pool = preselect(chunks, &query_vector, pool_k.min(chunks.len()));
        let items: Vec<RerankItem> = pool
            .iter()
            .map(|candidate| RerankItem::new(candidate.index, chunks[candidate.index].text.clone()))
            .collect();

        let mut ranked = reranker
            .rerank(question, &items)
            .await
            .with_context(|| format!("reranker '{}' failed", reranker.name()))?;

        if let Some(threshold) = self.rerank_threshold {
            ranked.retain(|candidate| candidate.score >= threshold);
        }
        ranked.truncate(self.rerank_top_k.unwrap_or(top_k));

        Ok(ranked)
    }
}
