//! scour-retriever: embedding-based retrieval pipeline
//!
//! Composes chunk embedding (with a durable content-addressed cache),
//! cosine-similarity preselection, and an optional re-ranking stage into a
//! single `query(chunks, question, top_k)` entry point. Chunking lives in
//! `scour-context`; the embedding provider boundary lives in `scour-embed`.
//!
//! ## Architecture
//!
//! ```text
//! text ──chunk──▶ DocChunk ──embed (cache ⇄ provider)──▶ vectors
//!                                                          │
//!                      Candidates ◀──rerank?◀──preselect──┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use scour_retriever::retrieval::{DocChunk, EmbeddingCache, Retriever};
//! use scour_embed::{EmbedConfig, RemoteEmbeddingProvider};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = RemoteEmbeddingProvider::new(EmbedConfig::from_env())?;
//! let mut retriever = Retriever::new(Box::new(provider))
//!     .with_cache(EmbeddingCache::open(Path::new(".scour/cache"))?);
//!
//! let mut chunks = vec![
//!     DocChunk::new("notes.md", 0, "apples and bananas are fruit"),
//!     DocChunk::new("notes.md", 1, "cars need fuel"),
//! ];
//! retriever.embed_chunks(&mut chunks).await?;
//!
//! for candidate in retriever.query(&chunks, "fruit", 1).await? {
//!     println!("{:.3}  {}", candidate.score, chunks[candidate.index].text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod retrieval;
