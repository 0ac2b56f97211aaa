//! # scour-embed
//!
//! The embedding boundary of the scour retrieval pipeline: a narrow trait
//! for turning batches of text into fixed-length vectors, plus a provider
//! implementation for remote OpenAI-compatible `/embeddings` endpoints.
//!
//! ## Design
//!
//! - **Narrow contract**: [`EmbeddingProvider`] takes a batch of texts and
//!   returns one vector per text, in input order. Callers own batch sizing
//!   and retry policy; one `embed_texts` call is one provider request.
//! - **Configuration vs. call-time failures**: a missing API key or blank
//!   model is rejected at construction ([`EmbedError::InvalidConfig`]);
//!   network and HTTP failures surface per call and are never retried
//!   internally.
//! - **Async-first**: providers are `async` via `async-trait` since the
//!   only suspension points in the pipeline are these network calls.
//!
//! ## Quick start
//!
//! ```no_run
//! use scour_embed::{EmbedConfig, EmbeddingProvider, RemoteEmbeddingProvider};
//!
//! # async fn example() -> scour_embed::Result<()> {
//! let provider = RemoteEmbeddingProvider::new(EmbedConfig::from_env())?;
//!
//! let texts = vec!["Hello world".to_string(), "How are you?".to_string()];
//! let result = provider.embed_texts(&texts).await?;
//!
//! println!("{} embeddings of dimension {}", result.len(), result.dimension);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod provider;

// Re-export main types for easy access
pub use config::{API_KEY_ENV, EmbedConfig};
pub use error::{EmbedError, Result};
pub use provider::{EmbeddingProvider, EmbeddingResult, RemoteEmbeddingProvider};
