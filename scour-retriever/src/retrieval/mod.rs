pub mod cache;
pub mod chunk;
pub mod preselect;
pub mod rerank;
pub mod retriever;

pub use cache::{CacheError, CacheResult, EmbeddingCache};
pub use chunk::{Candidate, DocChunk, chunks_from_text};
pub use preselect::{cosine_similarity, preselect};
pub use rerank::{
    CohereReranker, NoopReranker, RerankError, RerankItem, RerankResult, Reranker, make_reranker,
};
pub use retriever::{DEFAULT_PRESELECT_FACTOR, EMBED_BATCH_SIZE, EmbedStats, Retriever};
