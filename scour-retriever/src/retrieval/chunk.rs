//! Core data types flowing through the retrieval pipeline.

use scour_context::WindowChunker;

/// A bounded slice of source text with a stable `(source_id, index)`
/// identity within a corpus.
///
/// Chunks are produced once per indexing pass and held in memory for the
/// lifetime of a query session. `text` is immutable after creation; the
/// embedding `vector` is the only mutable field and is populated lazily by
/// [`Retriever::embed_chunks`](crate::retrieval::Retriever::embed_chunks),
/// either from the cache or from the embedding provider.
#[derive(Debug, Clone)]
pub struct DocChunk {
    /// Identifier of the source document (typically a file path)
    pub source_id: String,
    /// Position of this chunk within its source, 0-indexed
    pub index: usize,
    /// The chunk's text content
    pub text: String,
    /// Embedding vector, populated lazily
    pub vector: Option<Vec<f32>>,
}

impl DocChunk {
    /// Create an unembedded chunk.
    pub fn new(source_id: impl Into<String>, index: usize, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            index,
            text: text.into(),
            vector: None,
        }
    }

    /// Whether this chunk carries an embedding and can be scored.
    pub fn is_embedded(&self) -> bool {
        self.vector.is_some()
    }
}

/// Split one document into chunks with sequential indices under a single
/// `source_id`.
///
/// This is the indexing-side bridge between the windowing in
/// `scour-context` and the pipeline's [`DocChunk`] identity scheme: window
/// `n` of a document becomes chunk `(source_id, n)`.
pub fn chunks_from_text(source_id: &str, text: &str, chunker: &WindowChunker) -> Vec<DocChunk> {
    chunker
        .chunk(text)
        .into_iter()
        .enumerate()
        .map(|(index, window)| DocChunk::new(source_id, index, window))
        .collect()
}

/// A scored reference into a chunk corpus.
///
/// `index` is always a position in the caller's chunk slice, never a
/// provider-internal position. Candidates are ephemeral: produced by
/// preselection, re-ranking, and queries, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position of the chunk in the corpus passed to the pipeline
    pub index: usize,
    /// Relevance score: cosine similarity after preselection, provider
    /// relevance after re-ranking (0.0 from the no-op reranker)
    pub score: f32,
}

impl Candidate {
    pub fn new(index: usize, score: f32) -> Self {
        Self { index, score }
    }
}
