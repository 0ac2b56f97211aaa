pub mod text;

// Re-export the main chunking types for external use
pub use text::{DEFAULT_MAX_CHARS, DEFAULT_MAX_CHUNKS, DEFAULT_OVERLAP, WindowChunker};
