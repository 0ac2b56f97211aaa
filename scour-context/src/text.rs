//! Sliding-window text chunking for retrieval pipelines.
//!
//! Raw document text is split into fixed-size, optionally overlapping windows
//! so that each piece fits comfortably inside an embedding model's input
//! limit. The windowing is intentionally dumb: no delimiter detection, no
//! language awareness, just byte offsets snapped to UTF-8 character
//! boundaries. Overlap exists so that a sentence cut at a window edge still
//! appears whole in the neighboring window.
//!
//! The chunker is a pure function over its inputs: no I/O, no allocation
//! beyond the returned strings, and the same text always produces the same
//! windows.
//!
//! ```
//! use scour_context::WindowChunker;
//!
//! let chunker = WindowChunker::new(10, 0, 100);
//! let windows = chunker.chunk("the quick brown fox jumps over the lazy dog");
//!
//! // With zero overlap the windows tile the input exactly.
//! assert_eq!(windows.concat(), "the quick brown fox jumps over the lazy dog");
//! assert!(windows.iter().all(|w| w.len() <= 10));
//! ```

use serde::{Deserialize, Serialize};

/// Default window size in bytes, substituted when a zero size is requested.
pub const DEFAULT_MAX_CHARS: usize = 4000;
/// Default overlap between consecutive windows.
pub const DEFAULT_OVERLAP: usize = 200;
/// Default hard cap on the number of windows produced per input.
pub const DEFAULT_MAX_CHUNKS: usize = 200;

/// Splits text into overlapping fixed-size windows.
///
/// Limits are validated once at construction:
/// - a `max_chars` of zero falls back to [`DEFAULT_MAX_CHARS`];
/// - an `overlap` of `max_chars` or more is clamped to `max_chars / 4` so
///   the window start always moves forward;
/// - `max_chunks` bounds the output size on pathological inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowChunker {
    max_chars: usize,
    overlap: usize,
    max_chunks: usize,
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS, DEFAULT_OVERLAP, DEFAULT_MAX_CHUNKS)
    }
}

impl WindowChunker {
    /// Create a chunker with the given limits, applying the clamping rules
    /// described on the type.
    pub fn new(max_chars: usize, overlap: usize, max_chunks: usize) -> Self {
        let max_chars = if max_chars == 0 {
            DEFAULT_MAX_CHARS
        } else {
            max_chars
        };
        let overlap = if overlap >= max_chars {
            max_chars / 4
        } else {
            overlap
        };
        Self {
            max_chars,
            overlap,
            max_chunks,
        }
    }

    /// The effective window size after clamping.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// The effective overlap after clamping. Always less than `max_chars`.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// The hard cap on windows per input.
    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    /// Split `text` into windows of at most `max_chars` bytes.
    ///
    /// Empty input produces no windows; input that already fits in one
    /// window is returned as a single element. Window edges land on UTF-8
    /// character boundaries, snapped backward, so a window may be a few
    /// bytes short of `max_chars` around multi-byte characters. The first
    /// window that reaches the end of the text is the last one.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() || self.max_chunks == 0 {
            return Vec::new();
        }
        if text.len() <= self.max_chars {
            return vec![text.to_string()];
        }

        let step = self.max_chars - self.overlap;
        let mut windows = Vec::new();
        let mut start = 0;

        while start < text.len() && windows.len() < self.max_chunks {
            let mut end = floor_char_boundary(text, (start + self.max_chars).min(text.len()));
            if end <= start {
                // Window smaller than the character at `start`; take it whole.
                end = ceil_char_boundary(text, start + 1);
            }
            windows.push(text[start..end].to_string());
            if end == text.len() {
                break;
            }
            let next = floor_char_boundary(text, start + step);
            // Boundary snapping can stall the window start; fall back to the
            // window end (dropping the overlap) to keep moving forward.
            start = if next > start { next } else { end };
        }

        windows
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index.min(text.len())
}
