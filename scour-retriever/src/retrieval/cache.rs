//! Durable, content-addressed embedding cache.
//!
//! Embedding API calls are the expensive part of indexing a corpus, so
//! vectors are persisted across runs in an append-only JSONL log
//! (`embeddings.jsonl` inside an injected cache directory). Each record is a
//! self-contained line — a failed append can truncate at most the record
//! being written, never an earlier one — and reload is last-write-wins per
//! key, so re-embedding a changed chunk simply shadows the stale record.
//!
//! Staleness is guarded by content hash, not by key alone: a record is only
//! a hit when its stored `text_hash` matches the blake3 hash of the chunk
//! text being looked up. Editing a source file therefore invalidates exactly
//! the chunks whose text changed. This is a correctness guard, not an
//! optimization.
//!
//! The cache assumes a single writing process per cache directory; there is
//! no cross-process locking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors from the durable cache layer.
///
/// Callers are expected to treat any of these as "entry absent" — the
/// pipeline prefers re-embedding over failing a query — but the downgrade
/// happens explicitly at the call site, not silently in here.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("cache record serialization failed: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheRecord {
    key: String,
    text_hash: String,
    vector: Vec<f32>,
}

/// Hex-encoded blake3 hash of chunk text, as stored in cache records.
pub fn text_hash(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Content-addressed store mapping `(source_id, index)` to an embedding
/// vector, valid only while the chunk text is unchanged.
pub struct EmbeddingCache {
    path: PathBuf,
    index: HashMap<String, CacheRecord>,
}

impl EmbeddingCache {
    const LOG_NAME: &'static str = "embeddings.jsonl";

    /// Open (or create) the cache rooted at `cache_dir`, loading all prior
    /// records into memory.
    ///
    /// Corrupt or partially-written lines are skipped with a warning rather
    /// than failing the load; they will be re-embedded and re-appended on
    /// the next indexing pass.
    pub fn open(cache_dir: &Path) -> CacheResult<Self> {
        fs::create_dir_all(cache_dir)?;
        let path = cache_dir.join(Self::LOG_NAME);

        let mut index = HashMap::new();
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let mut skipped = 0usize;
            for line in contents.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<CacheRecord>(line) {
                    Ok(record) => {
                        // Last write for a key wins.
                        index.insert(record.key.clone(), record);
                    }
                    Err(_) => skipped += 1,
                }
            }
            if skipped > 0 {
                tracing::warn!(
                    skipped,
                    path = %path.display(),
                    "skipped corrupt embedding cache records"
                );
            }
            tracing::debug!(records = index.len(), "loaded embedding cache");
        }

        Ok(Self { path, index })
    }

    fn key(source_id: &str, index: usize) -> String {
        format!("{source_id}:::{index}")
    }

    /// Look up the vector for a chunk, returning it only if the stored text
    /// hash matches the current `text`. A hash mismatch is a miss and forces
    /// re-embedding.
    pub fn get(&self, source_id: &str, index: usize, text: &str) -> Option<&[f32]> {
        let record = self.index.get(&Self::key(source_id, index))?;
        if record.text_hash != text_hash(text) {
            return None;
        }
        Some(&record.vector)
    }

    /// Append records for each `(source_id, index, text, vector)` item and
    /// update the in-memory index.
    ///
    /// Records are written one JSON line at a time; an I/O failure part-way
    /// through leaves every previously written record intact and parseable.
    pub fn put_many(
        &mut self,
        items: impl IntoIterator<Item = (String, usize, String, Vec<f32>)>,
    ) -> CacheResult<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for (source_id, index, text, vector) in items {
            let record = CacheRecord {
                key: Self::key(&source_id, index),
                text_hash: text_hash(&text),
                vector,
            };
            let mut line = serde_json::to_string(&record)?;
            line.push('\n');
            file.write_all(line.as_bytes())?;
            self.index.insert(record.key.clone(), record);
        }
        file.flush()?;

        Ok(())
    }

    /// Number of distinct keys currently loaded.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Path of the underlying log file.
    pub fn log_path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn get_returns_stored_vector_on_hash_match() -> CacheResult<()> {
        let dir = tempdir().unwrap();
        let mut cache = EmbeddingCache::open(dir.path())?;

        cache.put_many([("f".to_string(), 0, "hello".to_string(), vec![1.0, 2.0, 3.0])])?;

        assert_eq!(cache.get("f", 0, "hello"), Some(&[1.0, 2.0, 3.0][..]));
        Ok(())
    }

    #[test]
    fn changed_text_invalidates_the_entry() -> CacheResult<()> {
        let dir = tempdir().unwrap();
        let mut cache = EmbeddingCache::open(dir.path())?;

        cache.put_many([("f".to_string(), 0, "hello".to_string(), vec![1.0, 2.0, 3.0])])?;

        // Same key, different content: must be a miss.
        assert_eq!(cache.get("f", 0, "hello world"), None);
        Ok(())
    }

    #[test]
    fn unknown_key_is_a_miss() -> CacheResult<()> {
        let dir = tempdir().unwrap();
        let cache = EmbeddingCache::open(dir.path())?;
        assert_eq!(cache.get("missing", 7, "whatever"), None);
        Ok(())
    }

    #[test]
    fn records_survive_reopen() -> CacheResult<()> {
        let dir = tempdir().unwrap();
        {
            let mut cache = EmbeddingCache::open(dir.path())?;
            cache.put_many([
                ("a".to_string(), 0, "first".to_string(), vec![0.1]),
                ("a".to_string(), 1, "second".to_string(), vec![0.2]),
            ])?;
        }

        let cache = EmbeddingCache::open(dir.path())?;
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a", 0, "first"), Some(&[0.1][..]));
        assert_eq!(cache.get("a", 1, "second"), Some(&[0.2][..]));
        Ok(())
    }

    #[test]
    fn last_write_wins_for_a_key() -> CacheResult<()> {
        let dir = tempdir().unwrap();
        {
            let mut cache = EmbeddingCache::open(dir.path())?;
            cache.put_many([("a".to_string(), 0, "old".to_string(), vec![1.0])])?;
            cache.put_many([("a".to_string(), 0, "new".to_string(), vec![2.0])])?;
        }

        let cache = EmbeddingCache::open(dir.path())?;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a", 0, "old"), None);
        assert_eq!(cache.get("a", 0, "new"), Some(&[2.0][..]));
        Ok(())
    }

    #[test]
    fn corrupt_lines_are_skipped_on_load() -> CacheResult<()> {
        let dir = tempdir().unwrap();
        {
            let mut cache = EmbeddingCache::open(dir.path())?;
            cache.put_many([("ok".to_string(), 0, "fine".to_string(), vec![1.0])])?;
        }

        // Simulate a partially-written append.
        let log = dir.path().join("embeddings.jsonl");
        let mut contents = fs::read_to_string(&log).unwrap();
        contents.push_str("{\"key\": \"truncat");
        fs::write(&log, contents).unwrap();

        let cache = EmbeddingCache::open(dir.path())?;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("ok", 0, "fine"), Some(&[1.0][..]));
        Ok(())
    }
}
