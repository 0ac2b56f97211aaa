//! Cosine-similarity preselection: the cheap, high-recall first pass.

use super::chunk::{Candidate, DocChunk};

/// Substituted for a zero denominator so degenerate vectors score ~0
/// instead of dividing by zero.
const COSINE_EPS: f32 = 1e-8;

/// Cosine similarity between two vectors, in `[-1, 1]` for non-zero inputs.
///
/// Mismatched lengths score 0.0 — vectors from different embedding models
/// are not comparable and should never rank.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot / (norm_a * norm_b).max(COSINE_EPS)
}

/// Score every embedded chunk against `query_vector` and return the top `k`
/// as [`Candidate`]s, most similar first.
///
/// Chunks without a vector are excluded from scoring entirely rather than
/// treated as zero-similarity. Ties keep corpus order (the sort is stable),
/// and fewer than `k` candidates are returned when the corpus has fewer
/// scorable chunks.
pub fn preselect(chunks: &[DocChunk], query_vector: &[f32], k: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = chunks
        .iter()
        .enumerate()
        .filter_map(|(index, chunk)| {
            let vector = chunk.vector.as_ref()?;
            Some(Candidate::new(
                index,
                cosine_similarity(query_vector, vector),
            ))
        })
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(k);
    candidates
}
