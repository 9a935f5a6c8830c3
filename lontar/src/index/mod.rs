//! In-memory embedding index over the persisted chunk records. Loaded once
//! at startup and read-only afterwards, so it can be shared across requests
//! without locking.

pub mod store;

use std::cmp::Ordering;
use std::path::Path;

use crate::error::Result;
use crate::models::ChunkRecord;

/// Cosine similarity between two vectors. Returns `0.0` for empty vectors,
/// dimension mismatches, and zero vectors instead of dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

pub struct EmbeddingIndex {
    records: Vec<ChunkRecord>,
}

impl EmbeddingIndex {
    pub fn new(records: Vec<ChunkRecord>) -> Self {
        Self { records }
    }

    /// Load the index from a persisted chunk store file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(store::load_records(path)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Top-`k` chunks by cosine similarity, highest first. The sort is
    /// stable, so equal scores keep load order.
    pub fn search(&self, query_vector: &[f32], top_k: usize) -> Vec<(&ChunkRecord, f32)> {
        let mut scored: Vec<(&ChunkRecord, f32)> = self
            .records
            .iter()
            .map(|record| (record, cosine_similarity(query_vector, &record.vector)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        scored
    }

    /// Highest similarity across the whole index; `0.0` when empty, so an
    /// unpopulated index reads as "no relevant data" to the relevance gate.
    pub fn best_score(&self, query_vector: &[f32]) -> f32 {
        self.records
            .iter()
            .map(|record| cosine_similarity(query_vector, &record.vector))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(conv_id: &str, chunk_index: usize, vector: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            conv_id: conv_id.to_string(),
            session_index: 0,
            chunk_index,
            bubble_count: 2,
            text: format!("User:\npertanyaan {chunk_index}\nAssistant:\njawaban"),
            vector,
        }
    }

    #[test]
    fn cosine_of_a_vector_with_itself_is_one() {
        let v = vec![0.3, -0.8, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn zero_and_mismatched_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn search_ranks_by_descending_similarity() {
        let index = EmbeddingIndex::new(vec![
            record("a", 0, vec![1.0, 0.0]),
            record("b", 1, vec![0.0, 1.0]),
            record("c", 2, vec![0.7, 0.7]),
        ]);

        let results = index.search(&[1.0, 0.0], 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0.conv_id, "a");
        assert_eq!(results[1].0.conv_id, "c");
        assert_eq!(results[2].0.conv_id, "b");
        assert!(results[0].1 >= results[1].1 && results[1].1 >= results[2].1);
    }

    #[test]
    fn equal_scores_keep_load_order() {
        let index = EmbeddingIndex::new(vec![
            record("first", 0, vec![1.0, 0.0]),
            record("second", 1, vec![1.0, 0.0]),
            record("third", 2, vec![2.0, 0.0]),
        ]);

        let results = index.search(&[1.0, 0.0], 3);
        // All three are perfectly aligned with the query.
        assert_eq!(results[0].0.conv_id, "first");
        assert_eq!(results[1].0.conv_id, "second");
        assert_eq!(results[2].0.conv_id, "third");
    }

    #[test]
    fn top_k_truncates_results() {
        let index = EmbeddingIndex::new(vec![
            record("a", 0, vec![1.0, 0.0]),
            record("b", 1, vec![0.9, 0.1]),
            record("c", 2, vec![0.8, 0.2]),
        ]);

        assert_eq!(index.search(&[1.0, 0.0], 2).len(), 2);
    }

    #[test]
    fn empty_index_yields_empty_results_and_zero_best_score() {
        let index = EmbeddingIndex::new(Vec::new());
        assert!(index.search(&[1.0, 0.0], 3).is_empty());
        assert_eq!(index.best_score(&[1.0, 0.0]), 0.0);
        assert!(index.is_empty());
    }

    #[test]
    fn best_score_matches_top_search_hit() {
        let index = EmbeddingIndex::new(vec![
            record("a", 0, vec![1.0, 0.0]),
            record("b", 1, vec![0.5, 0.5]),
        ]);

        let query = [0.6, 0.4];
        let results = index.search(&query, 1);
        assert!((index.best_score(&query) - results[0].1).abs() < 1e-6);
    }
}
