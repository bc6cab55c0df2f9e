//! crates/study_buddy_core/src/index.rs
//!
//! The in-memory vector index built at ingestion and persisted per document.
//!
//! Entries keep their original chunk order, which is the tie-break order for
//! search results and the order `chunks` samples in.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// One embedded chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub text: String,
}

/// A document's full vector index: the embedding dimension plus the embedded
/// chunks in their original order. This struct is the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, vector: Vec<f32>, text: String) {
        self.entries.push(IndexEntry { vector, text });
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the chunk texts most similar to `query`, ranked by descending
    /// cosine similarity. Ties keep original chunk order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<&str> {
        let mut scored: Vec<(f32, &str)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&entry.vector, query), entry.text.as_str()))
            .collect();

        // Stable sort, so equal scores stay in insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored.into_iter().map(|(_, text)| text).collect()
    }

    /// Returns up to `k` chunk texts in storage order. This is the sampling
    /// operation the summarizer and generators use to read a document's
    /// content without a query.
    pub fn chunks(&self, k: usize) -> Vec<&str> {
        self.entries
            .iter()
            .take(k)
            .map(|entry| entry.text.as_str())
            .collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let vec_a = DVector::from_row_slice(a);
    let vec_b = DVector::from_row_slice(b);

    let dot_product = vec_a.dot(&vec_b);
    let norm_a = vec_a.norm();
    let norm_b = vec_b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
