//! Similarity index abstraction.
//!
//! The [`VectorIndex`] trait is the seam between the RAG pipeline and the
//! index it retrieves from. The only shipped backend is the request-scoped
//! [`memory::InMemoryIndex`]; nothing is persisted across requests.

pub mod memory;

use thiserror::Error;

use crate::models::{Chunk, ScoredChunk};

/// Errors raised while building an index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("expected {expected} embedding vectors, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("embedding for chunk {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// A similarity index over embedded chunks.
pub trait VectorIndex {
    /// Add chunks with their embedding vectors, in the same order.
    fn insert(&mut self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<(), IndexError>;

    /// Return up to `k` chunks most similar to `query`, best first.
    fn top_k(&self, query: &[f32], k: usize) -> Vec<ScoredChunk>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
