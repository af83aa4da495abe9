//! In-memory [`VectorIndex`] implementation.
//!
//! Brute-force cosine similarity over all stored vectors. Built fresh for
//! every RAG request and dropped with it.

use crate::embedding::cosine_similarity;
use crate::models::{Chunk, ScoredChunk};

use super::{IndexError, VectorIndex};

struct StoredVector {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Request-scoped similarity index.
#[derive(Default)]
pub struct InMemoryIndex {
    entries: Vec<StoredVector>,
    dims: Option<usize>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from chunks and their vectors in one step.
    pub fn from_embeddings(
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        let mut index = Self::new();
        index.insert(chunks, vectors)?;
        Ok(index)
    }
}

impl VectorIndex for InMemoryIndex {
    fn insert(&mut self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<(), IndexError> {
        if chunks.len() != vectors.len() {
            return Err(IndexError::CountMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }

        // Validate everything before mutating so a failed insert leaves the index untouched.
        let mut dims = self.dims;
        for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
            let expected = *dims.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    index: chunk.index,
                    expected,
                    actual: vector.len(),
                });
            }
        }
        self.dims = dims;

        self.entries.extend(
            chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| StoredVector { chunk, vector }),
        );
        Ok(())
    }

    fn top_k(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|e| ScoredChunk {
                index: e.chunk.index,
                text: e.chunk.text.clone(),
                score: cosine_similarity(query, &e.vector),
            })
            .collect();

        // Ties keep document order.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        scored.truncate(k);
        scored
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
