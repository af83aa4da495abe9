//! Vector utilities for embedding similarity.
//!
//! Concrete embedding providers (OpenAI, Ollama) live in the `tertulia` app
//! crate; this module only holds pure math used by the in-memory index.

/// Cosine similarity between a query vector and a stored chunk vector.
///
/// This is the score [`InMemoryIndex`](crate::store::memory::InMemoryIndex)
/// ranks chunks by, in `[-1.0, 1.0]` with higher meaning closer. Degenerate
/// pairs (empty, zero-norm, or different lengths) score `0.0`, never `NaN`.
///
/// # Example
///
/// ```rust
/// use tertulia_core::embedding::cosine_similarity;
///
/// let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
/// assert!((sim - 1.0).abs() < 1e-6);
/// ```
pub fn cosine_similarity(query: &[f32], stored: &[f32]) -> f32 {
    if query.len() != stored.len() || query.is_empty() {
        return 0.0;
    }

    let (dot, query_sq, stored_sq) = query
        .iter()
        .zip(stored)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, qq, ss), (q, s)| {
            (dot + q * s, qq + q * q, ss + s * s)
        });

    let norms = query_sq.sqrt() * stored_sq.sqrt();
    if norms < f32::EPSILON {
        return 0.0;
    }
    dot / norms
}
