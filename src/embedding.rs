//! The boundary trait for turning text queries into vectors.
//!
//! Embedding generation itself (model loading, tokenization, inference) is
//! out of scope for this crate; callers supply an implementation.

use crate::error::Result;

/// A pure function from text to a fixed-length embedding vector.
///
/// Implementations should be side-effect-free from the index's perspective:
/// errors propagate unchanged to the caller of `search(text, ...)`.
pub trait EmbeddingProvider {
    /// Embeds `text`, returning a vector of length `dimensions`.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The dimensionality this provider's vectors have.
    fn dimensions(&self) -> usize;
}
