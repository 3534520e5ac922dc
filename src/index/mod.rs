//! The vector index abstraction and its two backends.

pub mod brute_force;
#[cfg(feature = "hnsw")]
pub mod hnsw;

pub use brute_force::BruteForceIndex;
#[cfg(feature = "hnsw")]
pub use hnsw::HnswIndex;

use crate::embedding::EmbeddingProvider;
use crate::error::{CodevecError, Result};
use crate::model::{Chunk, ChunkKind, IndexStats, SearchResult, VectorEntry};

/// Common contract implemented by both the brute-force and proximity-graph
/// backends. Analysis operations (`find_duplicates`, `find_anomalies`) are
/// written once against this trait in [`crate::analysis`].
pub trait Index {
    /// Appends `(chunk, vector)`. Fails on dimension mismatch; state is
    /// unchanged on failure.
    fn add(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()>;

    /// Adds each entry in order, sharing `add`'s constraints.
    fn add_all(&mut self, entries: Vec<VectorEntry>) -> Result<()> {
        for entry in entries {
            self.add(entry.chunk, entry.vector)?;
        }
        Ok(())
    }

    /// Same-backend merge: source entries not already present (by chunk id)
    /// are appended, in source order. Fails with `IncompatibleModel` if the
    /// source's model id differs.
    fn merge(&mut self, other: &dyn Index) -> Result<()> {
        if other.model_id() != self.model_id() {
            return Err(CodevecError::IncompatibleModel {
                expected: self.model_id().to_string(),
                actual: other.model_id().to_string(),
            });
        }
        for entry in other.entries() {
            if !self.contains(&entry.chunk.id) {
                self.add(entry.chunk, entry.vector)?;
            }
        }
        Ok(())
    }

    fn contains(&self, chunk_id: &str) -> bool;

    /// Ranked search by a pre-computed query vector.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Replaces the held embedding provider, if any. `None` clears it.
    fn set_embedding_provider(&mut self, provider: Option<Box<dyn EmbeddingProvider>>);

    /// The currently held embedding provider, if one was set.
    fn embedding_provider(&self) -> Option<&dyn EmbeddingProvider>;

    /// Ranked search by text, via the held embedding provider. Fails with
    /// `MissingEmbeddingProvider` if none is attached.
    fn search_text(&self, text: &str, k: usize) -> Result<Vec<SearchResult>> {
        let provider = self
            .embedding_provider()
            .ok_or(CodevecError::MissingEmbeddingProvider)?;
        let vector = provider.embed(text)?;
        self.search(&vector, k)
    }

    /// Search filtered to a single chunk kind.
    fn search_by_kind(&self, query: &[f32], kind: ChunkKind, k: usize) -> Result<Vec<SearchResult>>;

    /// Text variant of `search_by_kind`, via the held embedding provider.
    fn search_by_kind_text(&self, text: &str, kind: ChunkKind, k: usize) -> Result<Vec<SearchResult>> {
        let provider = self
            .embedding_provider()
            .ok_or(CodevecError::MissingEmbeddingProvider)?;
        let vector = provider.embed(text)?;
        self.search_by_kind(&vector, kind, k)
    }

    /// An ordered, defensively-copied snapshot of `(chunk, vector)` pairs.
    fn entries(&self) -> Vec<VectorEntry>;

    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn stats(&self) -> IndexStats;

    /// Candidate neighbors used by `find_duplicates`: brute-force scores all
    /// other chunks, the graph backend scores a widened neighborhood.
    fn duplicate_candidates(&self, chunk_id: &str) -> Vec<(Chunk, f32)>;

    /// Candidate neighbors used by `find_anomalies`: brute-force averages
    /// over all other chunks, the graph backend averages its 10 nearest.
    fn anomaly_candidates(&self, chunk_id: &str) -> Vec<(Chunk, f32)>;

    /// Releases any backend-specific resources. A no-op for brute-force.
    fn close(&mut self) {}
}
