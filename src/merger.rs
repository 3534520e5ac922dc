//! Cross-format, cross-backend merging of sources into a single fresh
//! index, with per-artifact provenance.

use std::collections::HashSet;

use crate::error::Result;
use crate::index::brute_force::BruteForceIndex;
#[cfg(feature = "hnsw")]
use crate::index::hnsw::HnswIndex;
use crate::index::Index;
use crate::model::{Chunk, IndexConfig};

/// Which backend [`Merger::build`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    BruteForce,
    #[cfg(feature = "hnsw")]
    Hnsw,
}

/// Accumulates entries from one or more sources (of any backend) into a
/// single target, deduplicating by chunk id (first occurrence wins, in
/// artifact-add order) and stamping each accepted chunk with the artifact
/// coordinates it came from.
pub struct Merger {
    target_model_id: String,
    target_dimensions: Option<usize>,
    backend: Backend,
    graph_max_items_hint: usize,
    seen: HashSet<String>,
    pending: Vec<(Chunk, Vec<f32>)>,
    rejected: Vec<String>,
}

impl Merger {
    pub fn new(target_model_id: impl Into<String>, backend: Backend) -> Self {
        Merger {
            target_model_id: target_model_id.into(),
            target_dimensions: None,
            backend,
            graph_max_items_hint: 0,
            seen: HashSet::new(),
            pending: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Sets a hint for the graph backend's construction size; `build()`
    /// sizes the produced graph's config at
    /// `max(2 * pending_count, graph_max_items_hint)`.
    pub fn with_graph_max_items_hint(mut self, hint: usize) -> Self {
        self.graph_max_items_hint = hint;
        self
    }

    /// Absorbs every entry from `source` whose model id matches the target.
    /// Entries whose chunk id was already accepted (from an earlier
    /// `add_index` call) are skipped, first-wins. Accepted chunks are
    /// stamped with `artifact_coords` via [`Chunk::with_artifact`] — a pure
    /// operation, the source is left untouched.
    ///
    /// Returns `false` (and records `artifact_coords` in
    /// [`Merger::rejected_artifacts`]) if `source.model_id()` doesn't match
    /// the target model id.
    pub fn add_index(&mut self, source: &dyn Index, artifact_coords: &str) -> bool {
        if source.model_id() != self.target_model_id {
            log::warn!(
                "rejecting source {:?}: model id {:?} != target {:?}",
                artifact_coords,
                source.model_id(),
                self.target_model_id,
            );
            self.rejected.push(artifact_coords.to_string());
            return false;
        }
        if self.target_dimensions.is_none() {
            self.target_dimensions = Some(source.dimensions());
        }
        for entry in source.entries() {
            if self.seen.contains(&entry.chunk.id) {
                continue;
            }
            self.seen.insert(entry.chunk.id.clone());
            let stamped = entry.chunk.with_artifact(artifact_coords);
            self.pending.push((stamped, entry.vector));
        }
        true
    }

    pub fn rejected_artifacts(&self) -> &[String] {
        &self.rejected
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Builds the target index, consuming all pending entries in the order
    /// they were accepted (artifact-add order, then intra-artifact
    /// insertion order, post-dedup).
    pub fn build(mut self) -> Result<Box<dyn Index>> {
        let dimensions = match self.target_dimensions {
            Some(d) => d,
            None => return Err(crate::error::CodevecError::DimensionUndetermined),
        };
        let config = IndexConfig::new(self.target_model_id.clone(), dimensions);
        let entries = std::mem::take(&mut self.pending);

        match self.backend {
            Backend::BruteForce => {
                let mut index = BruteForceIndex::new(config);
                for (chunk, vector) in entries {
                    index.add(chunk, vector)?;
                }
                Ok(Box::new(index))
            }
            #[cfg(feature = "hnsw")]
            Backend::Hnsw => {
                let sized_hint = (2 * entries.len()).max(self.graph_max_items_hint);
                log::debug!("building graph merge target sized for {} items", sized_hint);
                let mut index = HnswIndex::with_capacity(config, sized_hint);
                for (chunk, vector) in entries {
                    index.add(chunk, vector)?;
                }
                Ok(Box::new(index))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChunkKind;
    use std::collections::HashMap;

    fn chunk(id: &str) -> Chunk {
        Chunk::new(id, id, ChunkKind::Method, "body", "f.rs", 1, 2, None, HashMap::new())
    }

    #[test]
    fn merges_two_brute_force_sources() {
        let mut a = BruteForceIndex::new(IndexConfig::new("m", 2));
        a.add(chunk("a1"), vec![1.0, 0.0]).unwrap();
        a.add(chunk("a2"), vec![0.0, 1.0]).unwrap();
        let mut b = BruteForceIndex::new(IndexConfig::new("m", 2));
        b.add(chunk("b1"), vec![1.0, 0.0]).unwrap();
        b.add(chunk("b2"), vec![0.0, 1.0]).unwrap();

        let mut merger = Merger::new("m", Backend::BruteForce);
        assert!(merger.add_index(&a, "artifact:a:1.0"));
        assert!(merger.add_index(&b, "artifact:b:1.0"));
        let merged = merger.build().unwrap();
        assert_eq!(merged.size(), 4);
    }

    #[test]
    fn duplicate_chunk_id_survives_once_with_first_sources_artifact() {
        let mut a = BruteForceIndex::new(IndexConfig::new("m", 2));
        a.add(chunk("shared"), vec![1.0, 0.0]).unwrap();
        let mut b = BruteForceIndex::new(IndexConfig::new("m", 2));
        b.add(chunk("shared"), vec![0.0, 1.0]).unwrap();

        let mut merger = Merger::new("m", Backend::BruteForce);
        merger.add_index(&a, "artifact:a:1.0");
        merger.add_index(&b, "artifact:b:1.0");
        let merged = merger.build().unwrap();
        assert_eq!(merged.size(), 1);
        let entries = merged.entries();
        assert_eq!(entries[0].chunk.artifact.as_deref(), Some("artifact:a:1.0"));
        assert_eq!(entries[0].vector, vec![1.0, 0.0]);
    }

    #[test]
    fn incompatible_model_is_rejected_and_recorded() {
        let a = BruteForceIndex::new(IndexConfig::new("other-model", 2));
        let mut merger = Merger::new("m", Backend::BruteForce);
        assert!(!merger.add_index(&a, "incompatible-coords"));
        assert_eq!(merger.rejected_artifacts(), ["incompatible-coords"]);
        assert_eq!(merger.pending_count(), 0);
    }

    #[cfg(feature = "hnsw")]
    #[test]
    fn cross_backend_merge_into_graph() {
        let mut a = BruteForceIndex::new(IndexConfig::new("m", 2));
        a.add(chunk("a1"), vec![1.0, 0.0]).unwrap();
        let mut b = crate::index::hnsw::HnswIndex::new(IndexConfig::new("m", 2));
        b.add(chunk("b1"), vec![0.0, 1.0]).unwrap();
        b.add(chunk("b2"), vec![0.7, 0.7]).unwrap();

        let mut merger = Merger::new("m", Backend::Hnsw);
        merger.add_index(&a, "artifact:a:1.0");
        merger.add_index(&b, "artifact:b:1.0");
        let merged = merger.build().unwrap();
        assert_eq!(merged.size(), 3);
    }
}
