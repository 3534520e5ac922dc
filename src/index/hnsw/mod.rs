//! Approximate nearest-neighbor backend: a multi-layer proximity graph.
//!
//! Recommended above roughly 10^4 vectors, where exhaustive brute-force
//! scoring becomes the bottleneck.

pub mod distance;
pub mod graph;
pub mod search;

use std::collections::HashMap;

use crate::embedding::EmbeddingProvider;
use crate::error::{CodevecError, Result};
use crate::model::{Chunk, ChunkKind, IndexConfig, IndexStats, SearchResult, VectorEntry};

use self::graph::HnswGraph;
use super::Index;

/// Proximity-graph backend: chunks keyed by id alongside an [`HnswGraph`]
/// whose nodes are addressed by dense position.
pub struct HnswIndex {
    config: IndexConfig,
    chunks: Vec<Chunk>,
    id_map: HashMap<String, usize>,
    graph: HnswGraph,
    embedding_provider: Option<Box<dyn EmbeddingProvider>>,
}

impl HnswIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self::with_capacity(config, 0)
    }

    /// Like [`HnswIndex::new`], but pre-sizes the underlying graph and
    /// chunk storage for `capacity` nodes.
    pub fn with_capacity(config: IndexConfig, capacity: usize) -> Self {
        let graph = HnswGraph::with_capacity(config.dimensions, config.hnsw, capacity);
        HnswIndex {
            config,
            chunks: Vec::with_capacity(capacity),
            id_map: HashMap::with_capacity(capacity),
            graph,
            embedding_provider: None,
        }
    }

    /// Reconstructs an index from a previously-persisted graph (used by the
    /// codec's MHNS decoder).
    pub fn from_parts(config: IndexConfig, chunks: Vec<Chunk>, graph: HnswGraph) -> Self {
        let id_map = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        HnswIndex {
            config,
            chunks,
            id_map,
            graph,
            embedding_provider: None,
        }
    }

    pub fn graph(&self) -> &HnswGraph {
        &self.graph
    }

    fn result_for(&self, position: u32, distance: f32) -> SearchResult {
        SearchResult::new(self.chunks[position as usize].clone(), 1.0 - distance)
    }
}

impl Index for HnswIndex {
    fn add(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.config.dimensions {
            return Err(CodevecError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: vector.len(),
            });
        }
        let position = self.graph.add(vector);
        self.id_map.insert(chunk.id.clone(), position as usize);
        self.chunks.push(chunk);
        Ok(())
    }

    fn contains(&self, chunk_id: &str) -> bool {
        self.id_map.contains_key(chunk_id)
    }

    fn set_embedding_provider(&mut self, provider: Option<Box<dyn EmbeddingProvider>>) {
        self.embedding_provider = provider;
    }

    fn embedding_provider(&self) -> Option<&dyn EmbeddingProvider> {
        self.embedding_provider.as_deref()
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.config.dimensions {
            return Err(CodevecError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: query.len(),
            });
        }
        let ef = self.config.hnsw.ef_search;
        let hits = self.graph.search(query, k, ef);
        Ok(hits.into_iter().map(|(pos, dist)| self.result_for(pos, dist)).collect())
    }

    fn search_by_kind(&self, query: &[f32], kind: ChunkKind, k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.config.dimensions {
            return Err(CodevecError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: query.len(),
            });
        }
        let ef = self.config.hnsw.ef_search;
        // Over-fetch to avoid the filter starving the requested top-k on an
        // approximate index.
        let overfetch = (10 * k).max(k);
        let hits = self.graph.search(query, overfetch, ef.max(overfetch));
        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .filter(|(pos, _)| self.chunks[*pos as usize].kind == kind)
            .map(|(pos, dist)| self.result_for(pos, dist))
            .collect();
        results.truncate(k);
        Ok(results)
    }

    fn entries(&self) -> Vec<VectorEntry> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(i, c)| VectorEntry::new(c.clone(), self.graph.get_vector(i as u32).to_vec()))
            .collect()
    }

    fn size(&self) -> usize {
        self.chunks.len()
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn stats(&self) -> IndexStats {
        let mut by_kind = HashMap::new();
        let mut files = std::collections::HashSet::new();
        for c in &self.chunks {
            *by_kind.entry(c.kind).or_insert(0) += 1;
            files.insert(c.file.clone());
        }
        let graph_bytes: usize = self
            .graph
            .layers()
            .iter()
            .map(|l| l.all_neighbors().iter().map(|n| n.len() * 4).sum::<usize>())
            .sum();
        let size_bytes_estimate =
            self.chunks.len() * self.config.dimensions * 4 + graph_bytes;
        IndexStats {
            total: self.chunks.len(),
            by_kind,
            file_count: files.len(),
            model_id: self.config.model_id.clone(),
            dimensions: self.config.dimensions,
            size_bytes_estimate,
        }
    }

    fn duplicate_candidates(&self, chunk_id: &str) -> Vec<(Chunk, f32)> {
        let Some(&pos) = self.id_map.get(chunk_id) else {
            return Vec::new();
        };
        let query = self.graph.get_vector(pos as u32).to_vec();
        let ef = self.config.hnsw.ef_search.max(20);
        self.graph
            .search(&query, 21, ef)
            .into_iter()
            .filter(|(p, _)| *p as usize != pos)
            .map(|(p, dist)| (self.chunks[p as usize].clone(), 1.0 - dist))
            .collect()
    }

    fn anomaly_candidates(&self, chunk_id: &str) -> Vec<(Chunk, f32)> {
        let Some(&pos) = self.id_map.get(chunk_id) else {
            return Vec::new();
        };
        let query = self.graph.get_vector(pos as u32).to_vec();
        let ef = self.config.hnsw.ef_search.max(11);
        self.graph
            .search(&query, 11, ef)
            .into_iter()
            .filter(|(p, _)| *p as usize != pos)
            .take(10)
            .map(|(p, dist)| (self.chunks[p as usize].clone(), 1.0 - dist))
            .collect()
    }
}
