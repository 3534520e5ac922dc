//! Exact cosine-similarity search over chunks held entirely in memory.
//!
//! Suitable up to roughly 10^5 vectors; above that, prefer [`super::hnsw`].

use std::collections::HashMap;

use crate::embedding::EmbeddingProvider;
use crate::error::{CodevecError, Result};
use crate::model::{Chunk, ChunkKind, IndexConfig, IndexStats, SearchResult, VectorEntry};
use crate::similarity::cosine_similarity;

use super::Index;

/// Brute-force backend: chunks and vectors stored as parallel arrays plus an
/// id -> position map, scanned exhaustively on every query.
pub struct BruteForceIndex {
    config: IndexConfig,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    id_map: HashMap<String, usize>,
    embedding_provider: Option<Box<dyn EmbeddingProvider>>,
}

impl BruteForceIndex {
    pub fn new(config: IndexConfig) -> Self {
        BruteForceIndex {
            config,
            chunks: Vec::new(),
            vectors: Vec::new(),
            id_map: HashMap::new(),
            embedding_provider: None,
        }
    }

    fn scored(&self, query: &[f32]) -> Vec<(usize, f32)> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(i, _)| (i, cosine_similarity(&self.vectors[i], query)))
            .collect()
    }

    /// Sorts by descending similarity, stable so ties keep insertion order.
    fn top_k(mut scored: Vec<(usize, f32)>, k: usize) -> Vec<(usize, f32)> {
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

impl Index for BruteForceIndex {
    fn add(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.config.dimensions {
            return Err(CodevecError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: vector.len(),
            });
        }
        let position = self.chunks.len();
        self.id_map.insert(chunk.id.clone(), position);
        self.chunks.push(chunk);
        self.vectors.push(vector);
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
        let scored = Self::top_k(self.scored(query), k);
        Ok(scored
            .into_iter()
            .map(|(i, sim)| SearchResult::new(self.chunks[i].clone(), sim))
            .collect())
    }

    fn search_by_kind(&self, query: &[f32], kind: ChunkKind, k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.config.dimensions {
            return Err(CodevecError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: query.len(),
            });
        }
        let mut scored: Vec<(usize, f32)> = self
            .scored(query)
            .into_iter()
            .filter(|(i, _)| self.chunks[*i].kind == kind)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(i, sim)| SearchResult::new(self.chunks[i].clone(), sim))
            .collect())
    }

    fn entries(&self) -> Vec<VectorEntry> {
        self.chunks
            .iter()
            .zip(self.vectors.iter())
            .map(|(c, v)| VectorEntry::new(c.clone(), v.clone()))
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
        let size_bytes_estimate = self.chunks.len() * self.config.dimensions * 4
            + self.chunks.iter().map(|c| c.body.len() + c.name.len()).sum::<usize>();
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
        let query = &self.vectors[pos];
        self.chunks
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .map(|(i, c)| (c.clone(), cosine_similarity(&self.vectors[i], query)))
            .collect()
    }

    fn anomaly_candidates(&self, chunk_id: &str) -> Vec<(Chunk, f32)> {
        // Brute-force averages over all other chunks — same candidate set.
        self.duplicate_candidates(chunk_id)
    }
}
