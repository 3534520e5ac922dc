//! The multi-layer navigable-small-world graph: storage, layer assignment,
//! and incremental insertion.
//!
//! Insertion is performed per-`add` (not deferred to a batch `build()`
//! step): each new node greedily descends from the current entry point down
//! to its own top layer, then runs a best-first search of width
//! `ef_construction` at each layer from its top down to the ground layer,
//! selecting up to `m` (`2m` on the ground layer) diverse neighbors and
//! inserting bidirectional edges.

use smallvec::SmallVec;

use crate::model::HnswParams;

use super::distance::cosine_distance;
use super::search::greedy_search_layer;

/// Per-layer adjacency: `neighbors[i]` is node `i`'s neighbor list in this layer.
#[derive(Debug, Clone)]
pub struct Layer {
    neighbors: Vec<SmallVec<[u32; 16]>>,
}

impl Layer {
    fn with_capacity(n: usize) -> Self {
        Layer {
            neighbors: vec![SmallVec::new(); n],
        }
    }

    pub fn get_neighbors(&self, node: u32) -> &SmallVec<[u32; 16]> {
        &self.neighbors[node as usize]
    }

    fn ensure_len(&mut self, n: usize) {
        if self.neighbors.len() < n {
            self.neighbors.resize(n, SmallVec::new());
        }
    }

    pub fn all_neighbors(&self) -> &[SmallVec<[u32; 16]>] {
        &self.neighbors
    }

    pub fn from_raw(neighbors: Vec<SmallVec<[u32; 16]>>) -> Self {
        Layer { neighbors }
    }
}

/// The graph's storage: vectors in SoA layout, per-layer adjacency, and the
/// geometric level assignment for each node. Nodes are addressed by dense
/// `u32` position; the owning index keeps the `chunk.id <-> position` map.
#[derive(Debug, Clone)]
pub struct HnswGraph {
    vectors: Vec<f32>,
    dimension: usize,
    num_nodes: usize,
    layers: Vec<Layer>,
    layer_assignments: Vec<u8>,
    params: HnswParams,
    entry_point: Option<u32>,
    level_multiplier: f64,
}

impl HnswGraph {
    pub fn new(dimension: usize, params: HnswParams) -> Self {
        Self::with_capacity(dimension, params, 0)
    }

    /// Like [`HnswGraph::new`], but pre-allocates storage for `capacity`
    /// nodes up front — the path [`crate::merger::Merger::build`] uses so
    /// its `max(2 * pending, configured_hint)` sizing has an observable
    /// effect instead of only informing a log line.
    pub fn with_capacity(dimension: usize, params: HnswParams, capacity: usize) -> Self {
        HnswGraph {
            vectors: Vec::with_capacity(capacity * dimension),
            dimension,
            num_nodes: 0,
            layers: Vec::new(),
            layer_assignments: Vec::with_capacity(capacity),
            params,
            entry_point: None,
            level_multiplier: 1.0 / (params.m as f64).ln(),
        }
    }

    pub fn get_vector(&self, idx: u32) -> &[f32] {
        let start = idx as usize * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_assignments(&self) -> &[u8] {
        &self.layer_assignments
    }

    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    fn assign_layer(&self) -> u8 {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let mut layer = 0u8;
        while rng.gen::<f64>() < 1.0 / self.level_multiplier.max(1e-12) && layer < 63 {
            layer += 1;
        }
        layer
    }

    /// Selects up to `m` diverse neighbors from `candidates` (closest-first),
    /// preferring a candidate only if it is not dominated by an
    /// already-selected neighbor — the same relative-neighborhood heuristic
    /// that prunes HNSW graphs in practice.
    fn select_diverse(&self, candidates: &[(u32, f32)], m: usize) -> Vec<u32> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected: Vec<u32> = Vec::with_capacity(m.min(sorted.len()));
        for &(candidate, dist_to_query) in &sorted {
            if selected.len() >= m {
                break;
            }
            let candidate_vec = self.get_vector(candidate);
            let dominated = selected.iter().any(|&s| {
                let inter = cosine_distance(self.get_vector(s), candidate_vec);
                dist_to_query >= inter
            });
            if !dominated {
                selected.push(candidate);
            }
        }
        // Fill out to m with closest remaining if diversity pruning left room.
        for &(candidate, _) in &sorted {
            if selected.len() >= m {
                break;
            }
            if !selected.contains(&candidate) {
                selected.push(candidate);
            }
        }
        selected
    }

    fn connect(&mut self, layer_idx: usize, a: u32, b: u32, max_degree: usize) {
        {
            let layer = &mut self.layers[layer_idx];
            let neighbors = &mut layer.neighbors[a as usize];
            if !neighbors.contains(&b) {
                neighbors.push(b);
            }
        }
        if self.layers[layer_idx].neighbors[a as usize].len() > max_degree {
            let a_vec = self.get_vector(a).to_vec();
            let candidates: Vec<(u32, f32)> = self.layers[layer_idx].neighbors[a as usize]
                .iter()
                .map(|&n| (n, cosine_distance(&a_vec, self.get_vector(n))))
                .collect();
            let pruned = self.select_diverse(&candidates, max_degree);
            self.layers[layer_idx].neighbors[a as usize] = pruned.into_iter().collect();
        }
    }

    /// Inserts a new vector, running full HNSW insertion, and returns its
    /// assigned position (`num_nodes` before the call).
    pub fn add(&mut self, vector: Vec<f32>) -> u32 {
        let id = self.num_nodes as u32;
        self.vectors.extend_from_slice(&vector);
        self.num_nodes += 1;

        let node_top_layer = self.assign_layer();
        self.layer_assignments.push(node_top_layer);

        while self.layers.len() <= node_top_layer as usize {
            let n = self.layers.len();
            let mut layer = Layer::with_capacity(self.num_nodes);
            if n > 0 {
                layer.ensure_len(self.num_nodes);
            }
            self.layers.push(layer);
        }
        for layer in &mut self.layers {
            layer.ensure_len(self.num_nodes);
        }

        let Some(entry) = self.entry_point else {
            self.entry_point = Some(id);
            return id;
        };
        let entry_layer = self.layer_assignments[entry as usize];

        // Greedy descent through layers above node_top_layer, width 1.
        let mut current = entry;
        if entry_layer as usize > node_top_layer as usize {
            for layer_idx in (node_top_layer as usize + 1..=entry_layer as usize).rev() {
                current = self.descend_greedy(current, &vector, layer_idx);
            }
        }

        // From node_top_layer down to ground: widen search, connect, prune.
        for layer_idx in (0..=node_top_layer as usize).rev() {
            let ef = self.params.ef_construction;
            let results = greedy_search_layer(&vector, current, &self.layers[layer_idx], &self.vectors, self.dimension, ef);
            if let Some(&(closest, _)) = results.first() {
                current = closest;
            }
            let max_degree = if layer_idx == 0 { self.params.m * 2 } else { self.params.m };
            let selected = self.select_diverse(&results, max_degree);
            for &neighbor in &selected {
                self.connect(layer_idx, id, neighbor, max_degree);
                self.connect(layer_idx, neighbor, id, max_degree);
            }
        }

        if node_top_layer > entry_layer {
            self.entry_point = Some(id);
        }
        id
    }

    fn descend_greedy(&self, start: u32, query: &[f32], layer_idx: usize) -> u32 {
        let mut current = start;
        let mut current_dist = cosine_distance(query, self.get_vector(current));
        loop {
            let mut changed = false;
            for &neighbor in self.layers[layer_idx].get_neighbors(current).iter() {
                let d = cosine_distance(query, self.get_vector(neighbor));
                if d < current_dist {
                    current_dist = d;
                    current = neighbor;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        current
    }

    /// Query: greedy descent width 1 through non-ground layers, then a
    /// width-`max(ef_search, k)` best-first search on the ground layer.
    /// Returns `(node, distance)` pairs sorted ascending by distance.
    pub fn search(&self, query: &[f32], k: usize, ef_search: usize) -> Vec<(u32, f32)> {
        let Some(entry) = self.entry_point else {
            return Vec::new();
        };
        if self.layers.is_empty() {
            return Vec::new();
        }
        let entry_layer = self.layer_assignments[entry as usize] as usize;
        let mut current = entry;
        for layer_idx in (1..=entry_layer).rev() {
            if layer_idx >= self.layers.len() {
                continue;
            }
            current = self.descend_greedy(current, query, layer_idx);
        }
        let width = ef_search.max(k);
        let mut results = greedy_search_layer(query, current, &self.layers[0], &self.vectors, self.dimension, width);
        results.truncate(k);
        results
    }

    /// Reconstructs a graph from its persisted parts (used by the codec).
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        vectors: Vec<f32>,
        dimension: usize,
        num_nodes: usize,
        layers: Vec<Layer>,
        layer_assignments: Vec<u8>,
        params: HnswParams,
        entry_point: Option<u32>,
    ) -> Self {
        HnswGraph {
            vectors,
            dimension,
            num_nodes,
            layers,
            layer_assignments,
            params,
            entry_point,
            level_multiplier: 1.0 / (params.m as f64).ln(),
        }
    }

    pub fn vectors_raw(&self) -> &[f32] {
        &self.vectors
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
