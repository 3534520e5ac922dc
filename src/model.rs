//! Core data types: chunks, vector entries, configuration, and result shapes.

use std::collections::HashMap;
use std::fmt;

/// The kind of source construct a [`Chunk`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Class,
    Interface,
    Enum,
    Record,
    Method,
    Constructor,
    Field,
    Annotation,
}

impl ChunkKind {
    /// All kinds, in declaration order — used by `IndexStats::by_kind` to
    /// enumerate only kinds actually present without allocating a full set.
    pub const ALL: [ChunkKind; 8] = [
        ChunkKind::Class,
        ChunkKind::Interface,
        ChunkKind::Enum,
        ChunkKind::Record,
        ChunkKind::Method,
        ChunkKind::Constructor,
        ChunkKind::Field,
        ChunkKind::Annotation,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Class => "class",
            ChunkKind::Interface => "interface",
            ChunkKind::Enum => "enum",
            ChunkKind::Record => "record",
            ChunkKind::Method => "method",
            ChunkKind::Constructor => "constructor",
            ChunkKind::Field => "field",
            ChunkKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable record identifying a unit of source code.
///
/// Chunks are never mutated in place. [`Chunk::with_artifact`] returns a new
/// chunk identical to `self` except for the provenance slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Chunk {
    pub id: String,
    pub name: String,
    pub kind: ChunkKind,
    pub body: String,
    pub file: String,
    pub line_start: u32,
    pub line_end: u32,
    pub parent_container: Option<String>,
    pub metadata: HashMap<String, String>,
    pub artifact: Option<String>,
}

impl Chunk {
    /// Builds a chunk, defensively copying `metadata`.
    ///
    /// # Panics
    /// Panics if `line_start < 1` or `line_end < line_start` — these are
    /// caller-constructed invariants, not runtime input to validate.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: ChunkKind,
        body: impl Into<String>,
        file: impl Into<String>,
        line_start: u32,
        line_end: u32,
        parent_container: Option<String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        assert!(line_start >= 1, "line_start must be >= 1");
        assert!(line_end >= line_start, "line_end must be >= line_start");
        Chunk {
            id: id.into(),
            name: name.into(),
            kind,
            body: body.into(),
            file: file.into(),
            line_start,
            line_end,
            parent_container,
            metadata,
            artifact: None,
        }
    }

    /// Returns a new chunk identical to `self` but with `artifact` set.
    /// Never mutates `self`.
    pub fn with_artifact(&self, artifact: impl Into<String>) -> Chunk {
        Chunk {
            artifact: Some(artifact.into()),
            ..self.clone()
        }
    }
}

/// A `(chunk, vector)` pair. `vector.len()` must equal the owning index's
/// configured dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl VectorEntry {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        VectorEntry { chunk, vector }
    }
}

/// Tunable parameters for the proximity-graph backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HnswParams {
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        HnswParams {
            m: 16,
            ef_construction: 200,
            ef_search: 50,
        }
    }
}

/// Identifies the embedding model an index's vectors were produced by, and
/// the dimensionality of those vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    pub model_id: String,
    pub dimensions: usize,
    pub hnsw: HnswParams,
}

impl IndexConfig {
    pub fn new(model_id: impl Into<String>, dimensions: usize) -> Self {
        IndexConfig {
            model_id: model_id.into(),
            dimensions,
            hnsw: HnswParams::default(),
        }
    }

    pub fn with_hnsw(mut self, hnsw: HnswParams) -> Self {
        self.hnsw = hnsw;
        self
    }

    /// Two configs are compatible for merging iff their model ids match.
    /// Dimension equality is implied and enforced at `add_index` time.
    pub fn is_compatible(&self, other: &IndexConfig) -> bool {
        self.model_id == other.model_id
    }
}

/// One ranked search hit: the matched chunk, its similarity (clamped to
/// `[0, 1]`), and its provenance at the time the result was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub similarity: f32,
    pub artifact_id: Option<String>,
}

impl SearchResult {
    /// Clamps `similarity` to `[0, 1]` (cosine-then-clamp, not affine rescale).
    pub fn new(chunk: Chunk, similarity: f32) -> Self {
        let artifact_id = chunk.artifact.clone();
        SearchResult {
            chunk,
            similarity: similarity.clamp(0.0, 1.0),
            artifact_id,
        }
    }
}

/// Aggregate statistics over an index's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub total: usize,
    pub by_kind: HashMap<ChunkKind, usize>,
    pub file_count: usize,
    pub model_id: String,
    pub dimensions: usize,
    pub size_bytes_estimate: usize,
}

/// A set of chunks judged mutually near-duplicate at `floor_similarity`.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub floor_similarity: f32,
    pub count: usize,
    pub chunks: Vec<Chunk>,
}

impl DuplicateGroup {
    pub fn new(floor_similarity: f32, chunks: Vec<Chunk>) -> Self {
        assert!(chunks.len() >= 2, "duplicate group must have at least 2 chunks");
        DuplicateGroup {
            floor_similarity,
            count: chunks.len(),
            chunks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk(id: &str) -> Chunk {
        Chunk::new(
            id,
            "foo",
            ChunkKind::Method,
            "fn foo() {}",
            "src/foo.rs",
            1,
            3,
            None,
            HashMap::new(),
        )
    }

    #[test]
    fn with_artifact_does_not_mutate_original() {
        let c = sample_chunk("c1");
        let stamped = c.with_artifact("group:name:1.0");
        assert_eq!(c.artifact, None);
        assert_eq!(stamped.artifact.as_deref(), Some("group:name:1.0"));
        assert_eq!(stamped.id, c.id);
    }

    #[test]
    fn config_compatibility_is_model_id_equality() {
        let a = IndexConfig::new("test-model", 128);
        let b = IndexConfig::new("test-model", 256);
        let c = IndexConfig::new("other-model", 128);
        assert!(a.is_compatible(&b));
        assert!(!a.is_compatible(&c));
    }

    #[test]
    #[should_panic]
    fn line_end_before_line_start_panics() {
        Chunk::new(
            "c1",
            "foo",
            ChunkKind::Method,
            "body",
            "f.rs",
            5,
            4,
            None,
            HashMap::new(),
        );
    }
}
