//! Embedding storage, search, and merge for code chunks.
//!
//! `codevec` indexes `(chunk, vector)` pairs produced by an external
//! embedding model and serves nearest-neighbor search over them, with two
//! interchangeable backends behind one [`Index`] trait:
//!
//! - [`index::brute_force::BruteForceIndex`] — exact cosine search, linear
//!   in corpus size. Simple, exact, fine up to roughly 10^5 chunks.
//! - [`index::hnsw::HnswIndex`] (behind the `hnsw` feature, on by default)
//!   — an approximate multi-layer proximity graph, sublinear query time at
//!   the cost of exactness.
//!
//! Both backends persist to a small binary format (`persistence`, behind
//! the `persistence` feature) and can be combined across artifacts with a
//! [`merger::Merger`]. [`analysis`] provides corpus-level near-duplicate
//! and outlier detection written once against the `Index` trait.
//!
//! # Quick start
//!
//! ```rust
//! use codevec::index::{BruteForceIndex, Index};
//! use codevec::model::{Chunk, ChunkKind, IndexConfig};
//! use std::collections::HashMap;
//!
//! let mut index = BruteForceIndex::new(IndexConfig::new("text-embedding-3-small", 3));
//! let chunk = Chunk::new(
//!     "pkg.Foo#bar",
//!     "bar",
//!     ChunkKind::Method,
//!     "void bar() {}",
//!     "Foo.java",
//!     10,
//!     12,
//!     Some("pkg.Foo".to_string()),
//!     HashMap::new(),
//! );
//! index.add(chunk, vec![1.0, 0.0, 0.0]).unwrap();
//! let results = index.search(&[1.0, 0.0, 0.0], 5).unwrap();
//! assert_eq!(results[0].chunk.id, "pkg.Foo#bar");
//! ```

pub mod analysis;
pub mod embedding;
pub mod error;
pub mod index;
pub mod merger;
pub mod model;
#[cfg(feature = "persistence")]
pub mod persistence;
pub mod similarity;

pub use error::{CodevecError, Result};
pub use index::Index;

/// Re-exports covering the common path: build an index, add chunks, search.
pub mod prelude {
    pub use crate::embedding::EmbeddingProvider;
    pub use crate::error::{CodevecError, Result};
    pub use crate::index::brute_force::BruteForceIndex;
    #[cfg(feature = "hnsw")]
    pub use crate::index::hnsw::HnswIndex;
    pub use crate::index::Index;
    pub use crate::merger::{Backend, Merger};
    pub use crate::model::{
        Chunk, ChunkKind, DuplicateGroup, HnswParams, IndexConfig, IndexStats, SearchResult,
        VectorEntry,
    };
}
