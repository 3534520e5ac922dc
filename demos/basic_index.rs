//! Basic indexing and search.
//!
//! Demonstrates adding chunks to both backends and querying them, plus the
//! save/load round trip through the binary format.

use std::collections::HashMap;

use codevec::index::brute_force::BruteForceIndex;
#[cfg(feature = "hnsw")]
use codevec::index::hnsw::HnswIndex;
use codevec::index::Index;
use codevec::model::{Chunk, ChunkKind, IndexConfig};

fn sample_chunks() -> Vec<(Chunk, Vec<f32>)> {
    vec![
        (
            Chunk::new(
                "com.example.Greeter#greet",
                "greet",
                ChunkKind::Method,
                "void greet() { System.out.println(\"hi\"); }",
                "Greeter.java",
                10,
                12,
                Some("com.example.Greeter".to_string()),
                HashMap::new(),
            ),
            vec![1.0, 0.0, 0.0],
        ),
        (
            Chunk::new(
                "com.example.Greeter#farewell",
                "farewell",
                ChunkKind::Method,
                "void farewell() { System.out.println(\"bye\"); }",
                "Greeter.java",
                14,
                16,
                Some("com.example.Greeter".to_string()),
                HashMap::new(),
            ),
            vec![0.9, 0.1, 0.0],
        ),
        (
            Chunk::new(
                "com.example.Greeter",
                "Greeter",
                ChunkKind::Class,
                "class Greeter { ... }",
                "Greeter.java",
                1,
                20,
                None,
                HashMap::new(),
            ),
            vec![0.0, 0.0, 1.0],
        ),
    ]
}

fn main() {
    println!("=== Brute-force index ===\n");
    let mut brute = BruteForceIndex::new(IndexConfig::new("text-embedding-3-small", 3));
    for (chunk, vector) in sample_chunks() {
        brute.add(chunk, vector).unwrap();
    }
    for hit in brute.search(&[1.0, 0.0, 0.0], 2).unwrap() {
        println!("{:.3}  {}", hit.similarity, hit.chunk.id);
    }

    #[cfg(feature = "persistence")]
    {
        let mut buf = Vec::new();
        codevec::persistence::save_brute_force(&brute, &mut buf).unwrap();
        let loaded = codevec::persistence::load(&mut std::io::Cursor::new(buf)).unwrap();
        println!("\nreloaded {} chunks from {} bytes", loaded.size(), loaded.dimensions());
    }

    #[cfg(feature = "hnsw")]
    {
        println!("\n=== Proximity-graph index ===\n");
        let mut graph = HnswIndex::new(IndexConfig::new("text-embedding-3-small", 3));
        for (chunk, vector) in sample_chunks() {
            graph.add(chunk, vector).unwrap();
        }
        for hit in graph.search(&[1.0, 0.0, 0.0], 2).unwrap() {
            println!("{:.3}  {}", hit.similarity, hit.chunk.id);
        }
    }
}
