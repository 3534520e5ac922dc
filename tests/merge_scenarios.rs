//! Concrete merge and round-trip scenarios with literal inputs, mirroring
//! the worked examples in the design notes this crate implements.

use std::collections::HashMap;

use codevec::index::brute_force::BruteForceIndex;
#[cfg(feature = "hnsw")]
use codevec::index::hnsw::HnswIndex;
use codevec::index::Index;
use codevec::merger::{Backend, Merger};
use codevec::model::{Chunk, ChunkKind, IndexConfig};

fn chunk(id: &str) -> Chunk {
    Chunk::new(id, id, ChunkKind::Method, "fn body() {}", "F.java", 1, 2, None, HashMap::new())
}

fn brute_with(model_id: &str, dims: usize, entries: &[(&str, Vec<f32>)]) -> BruteForceIndex {
    let mut index = BruteForceIndex::new(IndexConfig::new(model_id, dims));
    for (id, vector) in entries {
        index.add(chunk(id), vector.clone()).unwrap();
    }
    index
}

// S1: two brute-force sources, two chunks each, no overlap -> merged size 4.
#[test]
fn s1_two_brute_force_sources_merge_to_size_four() {
    let a = brute_with("m", 2, &[("a1", vec![1.0, 0.0]), ("a2", vec![0.0, 1.0])]);
    let b = brute_with("m", 2, &[("b1", vec![1.0, 1.0]), ("b2", vec![0.5, 0.5])]);

    let mut merger = Merger::new("m", Backend::BruteForce);
    merger.add_index(&a, "artifact:a:1.0");
    merger.add_index(&b, "artifact:b:1.0");
    let merged = merger.build().unwrap();
    assert_eq!(merged.size(), 4);
}

// S2: a chunk id present in both sources survives once, stamped with the
// first source's artifact coordinates and its vector.
#[test]
fn s2_duplicate_id_survives_once_with_first_sources_data() {
    let a = brute_with("m", 2, &[("shared", vec![1.0, 0.0])]);
    let b = brute_with("m", 2, &[("shared", vec![0.0, 1.0])]);

    let mut merger = Merger::new("m", Backend::BruteForce);
    merger.add_index(&a, "artifact:a:1.0");
    merger.add_index(&b, "artifact:b:1.0");
    let merged = merger.build().unwrap();

    assert_eq!(merged.size(), 1);
    let entries = merged.entries();
    assert_eq!(entries[0].chunk.artifact.as_deref(), Some("artifact:a:1.0"));
    assert_eq!(entries[0].vector, vec![1.0, 0.0]);
}

// S3: a source with an incompatible model id is rejected outright.
#[test]
fn s3_incompatible_model_source_is_rejected() {
    let a = brute_with("m", 2, &[("a1", vec![1.0, 0.0])]);
    let incompatible = brute_with("other-model", 2, &[("x1", vec![1.0, 0.0])]);

    let mut merger = Merger::new("m", Backend::BruteForce);
    merger.add_index(&a, "artifact:a:1.0");
    let accepted = merger.add_index(&incompatible, "incompatible-coords");

    assert!(!accepted);
    assert_eq!(merger.rejected_artifacts(), ["incompatible-coords"]);
}

// S4: merging two brute-force sources into a graph-backed target.
#[cfg(feature = "hnsw")]
#[test]
fn s4_cross_backend_merge_targets_graph_size_three() {
    let a = brute_with("m", 2, &[("a1", vec![1.0, 0.0])]);
    let b = brute_with("m", 2, &[("b1", vec![0.0, 1.0]), ("b2", vec![0.7, 0.7])]);

    let mut merger = Merger::new("m", Backend::Hnsw);
    merger.add_index(&a, "artifact:a:1.0");
    merger.add_index(&b, "artifact:b:1.0");
    let merged = merger.build().unwrap();
    assert_eq!(merged.size(), 3);
}

// S5: round-trip 20 chunks through the graph backend's binary format; a
// query matching one of the inserted vectors finds it with similarity
// close to 1.
#[cfg(all(feature = "hnsw", feature = "persistence"))]
#[test]
fn s5_graph_round_trip_preserves_high_confidence_search() {
    let mut index = HnswIndex::new(IndexConfig::new("m", 8));
    for i in 0..20 {
        let mut vector = vec![0.0; 8];
        vector[i % 8] = 1.0;
        index.add(chunk(&format!("c{i}")), vector).unwrap();
    }

    let mut buf = Vec::new();
    codevec::persistence::save_graph(&index, &mut buf).unwrap();
    let loaded = codevec::persistence::load(&mut std::io::Cursor::new(buf)).unwrap();

    let mut query = vec![0.0; 8];
    query[3] = 1.0;
    let results = loaded.search(&query, 5).unwrap();
    assert!(!results.is_empty());
    assert!(results[0].similarity >= 0.99);
}

// S6: top-k results come back in non-increasing similarity order.
#[test]
fn s6_top_k_results_are_non_increasing() {
    let index = brute_with(
        "m",
        2,
        &[
            ("a", vec![1.0, 0.0]),
            ("b", vec![0.9, 0.1]),
            ("c", vec![0.1, 0.9]),
            ("d", vec![0.0, 1.0]),
        ],
    );
    let results = index.search(&[1.0, 0.0], 4).unwrap();
    for window in results.windows(2) {
        assert!(window[0].similarity >= window[1].similarity);
    }
}
