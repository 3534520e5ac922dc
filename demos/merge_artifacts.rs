//! Merging indexes from several build artifacts into one target, with
//! per-artifact provenance and incompatible-source rejection.

use std::collections::HashMap;

use codevec::index::brute_force::BruteForceIndex;
use codevec::index::Index;
use codevec::merger::{Backend, Merger};
use codevec::model::{Chunk, ChunkKind, IndexConfig};

fn index_with(model_id: &str, chunks: &[(&str, [f32; 2])]) -> BruteForceIndex {
    let mut index = BruteForceIndex::new(IndexConfig::new(model_id, 2));
    for (id, vector) in chunks {
        let chunk = Chunk::new(
            *id,
            *id,
            ChunkKind::Method,
            "fn body() {}",
            "File.java",
            1,
            2,
            None,
            HashMap::new(),
        );
        index.add(chunk, vector.to_vec()).unwrap();
    }
    index
}

fn main() {
    let module_a = index_with("text-embedding-3-small", &[("a.Foo#bar", [1.0, 0.0]), ("a.Foo#baz", [0.0, 1.0])]);
    let module_b = index_with("text-embedding-3-small", &[("a.Foo#bar", [0.5, 0.5]), ("b.Quux#run", [1.0, 1.0])]);
    let module_c = index_with("a-different-model", &[("c.Stray#x", [1.0, 0.0])]);

    let mut merger = Merger::new("text-embedding-3-small", Backend::BruteForce);
    merger.add_index(&module_a, "module-a:1.0.0");
    merger.add_index(&module_b, "module-b:1.0.0");
    merger.add_index(&module_c, "module-c:1.0.0");

    println!("rejected artifacts: {:?}", merger.rejected_artifacts());
    println!("pending entries: {}", merger.pending_count());

    let merged = merger.build().unwrap();
    println!("\nmerged index has {} chunks:", merged.size());
    for entry in merged.entries() {
        println!("  {} (artifact: {:?})", entry.chunk.id, entry.chunk.artifact);
    }
}
