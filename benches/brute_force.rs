//! Brute-force indexing and search benchmarks.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use codevec::index::{BruteForceIndex, Index};
use codevec::model::{Chunk, ChunkKind, IndexConfig};

fn generate_chunks(n: usize, dim: usize) -> Vec<(Chunk, Vec<f32>)> {
    (0..n)
        .map(|i| {
            let chunk = Chunk::new(
                format!("chunk{i}"),
                format!("method{i}"),
                ChunkKind::Method,
                "fn body() {}",
                format!("File{i}.java"),
                1,
                5,
                None,
                HashMap::new(),
            );
            let vector = (0..dim)
                .map(|j| ((i * 7 + j * 11) % 100) as f32 / 100.0 - 0.5)
                .collect();
            (chunk, vector)
        })
        .collect()
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("brute_force_indexing");
    for (n, dim) in [(100, 128), (1000, 256), (10_000, 384)] {
        let chunks = generate_chunks(n, dim);
        group.bench_with_input(
            BenchmarkId::new("add", format!("{n}chunks_dim{dim}")),
            &chunks,
            |b, chunks| {
                b.iter(|| {
                    let mut index = BruteForceIndex::new(IndexConfig::new("bench-model", dim));
                    for (chunk, vector) in chunks {
                        index.add(chunk.clone(), vector.clone()).unwrap();
                    }
                    black_box(index);
                })
            },
        );
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("brute_force_search");
    for (n, dim, k) in [(1_000, 128, 10), (10_000, 256, 20), (100_000, 384, 50)] {
        let chunks = generate_chunks(n, dim);
        let mut index = BruteForceIndex::new(IndexConfig::new("bench-model", dim));
        for (chunk, vector) in &chunks {
            index.add(chunk.clone(), vector.clone()).unwrap();
        }
        let query = chunks[0].1.clone();

        group.bench_with_input(
            BenchmarkId::new("search", format!("{n}chunks_dim{dim}_k{k}")),
            &query,
            |b, query| {
                b.iter(|| black_box(index.search(query, k).unwrap()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_indexing, bench_search);
criterion_main!(benches);
