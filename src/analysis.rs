//! Corpus-level analysis built generically over [`Index`]: near-duplicate
//! grouping and embedding-outlier detection.

use std::collections::HashSet;

use crate::index::Index;
use crate::model::{Chunk, DuplicateGroup};

/// Greedily agglomerates chunks into duplicate groups.
///
/// Chunks are visited in insertion order. A chunk already claimed by an
/// earlier group is skipped. Otherwise its candidate neighbors (scored by
/// the backend's own neighborhood, see [`Index::duplicate_candidates`]) at
/// or above `threshold` join its group. Groups of size 1 are discarded.
/// `floor_similarity` on the emitted group is `threshold` itself.
pub fn find_duplicates(index: &dyn Index, threshold: f32) -> Vec<DuplicateGroup> {
    let entries = index.entries();
    let mut claimed: HashSet<String> = HashSet::new();
    let mut groups = Vec::new();

    for entry in &entries {
        let id = &entry.chunk.id;
        if claimed.contains(id) {
            continue;
        }
        let candidates = index.duplicate_candidates(id);
        let mut members: Vec<(Chunk, f32)> = candidates
            .into_iter()
            .filter(|(c, sim)| *sim >= threshold && !claimed.contains(&c.id))
            .collect();
        if members.is_empty() {
            continue;
        }

        claimed.insert(id.clone());
        for (c, _) in &members {
            claimed.insert(c.id.clone());
        }

        members.insert(0, (entry.chunk.clone(), 1.0));
        let chunks: Vec<Chunk> = members.into_iter().map(|(c, _)| c).collect();
        groups.push(DuplicateGroup::new(threshold, chunks));
    }

    groups
}

/// Flags chunks whose neighborhood similarity falls below `threshold`,
/// suggesting they sit apart from the rest of the corpus in embedding
/// space. Returns nothing for corpora with fewer than 5 chunks — there's
/// no meaningful notion of an outlier in a handful of entries.
pub fn find_anomalies(index: &dyn Index, threshold: f32) -> Vec<Chunk> {
    let entries = index.entries();
    if entries.len() < 5 {
        return Vec::new();
    }

    let mut anomalies = Vec::new();
    for entry in &entries {
        let candidates = index.anomaly_candidates(&entry.chunk.id);
        if candidates.is_empty() {
            continue;
        }
        let mean: f32 = candidates.iter().map(|(_, sim)| *sim).sum::<f32>() / candidates.len() as f32;
        if mean < threshold {
            anomalies.push(entry.chunk.clone());
        }
    }
    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BruteForceIndex;
    use crate::model::{ChunkKind, IndexConfig};
    use std::collections::HashMap;

    fn chunk(id: &str) -> Chunk {
        Chunk::new(id, id, ChunkKind::Method, "body", "f.rs", 1, 2, None, HashMap::new())
    }

    #[test]
    fn duplicates_emit_only_groups_of_at_least_two() {
        let mut idx = BruteForceIndex::new(IndexConfig::new("m", 2));
        idx.add(chunk("a"), vec![1.0, 0.0]).unwrap();
        idx.add(chunk("b"), vec![1.0, 0.0]).unwrap();
        idx.add(chunk("c"), vec![0.0, 1.0]).unwrap();

        let groups = find_duplicates(&idx, 0.99);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 2);
        let ids: Vec<&str> = groups[0].chunks.iter().map(|c| c.id.as_str()).collect();
        assert!(ids.contains(&"a"));
        assert!(ids.contains(&"b"));
    }

    #[test]
    fn duplicate_membership_is_exclusive_first_claim_wins() {
        let mut idx = BruteForceIndex::new(IndexConfig::new("m", 2));
        idx.add(chunk("a"), vec![1.0, 0.0]).unwrap();
        idx.add(chunk("b"), vec![1.0, 0.0]).unwrap();
        idx.add(chunk("c"), vec![1.0, 0.0]).unwrap();

        let groups = find_duplicates(&idx, 0.99);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
    }

    #[test]
    fn anomalies_require_at_least_five_chunks() {
        let mut idx = BruteForceIndex::new(IndexConfig::new("m", 2));
        for i in 0..4 {
            idx.add(chunk(&format!("c{i}")), vec![1.0, 0.0]).unwrap();
        }
        assert!(find_anomalies(&idx, 0.5).is_empty());
    }

    #[test]
    fn anomalies_flag_low_mean_similarity_chunks() {
        let mut idx = BruteForceIndex::new(IndexConfig::new("m", 2));
        for _ in 0..5 {
            idx.add(chunk(&format!("near{}", idx.size())), vec![1.0, 0.0]).unwrap();
        }
        idx.add(chunk("outlier"), vec![0.0, 1.0]).unwrap();

        let anomalies = find_anomalies(&idx, 0.5);
        let ids: Vec<&str> = anomalies.iter().map(|c| c.id.as_str()).collect();
        assert!(ids.contains(&"outlier"));
        assert!(!ids.contains(&"near0"));
    }
}
