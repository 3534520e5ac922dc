//! Best-first beam search over a single graph layer.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use super::distance::cosine_distance;
use super::graph::Layer;

#[derive(PartialEq)]
struct FloatOrd(f32);
impl Eq for FloatOrd {}
impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// Runs a best-first search of width `ef` over `layer`, starting from
/// `entry`, returning up to `ef` `(node, distance)` pairs sorted ascending
/// by distance.
pub fn greedy_search_layer(
    query: &[f32],
    entry: u32,
    layer: &Layer,
    vectors: &[f32],
    dimension: usize,
    ef: usize,
) -> Vec<(u32, f32)> {
    let get = |idx: u32| -> &[f32] {
        let start = idx as usize * dimension;
        &vectors[start..start + dimension]
    };

    let mut visited: HashSet<u32> = HashSet::with_capacity(ef.max(16));
    let mut candidates: BinaryHeap<Reverse<(FloatOrd, u32)>> = BinaryHeap::new();
    let mut found: BinaryHeap<(FloatOrd, u32)> = BinaryHeap::new();

    let entry_dist = cosine_distance(query, get(entry));
    candidates.push(Reverse((FloatOrd(entry_dist), entry)));
    found.push((FloatOrd(entry_dist), entry));
    visited.insert(entry);

    while let Some(Reverse((FloatOrd(dist), node))) = candidates.pop() {
        if let Some((FloatOrd(worst), _)) = found.peek() {
            if found.len() >= ef && dist > *worst {
                break;
            }
        }
        for &neighbor in layer.get_neighbors(node).iter() {
            if !visited.insert(neighbor) {
                continue;
            }
            let d = cosine_distance(query, get(neighbor));
            if found.len() < ef {
                candidates.push(Reverse((FloatOrd(d), neighbor)));
                found.push((FloatOrd(d), neighbor));
            } else if let Some((FloatOrd(worst), _)) = found.peek() {
                if d < *worst {
                    candidates.push(Reverse((FloatOrd(d), neighbor)));
                    found.push((FloatOrd(d), neighbor));
                    found.pop();
                }
            }
        }
    }

    let mut results: Vec<(u32, f32)> = found.into_iter().map(|(FloatOrd(d), n)| (n, d)).collect();
    results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    results
}
