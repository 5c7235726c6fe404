//! Ranking utilities.

use ordered_float::NotNan;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// The `k` highest positive finite scores as `(node, score)`, best first.
///
/// Equal scores rank the lower node id first.
pub fn top_k(scores: &[f64], k: usize) -> Vec<(usize, f64)> {
    if k == 0 || scores.is_empty() { return Vec::new(); }
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for (i, &score) in scores.iter().enumerate() {
        if !score.is_finite() || score <= 0.0 { continue; }
        let Ok(s) = NotNan::new(score) else { continue };
        // Reverse on the id makes the heap evict the higher id among equal scores.
        let entry = Reverse((s, Reverse(i)));
        if heap.len() < k {
            heap.push(entry);
        } else if let Some(min) = heap.peek() {
            if entry < *min {
                heap.pop();
                heap.push(entry);
            }
        }
    }
    let mut results: Vec<(NotNan<f64>, usize)> =
        heap.into_iter().map(|Reverse((s, Reverse(i)))| (s, i)).collect();
    results.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    results.into_iter().map(|(s, i)| (i, s.into_inner())).collect()
}

pub fn normalize(scores: &mut [f64]) {
    let sum: f64 = scores.iter().sum();
    if sum > 0.0 {
        for s in scores { *s /= sum; }
    }
}
