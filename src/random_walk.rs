//! Monte Carlo personalized PageRank: random walks with geometric stopping.
//!
//! Each walk starts at a seed drawn uniformly from the seed list, counts a visit at
//! every node it stands on, and stops with probability `alpha` per step (or at a sink).
//! Normalized visit counts converge to the same distribution as [`crate::ppr`].

use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::graph::WeightedGraphRef;
use crate::topk::normalize;
use crate::{validate_seeds, Error, Result};

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonteCarloConfig {
    /// Per-step stop probability, in `(0, 1)`. Expected walk length is `1 / alpha`.
    pub alpha: f64,
    pub total_walks: usize,
    /// `None` draws a fresh seed from the thread-local entropy source.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self { alpha: 0.15, total_walks: 100_000, seed: None }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "alpha must be in (0, 1) (alpha={})",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonteCarloRun {
    pub scores: Vec<f64>,
    /// Walks actually simulated (0 when the seed list is empty).
    pub walks: usize,
    pub total_visits: u64,
    pub elapsed: Duration,
}

impl MonteCarloRun {
    fn empty(n: usize, start: Instant) -> Self {
        Self { scores: vec![0.0; n], walks: 0, total_visits: 0, elapsed: start.elapsed() }
    }
}

pub(crate) fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

pub fn monte_carlo_checked_run<G: WeightedGraphRef>(
    graph: &G,
    config: MonteCarloConfig,
    seeds: &[usize],
) -> Result<MonteCarloRun> {
    config.validate()?;
    validate_seeds(seeds, graph.node_count())?;
    Ok(monte_carlo_run(graph, config, seeds))
}

/// Simulate `config.total_walks` walks on one ChaCha8 stream.
///
/// Reproducible when `config.seed` is set. Seeds must be node ids of `graph`, and
/// `config.alpha` must be positive: with `alpha <= 0` (or NaN) a walk on a cycle never
/// stops. [`monte_carlo_checked_run`] validates both.
pub fn monte_carlo_run<G: WeightedGraphRef>(
    graph: &G,
    config: MonteCarloConfig,
    seeds: &[usize],
) -> MonteCarloRun {
    let mut rng = ChaCha8Rng::seed_from_u64(resolve_seed(config.seed));
    monte_carlo_run_with_rng(graph, config.alpha, config.total_walks, seeds, &mut rng)
}

/// Simulate `total_walks` walks drawing all randomness from `rng`.
///
/// Same preconditions as [`monte_carlo_run`].
pub fn monte_carlo_run_with_rng<G: WeightedGraphRef, R: Rng>(
    graph: &G,
    alpha: f64,
    total_walks: usize,
    seeds: &[usize],
    rng: &mut R,
) -> MonteCarloRun {
    debug_assert!(alpha > 0.0, "alpha must be > 0 for walks to terminate (alpha={alpha})");
    let start = Instant::now();
    let n = graph.node_count();
    if seeds.is_empty() || n == 0 {
        return MonteCarloRun::empty(n, start);
    }

    let mut visits = vec![0u64; n];
    for _ in 0..total_walks {
        let origin = seeds[rng.random_range(0..seeds.len())];
        walk_visits(graph, origin, alpha, rng, &mut visits);
    }

    finish(visits, total_walks, alpha, start)
}

/// Sharded parallel simulation.
///
/// Walks are split over a fixed number of shards, each with its own ChaCha8 stream
/// derived from the seed and the shard index, and per-shard visit counts are summed.
/// Invariant: output is stable for a fixed `seed`, independent of Rayon thread count.
#[cfg(feature = "parallel")]
pub fn monte_carlo_run_parallel<G: WeightedGraphRef + Sync>(
    graph: &G,
    config: MonteCarloConfig,
    seeds: &[usize],
) -> MonteCarloRun {
    use rayon::prelude::*;

    const SHARDS: usize = 64;

    debug_assert!(
        config.alpha > 0.0,
        "alpha must be > 0 for walks to terminate (alpha={})",
        config.alpha
    );
    let start = Instant::now();
    let n = graph.node_count();
    if seeds.is_empty() || n == 0 {
        return MonteCarloRun::empty(n, start);
    }

    let base = resolve_seed(config.seed);
    let per_shard = config.total_walks / SHARDS;
    let remainder = config.total_walks % SHARDS;

    let visits = (0..SHARDS)
        .into_par_iter()
        .map(|shard| {
            let walks = per_shard + usize::from(shard < remainder);
            let mut rng = ChaCha8Rng::seed_from_u64(mix64(base ^ shard as u64));
            let mut local = vec![0u64; n];
            for _ in 0..walks {
                let origin = seeds[rng.random_range(0..seeds.len())];
                walk_visits(graph, origin, config.alpha, &mut rng, &mut local);
            }
            local
        })
        .reduce(
            || vec![0u64; n],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(&b) {
                    *x += y;
                }
                a
            },
        );

    finish(visits, config.total_walks, config.alpha, start)
}

fn finish(visits: Vec<u64>, walks: usize, alpha: f64, start: Instant) -> MonteCarloRun {
    let total_visits: u64 = visits.iter().sum();
    let mut scores: Vec<f64> = visits.into_iter().map(|c| c as f64).collect();
    normalize(&mut scores);
    let elapsed = start.elapsed();
    debug!(alpha, walks, total_visits, ?elapsed, "monte carlo finished");
    MonteCarloRun { scores, walks, total_visits, elapsed }
}

/// Run one walk from `start`, adding a visit for every node it stands on.
///
/// No length cap: the walk ends on the first `alpha` draw or at a sink.
fn walk_visits<G: WeightedGraphRef, R: Rng>(
    graph: &G,
    start: usize,
    alpha: f64,
    rng: &mut R,
    visits: &mut [u64],
) {
    let mut curr = start;
    loop {
        visits[curr] += 1;
        if rng.random::<f64>() < alpha {
            break;
        }
        let (nbrs, wts) = graph.neighbors_and_weights_ref(curr);
        if nbrs.is_empty() {
            break;
        }
        curr = sample_weighted(nbrs, wts, graph.out_weight_sum(curr), rng);
    }
}

/// Pick a neighbor with probability proportional to its edge weight.
///
/// Scans the weights in order until the running sum reaches a uniform draw from
/// `[0, total)`. `nbrs` must be non-empty.
fn sample_weighted<R: Rng>(nbrs: &[usize], wts: &[f64], total: f64, rng: &mut R) -> usize {
    let target = rng.random::<f64>() * total;
    let mut acc = 0.0;
    for (&v, &w) in nbrs.iter().zip(wts) {
        acc += w;
        if acc >= target {
            return v;
        }
    }
    // Rounding can leave `acc` a hair below `target`.
    nbrs[nbrs.len() - 1]
}
