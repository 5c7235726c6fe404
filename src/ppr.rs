//! Personalized PageRank by power iteration.
//!
//! Iterates
//! \[
//!   r \leftarrow (1-\alpha) M r + \alpha p + (1-\alpha)\,\Big(\sum_{u \text{ sink}} r_u\Big)\, p
//! \]
//! where \(M\) splits a node's mass over its out-edges in proportion to edge weight.
//! Mass stranded on sinks restarts at the same personalization vector \(p\) as the
//! teleport term, so the total is conserved in exact arithmetic.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::graph::WeightedGraphRef;
use crate::{validate_seeds, Error, Result};

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PprConfig {
    /// Teleport probability per step, in `(0, 1)`.
    pub alpha: f64,
    /// Stop once the L1 distance between successive iterates drops below this.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PprConfig {
    fn default() -> Self {
        Self { alpha: 0.15, tolerance: 1e-6, max_iterations: 100 }
    }
}

impl PprConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "alpha must be in (0, 1) (alpha={})",
                self.alpha
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "tolerance must be finite and > 0 (tolerance={})",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter("max_iterations must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Output of one power-iteration run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PprRun {
    pub scores: Vec<f64>,
    /// Iterations performed. Equal to `max_iterations` when the run did not converge.
    pub iterations: usize,
    /// L1 distance of the last step.
    pub diff_l1: f64,
    pub converged: bool,
    pub elapsed: Duration,
}

/// Build the personalization vector for `seeds` over `n` nodes.
///
/// Each occurrence of a seed carries an equal share of the mass, so duplicates weigh more.
/// Seeds outside `0..n` are skipped (and do not count toward the denominator).
/// An empty seed list gives the all-zero vector.
pub fn personalization_vector(seeds: &[usize], n: usize) -> Vec<f64> {
    let mut p = vec![0.0; n];
    let valid = seeds.iter().filter(|&&s| s < n).count();
    if valid == 0 {
        return p;
    }
    let share = 1.0 / valid as f64;
    for &s in seeds.iter().filter(|&&s| s < n) {
        p[s] += share;
    }
    p
}

/// One power-iteration step: write the next iterate of `scores` into `next` and
/// return the L1 distance between them.
pub fn ppr_step<G: WeightedGraphRef>(
    graph: &G,
    alpha: f64,
    personalization: &[f64],
    scores: &[f64],
    next: &mut [f64],
) -> f64 {
    let n = graph.node_count();
    next.fill(0.0);
    let mut dead_mass = 0.0;
    for u in 0..n {
        let mass = scores[u];
        let (nbrs, wts) = graph.neighbors_and_weights_ref(u);
        let ws = graph.out_weight_sum(u);
        if nbrs.is_empty() || ws <= 0.0 {
            dead_mass += mass;
            continue;
        }
        for (&v, &w) in nbrs.iter().zip(wts) {
            next[v] += mass * (w / ws);
        }
    }

    let keep = 1.0 - alpha;
    for (r, &p) in next.iter_mut().zip(personalization) {
        *r = keep * *r + alpha * p + keep * dead_mass * p;
    }

    scores.iter().zip(next.iter()).map(|(old, new)| (old - new).abs()).sum()
}

pub fn personalized_pagerank<G: WeightedGraphRef>(
    graph: &G,
    config: PprConfig,
    seeds: &[usize],
) -> Vec<f64> {
    personalized_pagerank_run(graph, config, seeds).scores
}

pub fn personalized_pagerank_checked_run<G: WeightedGraphRef>(
    graph: &G,
    config: PprConfig,
    seeds: &[usize],
) -> Result<PprRun> {
    config.validate()?;
    validate_seeds(seeds, graph.node_count())?;
    Ok(personalized_pagerank_run(graph, config, seeds))
}

/// Serial power iteration. Bit-reproducible for identical inputs.
///
/// Hitting `max_iterations` is not an error: the last iterate is returned with
/// `converged == false`.
pub fn personalized_pagerank_run<G: WeightedGraphRef>(
    graph: &G,
    config: PprConfig,
    seeds: &[usize],
) -> PprRun {
    let p = personalization_vector(seeds, graph.node_count());
    power_iterate(p, config, |scores, next, p| ppr_step(graph, config.alpha, p, scores, next))
}

/// Power iteration with each step spread over Rayon.
///
/// The out-edges are transposed once per run, so every node pulls its incoming mass
/// in source order and no per-step push buffers are allocated. Scores match
/// [`personalized_pagerank_run`] term for term. The L1 step size is summed per
/// fixed-size chunk, so the whole run is independent of the Rayon thread count.
#[cfg(feature = "parallel")]
pub fn personalized_pagerank_run_parallel<G: WeightedGraphRef + Sync>(
    graph: &G,
    config: PprConfig,
    seeds: &[usize],
) -> PprRun {
    let p = personalization_vector(seeds, graph.node_count());
    let incoming = IncomingEdges::new(graph);
    power_iterate(p, config, |scores, next, p| incoming.step(config.alpha, p, scores, next))
}

/// Transposed edge list: for each target, its sources and the fraction of each
/// source's mass the edge carries.
#[cfg(feature = "parallel")]
struct IncomingEdges {
    row_start: Vec<usize>,
    source: Vec<usize>,
    share: Vec<f64>,
    sinks: Vec<usize>,
}

#[cfg(feature = "parallel")]
impl IncomingEdges {
    fn new<G: WeightedGraphRef>(graph: &G) -> Self {
        let n = graph.node_count();
        let mut row_start = vec![0usize; n + 1];
        let mut sinks = Vec::new();
        for u in 0..n {
            let (nbrs, _) = graph.neighbors_and_weights_ref(u);
            if nbrs.is_empty() || graph.out_weight_sum(u) <= 0.0 {
                sinks.push(u);
                continue;
            }
            for &v in nbrs {
                row_start[v + 1] += 1;
            }
        }
        for i in 0..n {
            row_start[i + 1] += row_start[i];
        }

        // Sources are scattered in ascending order, the order the serial push adds them.
        let m = row_start[n];
        let mut cursor = row_start[..n].to_vec();
        let mut source = vec![0usize; m];
        let mut share = vec![0.0f64; m];
        for u in 0..n {
            let (nbrs, wts) = graph.neighbors_and_weights_ref(u);
            let ws = graph.out_weight_sum(u);
            if nbrs.is_empty() || ws <= 0.0 {
                continue;
            }
            for (&v, &w) in nbrs.iter().zip(wts) {
                let slot = cursor[v];
                source[slot] = u;
                share[slot] = w / ws;
                cursor[v] += 1;
            }
        }

        Self { row_start, source, share, sinks }
    }

    fn step(&self, alpha: f64, personalization: &[f64], scores: &[f64], next: &mut [f64]) -> f64 {
        use rayon::prelude::*;

        const CHUNK: usize = 4096;

        let dead_mass: f64 = self.sinks.iter().map(|&u| scores[u]).sum();
        let keep = 1.0 - alpha;

        let chunk_diffs: Vec<f64> = next
            .par_chunks_mut(CHUNK)
            .enumerate()
            .map(|(c, chunk)| {
                let base = c * CHUNK;
                let mut diff = 0.0;
                for (offset, r) in chunk.iter_mut().enumerate() {
                    let v = base + offset;
                    let (lo, hi) = (self.row_start[v], self.row_start[v + 1]);
                    let mut pushed = 0.0;
                    for (&u, &share) in self.source[lo..hi].iter().zip(&self.share[lo..hi]) {
                        pushed += scores[u] * share;
                    }
                    let p = personalization[v];
                    *r = keep * pushed + alpha * p + keep * dead_mass * p;
                    diff += (scores[v] - *r).abs();
                }
                diff
            })
            .collect();
        chunk_diffs.iter().sum()
    }
}

fn power_iterate<F>(p: Vec<f64>, config: PprConfig, mut step: F) -> PprRun
where
    F: FnMut(&[f64], &mut [f64], &[f64]) -> f64,
{
    let start = Instant::now();
    let n = p.len();
    if n == 0 {
        return PprRun {
            scores: Vec::new(),
            iterations: 0,
            diff_l1: 0.0,
            converged: true,
            elapsed: start.elapsed(),
        };
    }

    let mut scores = p.clone();
    let mut next = vec![0.0; n];
    let mut iters = 0usize;
    let mut last_diff = f64::INFINITY;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        iters += 1;
        let diff = step(&scores, &mut next, &p);
        last_diff = diff;
        std::mem::swap(&mut scores, &mut next);
        if diff < config.tolerance {
            converged = true;
            break;
        }
    }

    let elapsed = start.elapsed();
    if converged {
        debug!(alpha = config.alpha, iterations = iters, diff_l1 = last_diff, ?elapsed, "ppr converged");
    } else {
        warn!(
            alpha = config.alpha,
            max_iterations = config.max_iterations,
            diff_l1 = last_diff,
            "ppr hit the iteration cap before converging"
        );
    }

    PprRun { scores, iterations: iters, diff_l1: last_diff, converged, elapsed }
}
