//! Alpha sweep: both engines, several teleport probabilities, one graph.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::export::{results_file_name, Method};
use crate::graph::WeightedGraphRef;
use crate::ppr::{PprConfig, PprRun};
use crate::random_walk::{mix64, resolve_seed, MonteCarloConfig, MonteCarloRun};
use crate::{validate_seeds, Error, Result};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepConfig {
    pub alphas: Vec<f64>,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub total_walks: usize,
    /// Base seed for the Monte Carlo streams; `None` means high-entropy.
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            alphas: vec![0.15, 0.50, 0.85],
            tolerance: 1e-6,
            max_iterations: 100,
            total_walks: 100_000,
            seed: None,
        }
    }
}

impl SweepConfig {
    fn ppr(&self, alpha: f64) -> PprConfig {
        PprConfig { alpha, tolerance: self.tolerance, max_iterations: self.max_iterations }
    }

    /// Monte Carlo config for the `index`-th alpha, on its own stream.
    fn monte_carlo(&self, index: usize, alpha: f64, base_seed: u64) -> MonteCarloConfig {
        MonteCarloConfig {
            alpha,
            total_walks: self.total_walks,
            seed: Some(mix64(base_seed ^ index as u64)),
        }
    }

    /// Reject an empty alpha list, out-of-range alphas, and alphas whose result
    /// files would share a name (see [`results_file_name`]).
    pub fn validate(&self) -> Result<()> {
        if self.alphas.is_empty() {
            return Err(Error::InvalidParameter("alphas must not be empty".to_string()));
        }
        let mut names: HashMap<String, f64> = HashMap::with_capacity(self.alphas.len());
        for &alpha in &self.alphas {
            self.ppr(alpha).validate()?;
            if let Some(prev) = names.insert(results_file_name(Method::Ppr, alpha), alpha) {
                return Err(Error::InvalidParameter(format!(
                    "alphas {prev} and {alpha} round to the same percentage"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepRow {
    pub alpha: f64,
    pub ppr: PprRun,
    pub monte_carlo: MonteCarloRun,
}

/// Run PPR and Monte Carlo for every alpha in `config.alphas`, in input order.
///
/// With a fixed `config.seed` the rows are reproducible, including under the
/// `parallel` feature.
pub fn run_sweep<G>(graph: &G, seeds: &[usize], config: &SweepConfig) -> Result<Vec<SweepRow>>
where
    G: WeightedGraphRef + Sync,
{
    config.validate()?;
    validate_seeds(seeds, graph.node_count())?;
    if seeds.is_empty() {
        warn!("empty seed set: every score will be zero");
    }

    let base_seed = resolve_seed(config.seed);
    let run_one = |index: usize, alpha: f64| -> SweepRow {
        let (ppr, monte_carlo) = run_pair(graph, seeds, config, index, alpha, base_seed);
        info!(
            alpha,
            ppr_iterations = ppr.iterations,
            ppr_converged = ppr.converged,
            ppr_micros = ppr.elapsed.as_micros() as u64,
            mc_walks = monte_carlo.walks,
            mc_micros = monte_carlo.elapsed.as_micros() as u64,
            "alpha done"
        );
        SweepRow { alpha, ppr, monte_carlo }
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<SweepRow> = {
        use rayon::prelude::*;
        config.alphas.par_iter().enumerate().map(|(i, &a)| run_one(i, a)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<SweepRow> = config.alphas.iter().enumerate().map(|(i, &a)| run_one(i, a)).collect();

    Ok(rows)
}

#[cfg(feature = "parallel")]
fn run_pair<G: WeightedGraphRef + Sync>(
    graph: &G,
    seeds: &[usize],
    config: &SweepConfig,
    index: usize,
    alpha: f64,
    base_seed: u64,
) -> (PprRun, MonteCarloRun) {
    rayon::join(
        || crate::ppr::personalized_pagerank_run_parallel(graph, config.ppr(alpha), seeds),
        || {
            crate::random_walk::monte_carlo_run_parallel(
                graph,
                config.monte_carlo(index, alpha, base_seed),
                seeds,
            )
        },
    )
}

#[cfg(not(feature = "parallel"))]
fn run_pair<G: WeightedGraphRef>(
    graph: &G,
    seeds: &[usize],
    config: &SweepConfig,
    index: usize,
    alpha: f64,
    base_seed: u64,
) -> (PprRun, MonteCarloRun) {
    let ppr = crate::ppr::personalized_pagerank_run(graph, config.ppr(alpha), seeds);
    let monte_carlo = crate::random_walk::monte_carlo_run(
        graph,
        config.monte_carlo(index, alpha, base_seed),
        seeds,
    );
    (ppr, monte_carlo)
}
