//! `trustwalk`: seed-personalized trust scores over weighted directed graphs.
//!
//! Two estimators of the same quantity, the personalized random-walk stationary
//! distribution relative to a seed set:
//! - [`personalized_pagerank_run`]: exact power iteration with dead-end mass restarted
//!   at the seeds.
//! - [`monte_carlo_run`]: truncated random walks from the seeds, normalized visit counts.
//!
//! Public invariants (must not drift):
//! - **Node order**: every score vector is indexed by node id \(0..n-1\) of the graph it
//!   was computed on; names live in [`NodeRegistry`].
//! - **Immutability**: a [`CsrGraph`] never changes after construction; engines only read it.
//! - **Determinism**: PPR is bit-reproducible for identical inputs. Monte Carlo is
//!   reproducible only when the caller supplies the RNG or a seed.
//! - **No silent deduplication**: repeated seeds add personalization mass and start
//!   probability.

pub mod export;
pub mod graph;
pub mod loader;
pub mod ppr;
pub mod random_walk;
pub mod registry;
pub mod sweep;
pub mod topk;

pub use export::{
    rank_results, results_file_name, write_performance_csv, write_results_csv, ExportConfig,
    Method, NodeStatus, RankedNode,
};
pub use graph::{CsrGraph, Edge, WeightedGraphRef};
pub use loader::{load_edge_list, load_edge_list_path, EdgeList, MIN_EDGE_WEIGHT};
pub use ppr::{
    personalization_vector, personalized_pagerank, personalized_pagerank_checked_run,
    personalized_pagerank_run, ppr_step, PprConfig, PprRun,
};
#[cfg(feature = "parallel")]
pub use ppr::personalized_pagerank_run_parallel;
pub use random_walk::{
    monte_carlo_checked_run, monte_carlo_run, monte_carlo_run_with_rng, MonteCarloConfig,
    MonteCarloRun,
};
#[cfg(feature = "parallel")]
pub use random_walk::monte_carlo_run_parallel;
pub use registry::{parse_seed_list, resolve_seeds, NodeRegistry};
pub use sweep::{run_sweep, SweepConfig, SweepRow};
pub use topk::{normalize, top_k};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node id {node} out of range for graph with {node_count} nodes")]
    InvalidNodeId { node: usize, node_count: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check that every seed is a node of a graph with `node_count` nodes.
pub(crate) fn validate_seeds(seeds: &[usize], node_count: usize) -> Result<()> {
    match seeds.iter().find(|&&s| s >= node_count) {
        Some(&node) => Err(Error::InvalidNodeId { node, node_count }),
        None => Ok(()),
    }
}
