//! Ranked result tables.
//!
//! Each engine run becomes a CSV with header `NodeID,Score,Status`, sorted by score
//! descending. A sweep also gets a `performance.csv` with per-alpha timings.

use std::fmt;
use std::io::Write;

use crate::registry::NodeRegistry;
use crate::sweep::SweepRow;
use crate::Result;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportConfig {
    /// Non-seed nodes scoring strictly above this are labelled suspicious.
    pub threshold: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { threshold: 0.001 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeStatus {
    Seed,
    Suspicious,
    Safe,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Seed => "Seed",
            Self::Suspicious => "Suspicious",
            Self::Safe => "Safe",
        })
    }
}

/// Which engine produced a score vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Ppr,
    MonteCarlo,
}

impl Method {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ppr => "PPR",
            Self::MonteCarlo => "MC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedNode {
    pub node: usize,
    pub score: f64,
    pub status: NodeStatus,
}

/// Every node, best score first (ties by ascending id), with its label.
pub fn rank_results(scores: &[f64], seeds: &[usize], config: ExportConfig) -> Vec<RankedNode> {
    let mut is_seed = vec![false; scores.len()];
    for &s in seeds {
        if let Some(flag) = is_seed.get_mut(s) {
            *flag = true;
        }
    }

    let mut ranked: Vec<RankedNode> = scores
        .iter()
        .enumerate()
        .map(|(node, &score)| {
            let status = if is_seed[node] {
                NodeStatus::Seed
            } else if score > config.threshold {
                NodeStatus::Suspicious
            } else {
                NodeStatus::Safe
            };
            RankedNode { node, score, status }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.node.cmp(&b.node)));
    ranked
}

/// `results_{PPR|MC}_alpha_{100 * alpha}.csv`, e.g. `results_PPR_alpha_15.csv`.
pub fn results_file_name(method: Method, alpha: f64) -> String {
    format!("results_{}_alpha_{}.csv", method.tag(), (alpha * 100.0).round() as i64)
}

pub fn write_results_csv<W: Write>(
    writer: W,
    registry: &NodeRegistry,
    ranked: &[RankedNode],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["NodeID", "Score", "Status"])?;
    for r in ranked {
        let id = registry.name(r.node).map_or_else(|| r.node.to_string(), str::to_string);
        wtr.write_record([id, r.score.to_string(), r.status.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_performance_csv<W: Write>(writer: W, rows: &[SweepRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Alpha", "PprMicros", "McMicros", "PprIterations", "PprConverged", "McWalks"])?;
    for row in rows {
        wtr.write_record([
            row.alpha.to_string(),
            row.ppr.elapsed.as_micros().to_string(),
            row.monte_carlo.elapsed.as_micros().to_string(),
            row.ppr.iterations.to_string(),
            row.ppr.converged.to_string(),
            row.monte_carlo.walks.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
