//! Weighted edge-list loading.
//!
//! Format: one edge per line, `source destination [weight]`, whitespace separated.
//! Node names are opaque strings. Blank lines and lines starting with `#` are ignored.
//! A missing weight means `1.0`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::graph::{CsrGraph, Edge};
use crate::registry::NodeRegistry;
use crate::{Error, Result};

/// Weight substituted for zero or negative input weights.
///
/// Small enough to leave such edges almost never taken next to any real edge, while
/// keeping every stored weight strictly positive.
pub const MIN_EDGE_WEIGHT: f64 = 1e-6;

/// Parsed edge list: names mapped to ids, edges in file order.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    pub registry: NodeRegistry,
    pub edges: Vec<Edge>,
    /// Edges whose weight was raised to [`MIN_EDGE_WEIGHT`].
    pub coerced_weights: usize,
}

impl EdgeList {
    pub fn into_graph(self) -> Result<(NodeRegistry, CsrGraph)> {
        let graph = CsrGraph::from_edges(self.registry.len(), &self.edges)?;
        Ok((self.registry, graph))
    }
}

pub fn load_edge_list_path(path: &Path) -> Result<EdgeList> {
    let file = File::open(path)?;
    load_edge_list(BufReader::new(file))
}

pub fn load_edge_list<R: BufRead>(reader: R) -> Result<EdgeList> {
    let mut out = EdgeList::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = line_no + 1;
        let mut it = line.split_whitespace();
        let (Some(src), Some(dst)) = (it.next(), it.next()) else {
            return Err(Error::Parse {
                line: line_no,
                message: "expected `source destination [weight]`".to_string(),
            });
        };
        let weight = match it.next() {
            None => 1.0,
            Some(w) => parse_weight(w, line_no)?,
        };
        if let Some(extra) = it.next() {
            return Err(Error::Parse {
                line: line_no,
                message: format!("unexpected field '{extra}' after the weight"),
            });
        }
        let weight = if weight <= 0.0 {
            out.coerced_weights += 1;
            MIN_EDGE_WEIGHT
        } else {
            weight
        };

        let source = out.registry.get_or_insert(src);
        let target = out.registry.get_or_insert(dst);
        out.edges.push(Edge { source, target, weight });
    }

    if out.coerced_weights > 0 {
        warn!(
            count = out.coerced_weights,
            min_weight = MIN_EDGE_WEIGHT,
            "non-positive edge weights raised to the minimum"
        );
    }
    debug!(nodes = out.registry.len(), edges = out.edges.len(), "edge list loaded");
    Ok(out)
}

fn parse_weight(raw: &str, line: usize) -> Result<f64> {
    let w: f64 = raw.parse().map_err(|e| Error::Parse {
        line,
        message: format!("bad weight '{raw}': {e}"),
    })?;
    if !w.is_finite() {
        return Err(Error::Parse { line, message: format!("weight must be finite, got '{raw}'") });
    }
    Ok(w)
}
