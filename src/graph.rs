//! Graph adapter trait and the compressed sparse-row graph.

use crate::{Error, Result};

/// A weighted directed graph view that can return **borrowed** neighbor + weight slices.
///
/// This is the “CSR-style” view both scoring engines walk:
/// a node has a contiguous neighbor list and a contiguous weight list,
/// with matching indices.
pub trait WeightedGraphRef {
    fn node_count(&self) -> usize;

    /// Return `(neighbors, weights)` for a node.
    ///
    /// Requirements:
    /// - `neighbors.len() == weights.len()`
    /// - weights are strictly positive.
    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]);

    fn out_degree(&self, node: usize) -> usize {
        self.neighbors_and_weights_ref(node).0.len()
    }

    /// Total outgoing weight of `node`. Zero exactly when the node is a sink.
    fn out_weight_sum(&self, node: usize) -> f64 {
        self.neighbors_and_weights_ref(node).1.iter().sum()
    }

    fn is_sink(&self, node: usize) -> bool {
        self.out_degree(node) == 0
    }
}

/// A directed edge `source -> target` carrying a positive weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: usize, target: usize, weight: f64) -> Self {
        Self { source, target, weight }
    }
}

impl From<(usize, usize, f64)> for Edge {
    fn from((source, target, weight): (usize, usize, f64)) -> Self {
        Self { source, target, weight }
    }
}

/// Immutable weighted directed graph in compressed sparse-row layout.
///
/// Node `i`'s out-edges live at `row_start[i]..row_start[i + 1]` in the parallel
/// `neighbor_id` / `neighbor_weight` arrays, in the order they were handed to
/// [`CsrGraph::from_edges`]. Parallel edges are kept as separate entries.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    row_start: Vec<usize>,
    neighbor_id: Vec<usize>,
    neighbor_weight: Vec<f64>,
    out_weight_sum: Vec<f64>,
}

impl CsrGraph {
    /// Build the graph from a complete edge list over nodes `0..num_nodes`.
    ///
    /// Two passes, no per-node lists: count out-degrees, prefix-sum them into row
    /// offsets, then scatter each edge through a per-row write cursor.
    ///
    /// Fails with [`Error::InvalidNodeId`] if any endpoint is `>= num_nodes`; nothing is
    /// built in that case.
    pub fn from_edges(num_nodes: usize, edges: &[Edge]) -> Result<Self> {
        Self::build(num_nodes, edges)
    }

    /// [`CsrGraph::from_edges`] over `(source, target, weight)` tuples.
    pub fn from_triples(num_nodes: usize, edges: &[(usize, usize, f64)]) -> Result<Self> {
        Self::build(num_nodes, edges)
    }

    fn build<E>(num_nodes: usize, edges: &[E]) -> Result<Self>
    where
        E: Copy + Into<Edge>,
    {
        let mut row_start = vec![0usize; num_nodes + 1];
        for &e in edges {
            let e: Edge = e.into();
            for node in [e.source, e.target] {
                if node >= num_nodes {
                    return Err(Error::InvalidNodeId { node, node_count: num_nodes });
                }
            }
            row_start[e.source + 1] += 1;
        }
        for i in 1..=num_nodes {
            row_start[i] += row_start[i - 1];
        }

        let m = edges.len();
        let mut neighbor_id = vec![0usize; m];
        let mut neighbor_weight = vec![0.0f64; m];
        let mut out_weight_sum = vec![0.0f64; num_nodes];
        let mut cursor: Vec<usize> = row_start[..num_nodes].to_vec();

        for &e in edges {
            let e: Edge = e.into();
            let slot = cursor[e.source];
            neighbor_id[slot] = e.target;
            neighbor_weight[slot] = e.weight;
            out_weight_sum[e.source] += e.weight;
            cursor[e.source] += 1;
        }

        Ok(Self { row_start, neighbor_id, neighbor_weight, out_weight_sum })
    }

    pub fn num_nodes(&self) -> usize {
        self.out_weight_sum.len()
    }

    pub fn num_edges(&self) -> usize {
        self.neighbor_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes() == 0
    }

    /// Row offsets, length `num_nodes + 1`.
    pub fn row_start(&self) -> &[usize] {
        &self.row_start
    }

    pub fn neighbor_ids(&self) -> &[usize] {
        &self.neighbor_id
    }

    pub fn neighbor_weights(&self) -> &[f64] {
        &self.neighbor_weight
    }

    pub fn out_weight_sums(&self) -> &[f64] {
        &self.out_weight_sum
    }

    /// Iterate `(target, weight)` over the out-edges of `node`.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (ids, wts) = self.neighbors_and_weights_ref(node);
        ids.iter().copied().zip(wts.iter().copied())
    }

    /// Nodes with no outgoing edges.
    pub fn sinks(&self) -> Vec<usize> {
        (0..self.num_nodes()).filter(|&i| self.row_start[i] == self.row_start[i + 1]).collect()
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self {
            row_start: vec![0],
            neighbor_id: Vec::new(),
            neighbor_weight: Vec::new(),
            out_weight_sum: Vec::new(),
        }
    }
}

impl WeightedGraphRef for CsrGraph {
    fn node_count(&self) -> usize {
        self.num_nodes()
    }

    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]) {
        let (start, end) = (self.row_start[node], self.row_start[node + 1]);
        (&self.neighbor_id[start..end], &self.neighbor_weight[start..end])
    }

    fn out_degree(&self, node: usize) -> usize {
        self.row_start[node + 1] - self.row_start[node]
    }

    fn out_weight_sum(&self, node: usize) -> f64 {
        self.out_weight_sum[node]
    }
}
