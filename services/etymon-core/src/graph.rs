//! Language relatedness graph and its all-pairs shortest paths.
//!
//! The graph is a small expert-authored weight matrix; lower weight means
//! closer languages and `f64::INFINITY` means no direct edge. Shortest paths
//! are computed once per scoring run with Floyd–Warshall.

use ndarray::Array2;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::warn;

use crate::error::{EtymonError, Result};
use crate::types::LanguageSet;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Validated square, symmetric, zero-diagonal weight matrix
#[derive(Debug, Clone, PartialEq)]
pub struct RelatednessGraph {
    weights: Array2<f64>,
}

impl RelatednessGraph {
    pub fn new(weights: Array2<f64>) -> Result<Self> {
        let (rows, cols) = weights.dim();
        if rows != cols {
            return Err(EtymonError::GraphShape(format!(
                "matrix is {rows}x{cols}, expected square"
            )));
        }

        for ((i, j), &w) in weights.indexed_iter() {
            if w.is_nan() || w < 0.0 {
                return Err(EtymonError::GraphShape(format!(
                    "weight [{i}][{j}] = {w} must be non-negative"
                )));
            }
            if i == j && w != 0.0 {
                return Err(EtymonError::GraphShape(format!(
                    "diagonal weight [{i}][{i}] = {w}, expected 0"
                )));
            }
            let mirror = weights[[j, i]];
            let symmetric = (w.is_infinite() && mirror.is_infinite())
                || (w - mirror).abs() <= SYMMETRY_TOLERANCE;
            if !symmetric {
                return Err(EtymonError::GraphShape(format!(
                    "weight [{i}][{j}] = {w} differs from [{j}][{i}] = {mirror}"
                )));
            }
        }

        Ok(Self { weights })
    }

    /// Build from nested rows; rows of unequal length are a shape error
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(EtymonError::GraphShape(format!(
                "row {idx} has {} entries, expected {n}",
                row.len()
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let weights = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| EtymonError::GraphShape(e.to_string()))?;
        Self::new(weights)
    }

    /// Check the graph covers exactly the given languages
    pub fn ensure_matches(&self, languages: &LanguageSet) -> Result<()> {
        if self.len() != languages.len() {
            return Err(EtymonError::GraphShape(format!(
                "graph has {} nodes but {} languages are configured",
                self.len(),
                languages.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.weights.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn shortest_paths(&self) -> ShortestPathMatrix {
        let mut dist = self.weights.clone();
        floyd_warshall(&mut dist);

        let stats = self.stats();
        if stats.num_components > 1 {
            warn!(
                components = stats.num_components,
                "relatedness graph is disconnected, some pairs earn no credit"
            );
        }

        ShortestPathMatrix { dist }
    }

    fn to_petgraph(&self) -> UnGraph<usize, f64> {
        let n = self.len();
        let mut graph = UnGraph::with_capacity(n, n * n / 2);
        let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();
        for i in 0..n {
            for j in (i + 1)..n {
                let w = self.weights[[i, j]];
                if w.is_finite() {
                    graph.add_edge(nodes[i], nodes[j], w);
                }
            }
        }
        graph
    }

    pub fn stats(&self) -> GraphStats {
        let graph = self.to_petgraph();
        GraphStats {
            num_nodes: graph.node_count(),
            num_edges: graph.edge_count(),
            num_components: connected_components(&graph),
        }
    }

    /// Export nodes and finite edges as JSON for visualization
    pub fn to_json(&self, languages: &LanguageSet) -> serde_json::Value {
        let graph = self.to_petgraph();
        let label = |idx: usize| {
            languages
                .get(idx)
                .map(|l| l.name.clone())
                .unwrap_or_else(|| idx.to_string())
        };

        let nodes: Vec<_> = graph
            .node_indices()
            .map(|idx| serde_json::json!({ "id": label(graph[idx]) }))
            .collect();

        let edges: Vec<_> = graph
            .edge_references()
            .map(|edge| {
                serde_json::json!({
                    "source": label(graph[edge.source()]),
                    "target": label(graph[edge.target()]),
                    "weight": edge.weight(),
                })
            })
            .collect();

        serde_json::json!({
            "nodes": nodes,
            "edges": edges,
        })
    }
}

/// Relax `dist` in place into all-pairs shortest path distances.
///
/// Infinite entries are never summed, so "no edge" stays infinite unless a
/// finite route exists.
pub fn floyd_warshall(dist: &mut Array2<f64>) {
    let v = dist.nrows();
    for k in 0..v {
        for i in 0..v {
            let via_k = dist[[i, k]];
            if !via_k.is_finite() {
                continue;
            }
            for j in 0..v {
                let tail = dist[[k, j]];
                if tail.is_finite() && via_k + tail < dist[[i, j]] {
                    dist[[i, j]] = via_k + tail;
                }
            }
        }
    }
}

/// Immutable all-pairs shortest path distances
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathMatrix {
    dist: Array2<f64>,
}

impl ShortestPathMatrix {
    pub fn len(&self) -> usize {
        self.dist.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }

    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.dist.get([from, to]).copied()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.dist
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.dist.outer_iter().map(|row| row.to_vec()).collect()
    }
}

/// Graph statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_components: usize,
}
