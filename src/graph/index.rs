//! Shared lookup structures for the analysis engines.
//!
//! [`GraphIndex`] wraps a `petgraph::UnGraph` with an id ↔ `NodeIndex` map and
//! flat per-node adjacency lists. It is immutable once built; every graph
//! update produces a fresh index which the engines share through an `Arc`.

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use super::models::{normalize_weight, Edge, Node};

/// One adjacency entry. Edge references are indices into the accepted-edge list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjEntry {
    pub neighbor: usize,
    pub weight: f64,
    pub edge: usize,
}

/// Immutable node/adjacency/edge lookup built from a `(nodes, edges)` snapshot.
///
/// Node indices follow first-occurrence order of the input, which makes every
/// traversal deterministic. Duplicate node ids keep their first record; edges
/// naming an unknown endpoint are set aside in [`GraphIndex::dropped_edges`].
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    graph: UnGraph<Node, Edge>,
    id_to_index: HashMap<String, NodeIndex>,
    adjacency: Vec<Vec<AdjEntry>>,
    weighted_degree: Vec<f64>,
    total_weight: f64,
    dropped_edges: Vec<Edge>,
}

impl GraphIndex {
    /// Build the index in O(N + E).
    ///
    /// Edge weights are normalised again here, including struct-literal edges,
    /// so every engine reads strictly positive, finite weights.
    pub fn build(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut graph = UnGraph::with_capacity(nodes.len(), edges.len());
        let mut id_to_index = HashMap::with_capacity(nodes.len());

        for node in nodes {
            if !id_to_index.contains_key(&node.id) {
                let idx = graph.add_node(node.clone());
                id_to_index.insert(node.id.clone(), idx);
            }
        }

        let mut dropped_edges = Vec::new();
        for edge in edges {
            let edge = Edge {
                weight: normalize_weight(Some(edge.weight)),
                ..edge.clone()
            };
            match (
                id_to_index.get(&edge.source_id),
                id_to_index.get(&edge.target_id),
            ) {
                (Some(&a), Some(&b)) => {
                    graph.add_edge(a, b, edge);
                }
                _ => dropped_edges.push(edge),
            }
        }

        let n = graph.node_count();
        let mut adjacency: Vec<Vec<AdjEntry>> = vec![Vec::new(); n];
        let mut weighted_degree = vec![0.0; n];
        let mut total_weight = 0.0;

        for edge_ref in graph.edge_references() {
            let s = edge_ref.source().index();
            let t = edge_ref.target().index();
            let w = edge_ref.weight().weight;
            let e = edge_ref.id().index();

            adjacency[s].push(AdjEntry {
                neighbor: t,
                weight: w,
                edge: e,
            });
            weighted_degree[s] += w;
            // Self-loops register once
            if s != t {
                adjacency[t].push(AdjEntry {
                    neighbor: s,
                    weight: w,
                    edge: e,
                });
                weighted_degree[t] += w;
            }
            total_weight += w;
        }

        if !dropped_edges.is_empty() {
            tracing::debug!(
                "Dropped {} edge(s) referencing unknown nodes",
                dropped_edges.len()
            );
        }

        Self {
            graph,
            id_to_index,
            adjacency,
            weighted_degree,
            total_weight,
            dropped_edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of accepted (non-dangling) edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).map(|idx| idx.index())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.graph[NodeIndex::new(idx)]
    }

    pub fn node_id(&self, idx: usize) -> &str {
        &self.node(idx).id
    }

    /// Node ids in index order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(|n| n.id.as_str())
    }

    pub fn edge(&self, idx: usize) -> &Edge {
        &self.graph[EdgeIndex::new(idx)]
    }

    pub fn edge_id(&self, idx: usize) -> &str {
        &self.edge(idx).id
    }

    /// Accepted edges in input order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.graph.edge_weights()
    }

    /// Endpoint indices of an accepted edge.
    pub fn endpoints(&self, edge: usize) -> (usize, usize) {
        let e = self.edge(edge);
        (
            self.id_to_index[&e.source_id].index(),
            self.id_to_index[&e.target_id].index(),
        )
    }

    pub fn neighbors(&self, idx: usize) -> &[AdjEntry] {
        &self.adjacency[idx]
    }

    /// Number of incident edges (a self-loop counts once).
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    /// Sum of incident edge weights.
    pub fn weighted_degree(&self, idx: usize) -> f64 {
        self.weighted_degree[idx]
    }

    pub fn weighted_degree_of(&self, id: &str) -> Option<f64> {
        self.index_of(id).map(|idx| self.weighted_degree[idx])
    }

    /// Sum of all accepted edge weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Edges whose endpoints did not resolve, in input order.
    pub fn dropped_edges(&self) -> &[Edge] {
        &self.dropped_edges
    }

    /// Connected components as lists of node indices.
    ///
    /// Components appear in order of their lowest node index; members in DFS
    /// preorder, matching a recursive traversal over adjacency order.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for root in 0..n {
            if visited[root] {
                continue;
            }
            components.push(self.dfs_preorder(root, &mut visited));
        }
        components
    }

    /// Component membership: node index → component number.
    pub fn component_labels(&self) -> (Vec<usize>, usize) {
        let components = self.components();
        let mut labels = vec![0; self.node_count()];
        for (c, members) in components.iter().enumerate() {
            for &v in members {
                labels[v] = c;
            }
        }
        (labels, components.len())
    }

    /// Iterative DFS from `root`, marking `visited`. Returns nodes in preorder.
    pub fn dfs_preorder(&self, root: usize, visited: &mut [bool]) -> Vec<usize> {
        let mut order = vec![root];
        visited[root] = true;
        // (node, next adjacency cursor)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (u, cursor) = *frame;
            match self.adjacency[u].get(cursor) {
                Some(entry) => {
                    frame.1 += 1;
                    let v = entry.neighbor;
                    if !visited[v] {
                        visited[v] = true;
                        order.push(v);
                        stack.push((v, 0));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        order
    }
}
