//! Weighted single-source search shared by the centrality and pathfinding engines.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::index::GraphIndex;

/// Priority-queue entry; reversed ordering turns `BinaryHeap` into a min-heap.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeapEntry {
    pub cost: f64,
    pub node: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path tree from one source.
#[derive(Debug, Clone)]
pub(crate) struct ShortestPaths {
    pub source: usize,
    /// Distance per node index, `∞` when unreachable
    pub dist: Vec<f64>,
    /// `(previous node, edge used)` per node index
    pub pred: Vec<Option<(usize, usize)>>,
}

impl ShortestPaths {
    /// Node and edge index sequences from the source to `target`.
    pub fn path_to(&self, target: usize) -> Option<(Vec<usize>, Vec<usize>)> {
        if !self.dist[target].is_finite() {
            return None;
        }
        let mut nodes = vec![target];
        let mut edges = Vec::new();
        let mut current = target;
        while current != self.source {
            let (prev, edge) = self.pred[current]?;
            nodes.push(prev);
            edges.push(edge);
            current = prev;
        }
        nodes.reverse();
        edges.reverse();
        Some((nodes, edges))
    }
}

/// Dijkstra over the whole graph.
pub(crate) fn dijkstra(index: &GraphIndex, source: usize) -> ShortestPaths {
    dijkstra_filtered(index, source, |_| true, |_| true)
}

/// Dijkstra restricted to nodes and edges accepted by the filters.
///
/// The source itself is always admitted. Weights are assumed strictly positive,
/// which ingestion guarantees.
pub(crate) fn dijkstra_filtered(
    index: &GraphIndex,
    source: usize,
    allow_node: impl Fn(usize) -> bool,
    allow_edge: impl Fn(usize) -> bool,
) -> ShortestPaths {
    let n = index.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(HeapEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(HeapEntry { cost, node: u }) = heap.pop() {
        if cost > dist[u] {
            continue;
        }
        for entry in index.neighbors(u) {
            let v = entry.neighbor;
            if v == u || !allow_edge(entry.edge) || !allow_node(v) {
                continue;
            }
            let next = cost + entry.weight;
            if next < dist[v] {
                dist[v] = next;
                pred[v] = Some((u, entry.edge));
                heap.push(HeapEntry { cost: next, node: v });
            }
        }
    }

    ShortestPaths { source, dist, pred }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::models::Edge;
    use crate::test_helpers::{chain, nodes};

    #[test]
    fn test_heap_pops_smallest_cost_first() {
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry { cost: 3.0, node: 0 });
        heap.push(HeapEntry { cost: 1.0, node: 1 });
        heap.push(HeapEntry { cost: 2.0, node: 2 });
        assert_eq!(heap.pop().unwrap().node, 1);
        assert_eq!(heap.pop().unwrap().node, 2);
        assert_eq!(heap.pop().unwrap().node, 0);
    }

    #[test]
    fn test_dijkstra_prefers_lighter_detour() {
        let n = nodes(&["A", "B", "C"]);
        let e = vec![
            Edge::new("ab", "A", "B", 5.0),
            Edge::new("ac", "A", "C", 1.0),
            Edge::new("cb", "C", "B", 1.0),
        ];
        let index = GraphIndex::build(&n, &e);
        let sp = dijkstra(&index, 0);

        assert!((sp.dist[1] - 2.0).abs() < 1e-12);
        let (path, edges) = sp.path_to(1).unwrap();
        assert_eq!(path, vec![0, 2, 1]);
        assert_eq!(edges, vec![1, 2]);
    }

    #[test]
    fn test_dijkstra_filtered_blocks_edges() {
        let (n, e) = chain(&["A", "B", "C"]);
        let index = GraphIndex::build(&n, &e);
        let sp = dijkstra_filtered(&index, 0, |_| true, |edge| edge != 1);
        assert!(sp.dist[2].is_infinite());
        assert!(sp.path_to(2).is_none());
        assert_eq!(sp.path_to(0), Some((vec![0], vec![])));
    }
}
