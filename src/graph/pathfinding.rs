//! Shortest paths and structural queries.
//!
//! Edge weights are read directly as traversal cost. Every traversal ignores
//! edge orientation, and every depth-first walk runs on an explicit stack of
//! `(node, next-neighbour cursor)` frames so deep graphs cannot overflow the
//! call stack.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::index::GraphIndex;
use super::models::{
    Bridge, CenterPeriphery, ComponentInfo, ConnectedComponent, DiameterRadius, GraphSummary,
    NodeDistance, PathResult,
};
use super::traversal::{dijkstra, dijkstra_filtered};

/// Eccentricities this close are considered equal when picking center/periphery.
const ECCENTRICITY_EPSILON: f64 = 1e-9;

/// A path over node and edge indices, before ids are resolved.
#[derive(Debug, Clone, PartialEq)]
struct IndexPath {
    cost: f64,
    nodes: Vec<usize>,
    edges: Vec<usize>,
}

/// Output of one low-link DFS pass over the whole graph.
struct LowLink {
    /// Bridge edge indices, ascending
    bridges: Vec<usize>,
    articulation: Vec<bool>,
}

/// One frame of the iterative low-link DFS.
struct LowLinkFrame {
    node: usize,
    /// Edge used to enter `node`; skipped once so parallel edges still count as back edges
    parent_edge: Option<usize>,
    cursor: usize,
}

#[derive(Debug, Clone)]
pub struct PathfindingEngine {
    index: Arc<GraphIndex>,
    all_paths_max_depth: usize,
}

impl PathfindingEngine {
    pub fn new(index: Arc<GraphIndex>, all_paths_max_depth: usize) -> Self {
        Self {
            index,
            all_paths_max_depth,
        }
    }

    fn resolve(&self, path: IndexPath) -> PathResult {
        PathResult {
            distance: path.cost,
            path: path
                .nodes
                .iter()
                .map(|&v| self.index.node_id(v).to_string())
                .collect(),
            edges: path
                .edges
                .iter()
                .map(|&e| self.index.edge_id(e).to_string())
                .collect(),
        }
    }

    fn path_cost(&self, edges: &[usize]) -> f64 {
        edges.iter().map(|&e| self.index.edge(e).weight).sum()
    }

    fn endpoints(&self, start: &str, end: &str) -> Option<(usize, usize)> {
        Some((self.index.index_of(start)?, self.index.index_of(end)?))
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// Weighted shortest path; unknown or disconnected endpoints are unreachable.
    pub fn shortest_path(&self, start: &str, end: &str) -> PathResult {
        let Some((s, t)) = self.endpoints(start, end) else {
            return PathResult::unreachable();
        };
        if s == t {
            return PathResult::trivial(start);
        }

        let sp = dijkstra(&self.index, s);
        match sp.path_to(t) {
            Some((nodes, edges)) => self.resolve(IndexPath {
                cost: sp.dist[t],
                nodes,
                edges,
            }),
            None => PathResult::unreachable(),
        }
    }

    /// Every simple path from `start` to `end` with at most `max_depth` edges
    /// (default from config), cheapest first.
    pub fn all_paths(&self, start: &str, end: &str, max_depth: Option<usize>) -> Vec<PathResult> {
        let Some((s, t)) = self.endpoints(start, end) else {
            return Vec::new();
        };
        if s == t {
            return vec![PathResult::trivial(start)];
        }
        let max_depth = max_depth.unwrap_or(self.all_paths_max_depth);

        let mut found: Vec<IndexPath> = Vec::new();
        let mut on_path = vec![false; self.index.node_count()];
        let mut nodes = vec![s];
        let mut edges: Vec<usize> = Vec::new();
        let mut cursors = vec![0usize];
        on_path[s] = true;

        while let Some(cursor) = cursors.last_mut() {
            let Some(&u) = nodes.last() else {
                break;
            };
            match self.index.neighbors(u).get(*cursor) {
                Some(entry) => {
                    *cursor += 1;
                    let v = entry.neighbor;
                    let depth = edges.len() + 1;
                    if on_path[v] || depth > max_depth {
                        continue;
                    }
                    if v == t {
                        let mut path_edges = edges.clone();
                        path_edges.push(entry.edge);
                        let mut path_nodes = nodes.clone();
                        path_nodes.push(v);
                        found.push(IndexPath {
                            cost: self.path_cost(&path_edges),
                            nodes: path_nodes,
                            edges: path_edges,
                        });
                    } else if depth < max_depth {
                        on_path[v] = true;
                        nodes.push(v);
                        edges.push(entry.edge);
                        cursors.push(0);
                    }
                }
                None => {
                    cursors.pop();
                    if let Some(v) = nodes.pop() {
                        on_path[v] = false;
                    }
                    edges.pop();
                }
            }
        }

        found.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        found.into_iter().map(|p| self.resolve(p)).collect()
    }

    /// Up to `k` loopless paths in order of increasing cost (Yen's algorithm).
    ///
    /// Returns fewer than `k` paths when no further distinct path exists, and
    /// nothing at all when `end` is unreachable.
    pub fn k_shortest_paths(&self, start: &str, end: &str, k: usize) -> Vec<PathResult> {
        if k == 0 {
            return Vec::new();
        }
        let Some((s, t)) = self.endpoints(start, end) else {
            return Vec::new();
        };
        if s == t {
            return vec![PathResult::trivial(start)];
        }

        let sp = dijkstra(&self.index, s);
        let Some((nodes, edges)) = sp.path_to(t) else {
            return Vec::new();
        };

        let mut accepted = vec![IndexPath {
            cost: sp.dist[t],
            nodes,
            edges,
        }];
        let mut candidates: Vec<IndexPath> = Vec::new();

        while accepted.len() < k {
            let Some(last) = accepted.last().cloned() else {
                break;
            };

            for i in 0..last.edges.len() {
                let spur = last.nodes[i];
                let root_nodes = &last.nodes[..=i];
                let root_edges = &last.edges[..i];

                // Edges leaving the spur node along an accepted path with this root
                let blocked_edges: HashSet<usize> = accepted
                    .iter()
                    .filter(|p| {
                        p.edges.len() > i
                            && p.nodes[..=i] == *root_nodes
                            && p.edges[..i] == *root_edges
                    })
                    .map(|p| p.edges[i])
                    .collect();
                let blocked_nodes: HashSet<usize> = root_nodes[..i].iter().copied().collect();

                let spur_paths = dijkstra_filtered(
                    &self.index,
                    spur,
                    |v| !blocked_nodes.contains(&v),
                    |e| !blocked_edges.contains(&e),
                );
                let Some((spur_nodes, spur_edges)) = spur_paths.path_to(t) else {
                    continue;
                };

                let mut nodes = root_nodes.to_vec();
                nodes.extend_from_slice(&spur_nodes[1..]);
                let mut edges = root_edges.to_vec();
                edges.extend(spur_edges);

                let known = accepted
                    .iter()
                    .chain(candidates.iter())
                    .any(|p| p.edges == edges);
                if !known {
                    candidates.push(IndexPath {
                        cost: self.path_cost(&edges),
                        nodes,
                        edges,
                    });
                }
            }

            let best = candidates
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.cost
                        .total_cmp(&b.cost)
                        .then(a.nodes.len().cmp(&b.nodes.len()))
                        .then_with(|| a.edges.cmp(&b.edges))
                })
                .map(|(i, _)| i);
            match best {
                Some(i) => accepted.push(candidates.swap_remove(i)),
                None => break,
            }
        }

        accepted.into_iter().map(|p| self.resolve(p)).collect()
    }

    /// Nodes (other than `start`) within `max_distance`, nearest first.
    pub fn nodes_within_distance(&self, start: &str, max_distance: f64) -> Vec<NodeDistance> {
        let Some(s) = self.index.index_of(start) else {
            return Vec::new();
        };
        let sp = dijkstra(&self.index, s);

        let mut within: Vec<NodeDistance> = sp
            .dist
            .iter()
            .enumerate()
            .filter(|&(v, &d)| v != s && d.is_finite() && d <= max_distance)
            .map(|(v, &d)| NodeDistance {
                node_id: self.index.node_id(v).to_string(),
                distance: d,
            })
            .collect();
        within.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        within
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Everything reachable from `node_id`, or `None` for an unknown node.
    ///
    /// Nodes are listed in DFS preorder, edges in the order they are first crossed.
    pub fn connected_component_of(&self, node_id: &str) -> Option<ConnectedComponent> {
        let root = self.index.index_of(node_id)?;
        let mut visited = vec![false; self.index.node_count()];
        let mut seen_edges = HashSet::new();
        let mut nodes = vec![root];
        let mut edges = Vec::new();
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        visited[root] = true;

        while let Some(frame) = stack.last_mut() {
            let (u, cursor) = *frame;
            match self.index.neighbors(u).get(cursor) {
                Some(entry) => {
                    frame.1 += 1;
                    if seen_edges.insert(entry.edge) {
                        edges.push(self.index.edge_id(entry.edge).to_string());
                    }
                    let v = entry.neighbor;
                    if !visited[v] {
                        visited[v] = true;
                        nodes.push(v);
                        stack.push((v, 0));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }

        Some(ConnectedComponent {
            size: nodes.len(),
            nodes: nodes
                .into_iter()
                .map(|v| self.index.node_id(v).to_string())
                .collect(),
            edges,
        })
    }

    /// Full partition into components, in discovery order.
    pub fn connected_components(&self) -> Vec<ComponentInfo> {
        let components = self.index.components();
        let largest = components.iter().map(Vec::len).max().unwrap_or(0);

        components
            .into_iter()
            .enumerate()
            .map(|(id, members)| ComponentInfo {
                id,
                size: members.len(),
                is_main: members.len() == largest,
                members: members
                    .into_iter()
                    .map(|v| self.index.node_id(v).to_string())
                    .collect(),
            })
            .collect()
    }

    // ========================================================================
    // Eccentricity
    // ========================================================================

    fn eccentricities(&self) -> Vec<f64> {
        (0..self.index.node_count())
            .map(|v| {
                dijkstra(&self.index, v)
                    .dist
                    .iter()
                    .enumerate()
                    .filter(|&(u, d)| u != v && d.is_finite())
                    .map(|(_, &d)| d)
                    .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))))
                    .unwrap_or(f64::INFINITY)
            })
            .collect()
    }

    /// Largest finite distance from each node; `∞` when nothing else is reachable.
    pub fn eccentricity(&self) -> HashMap<String, f64> {
        self.eccentricities()
            .into_iter()
            .enumerate()
            .map(|(v, e)| (self.index.node_id(v).to_string(), e))
            .collect()
    }

    /// Eccentricity of a single node.
    pub fn eccentricity_of(&self, node_id: &str) -> Option<f64> {
        let v = self.index.index_of(node_id)?;
        let ecc = dijkstra(&self.index, v)
            .dist
            .iter()
            .enumerate()
            .filter(|&(u, d)| u != v && d.is_finite())
            .map(|(_, &d)| d)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(if ecc.is_finite() { ecc } else { f64::INFINITY })
    }

    fn extremes(eccentricities: &[f64]) -> DiameterRadius {
        let finite = eccentricities.iter().copied().filter(|e| e.is_finite());
        let (diameter, radius) = finite.fold(None, |acc: Option<(f64, f64)>, e| {
            Some(acc.map_or((e, e), |(max, min)| (max.max(e), min.min(e))))
        })
        .unwrap_or((0.0, 0.0));
        DiameterRadius { diameter, radius }
    }

    /// Max / min over finite eccentricities; both 0 when none is finite.
    pub fn diameter_and_radius(&self) -> DiameterRadius {
        Self::extremes(&self.eccentricities())
    }

    /// Nodes whose eccentricity equals the radius (center) or diameter (periphery).
    pub fn center_and_periphery(&self) -> CenterPeriphery {
        let ecc = self.eccentricities();
        let DiameterRadius { diameter, radius } = Self::extremes(&ecc);
        let select = |target: f64| -> Vec<String> {
            ecc.iter()
                .enumerate()
                .filter(|(_, e)| e.is_finite() && (*e - target).abs() < ECCENTRICITY_EPSILON)
                .map(|(v, _)| self.index.node_id(v).to_string())
                .collect()
        };
        CenterPeriphery {
            center: select(radius),
            periphery: select(diameter),
        }
    }

    // ========================================================================
    // Bridges and articulation points (Tarjan low-link)
    // ========================================================================

    fn low_link(&self) -> LowLink {
        let n = self.index.node_count();
        let mut disc = vec![usize::MAX; n];
        let mut low = vec![0usize; n];
        let mut articulation = vec![false; n];
        let mut bridges = Vec::new();
        let mut timer = 0usize;

        for root in 0..n {
            if disc[root] != usize::MAX {
                continue;
            }
            disc[root] = timer;
            low[root] = timer;
            timer += 1;
            let mut root_children = 0usize;
            let mut stack = vec![LowLinkFrame {
                node: root,
                parent_edge: None,
                cursor: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let u = frame.node;
                match self.index.neighbors(u).get(frame.cursor) {
                    Some(entry) => {
                        frame.cursor += 1;
                        let v = entry.neighbor;
                        if v == u || Some(entry.edge) == frame.parent_edge {
                            continue;
                        }
                        if disc[v] == usize::MAX {
                            disc[v] = timer;
                            low[v] = timer;
                            timer += 1;
                            if u == root {
                                root_children += 1;
                            }
                            stack.push(LowLinkFrame {
                                node: v,
                                parent_edge: Some(entry.edge),
                                cursor: 0,
                            });
                        } else {
                            low[u] = low[u].min(disc[v]);
                        }
                    }
                    None => {
                        let parent_edge = frame.parent_edge;
                        stack.pop();
                        if let (Some(parent), Some(edge)) = (stack.last(), parent_edge) {
                            let p = parent.node;
                            low[p] = low[p].min(low[u]);
                            if low[u] > disc[p] {
                                bridges.push(edge);
                            }
                            if p != root && low[u] >= disc[p] {
                                articulation[p] = true;
                            }
                        }
                    }
                }
            }

            if root_children > 1 {
                articulation[root] = true;
            }
        }

        bridges.sort_unstable();
        LowLink {
            bridges,
            articulation,
        }
    }

    /// Edges whose removal disconnects their endpoints, in input order.
    pub fn bridges(&self) -> Vec<Bridge> {
        self.low_link()
            .bridges
            .into_iter()
            .map(|e| {
                let edge = self.index.edge(e);
                Bridge {
                    edge_id: edge.id.clone(),
                    source_id: edge.source_id.clone(),
                    target_id: edge.target_id.clone(),
                }
            })
            .collect()
    }

    /// Nodes whose removal splits their component, in input order.
    pub fn articulation_points(&self) -> Vec<String> {
        self.low_link()
            .articulation
            .iter()
            .enumerate()
            .filter(|&(_, &is_cut)| is_cut)
            .map(|(v, _)| self.index.node_id(v).to_string())
            .collect()
    }

    // ========================================================================
    // Summary
    // ========================================================================

    pub fn summary(&self) -> GraphSummary {
        let n = self.index.node_count();
        let m = self.index.edge_count();
        let components = self.index.components();
        let low_link = self.low_link();
        let DiameterRadius { diameter, radius } = Self::extremes(&self.eccentricities());

        let density = if n < 2 {
            0.0
        } else {
            m as f64 / (n * (n - 1) / 2) as f64
        };

        GraphSummary {
            node_count: n,
            edge_count: m,
            component_count: components.len(),
            largest_component_size: components.iter().map(Vec::len).max().unwrap_or(0),
            bridge_count: low_link.bridges.len(),
            articulation_point_count: low_link.articulation.iter().filter(|&&a| a).count(),
            diameter,
            radius,
            density,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::models::{Edge, Node};
    use crate::test_helpers::{chain, cycle, nodes, star, two_triangles};

    fn engine(fixture: (Vec<Node>, Vec<Edge>)) -> PathfindingEngine {
        let (n, e) = fixture;
        PathfindingEngine::new(Arc::new(GraphIndex::build(&n, &e)), 10)
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    // --- Shortest path ---

    #[test]
    fn test_shortest_path_chain() {
        let pf = engine(chain(&["A", "B", "C", "D"]));
        let result = pf.shortest_path("A", "D");
        assert_eq!(result.distance, 3.0);
        assert_eq!(result.path, vec!["A", "B", "C", "D"]);
        assert_eq!(result.edges, vec!["AB", "BC", "CD"]);
    }

    #[test]
    fn test_shortest_path_same_node() {
        let pf = engine(chain(&["A", "B"]));
        let result = pf.shortest_path("A", "A");
        assert_eq!(result.distance, 0.0);
        assert_eq!(result.path, vec!["A"]);
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_shortest_path_across_components_is_unreachable() {
        let pf = engine(two_triangles());
        let result = pf.shortest_path("a1", "b1");
        assert!(result.distance.is_infinite());
        assert!(result.path.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_shortest_path_unknown_node() {
        let pf = engine(chain(&["A", "B"]));
        assert!(!pf.shortest_path("A", "missing").is_reachable());
        assert!(!pf.shortest_path("missing", "missing").is_reachable());
    }

    // --- All paths ---

    #[test]
    fn test_all_paths_in_cycle() {
        let pf = engine(cycle(&["A", "B", "C", "D"]));
        let paths = pf.all_paths("A", "C", None);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.distance == 2.0));
        let mut routes: Vec<Vec<String>> = paths.into_iter().map(|p| p.path).collect();
        routes.sort();
        assert_eq!(routes, vec![vec!["A", "B", "C"], vec!["A", "D", "C"]]);
    }

    #[test]
    fn test_all_paths_depth_cutoff() {
        let mut fixture = chain(&["A", "B", "C", "D"]);
        fixture.1.push(Edge::new("AD", "A", "D", 10.0));
        let pf = engine(fixture);

        let paths = pf.all_paths("A", "D", None);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].edges, vec!["AB", "BC", "CD"]);
        assert_eq!(paths[1].edges, vec!["AD"]);

        let shallow = pf.all_paths("A", "D", Some(2));
        assert_eq!(shallow.len(), 1);
        assert_eq!(shallow[0].edges, vec!["AD"]);
    }

    // --- k shortest paths ---

    #[test]
    fn test_k_shortest_paths_distinct_and_ordered() {
        let n = nodes(&["A", "B", "C", "D"]);
        let e = vec![
            Edge::new("AB", "A", "B", 1.0),
            Edge::new("BD", "B", "D", 1.0),
            Edge::new("AC", "A", "C", 1.0),
            Edge::new("CD", "C", "D", 2.0),
            Edge::new("AD", "A", "D", 5.0),
        ];
        let pf = engine((n, e));
        let paths = pf.k_shortest_paths("A", "D", 5);

        // Only three simple routes exist between A and D
        let routes: Vec<Vec<&str>> = paths
            .iter()
            .map(|p| p.edges.iter().map(String::as_str).collect())
            .collect();
        assert_eq!(routes, vec![vec!["AB", "BD"], vec!["AC", "CD"], vec!["AD"]]);
        let costs: Vec<f64> = paths.iter().map(|p| p.distance).collect();
        assert_eq!(costs, vec![2.0, 3.0, 5.0]);
        let unique: HashSet<&Vec<String>> = paths.iter().map(|p| &p.edges).collect();
        assert_eq!(unique.len(), paths.len());
    }

    #[test]
    fn test_k_shortest_paths_fewer_than_k() {
        let pf = engine(chain(&["A", "B", "C"]));
        let paths = pf.k_shortest_paths("A", "C", 3);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].path, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_k_shortest_paths_unreachable_and_zero() {
        let pf = engine(two_triangles());
        assert!(pf.k_shortest_paths("a1", "b1", 3).is_empty());
        assert!(pf.k_shortest_paths("a1", "a2", 0).is_empty());
    }

    #[test]
    fn test_k_shortest_paths_parallel_edges() {
        let n = nodes(&["A", "B"]);
        let e = vec![Edge::new("e1", "A", "B", 1.0), Edge::new("e2", "A", "B", 2.0)];
        let pf = engine((n, e));
        let paths = pf.k_shortest_paths("A", "B", 3);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].edges, vec!["e1"]);
        assert_eq!(paths[1].edges, vec!["e2"]);
    }

    // --- Distances ---

    #[test]
    fn test_nodes_within_distance() {
        let pf = engine(chain(&["A", "B", "C", "D"]));
        let near = pf.nodes_within_distance("A", 2.0);
        let ids: Vec<&str> = near.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C"]);
        assert_eq!(near[1].distance, 2.0);
        assert!(pf.nodes_within_distance("missing", 5.0).is_empty());
    }

    #[test]
    fn test_eccentricity_diameter_radius() {
        let pf = engine(chain(&["A", "B", "C", "D", "E"]));
        let ecc = pf.eccentricity();
        assert_eq!(ecc["A"], 4.0);
        assert_eq!(ecc["C"], 2.0);
        assert_eq!(pf.eccentricity_of("B"), Some(3.0));
        assert_eq!(pf.eccentricity_of("missing"), None);

        let dr = pf.diameter_and_radius();
        assert_eq!(dr.diameter, 4.0);
        assert_eq!(dr.radius, 2.0);

        let cp = pf.center_and_periphery();
        assert_eq!(cp.center, vec!["C"]);
        assert_eq!(cp.periphery, vec!["A", "E"]);
    }

    #[test]
    fn test_isolated_node_has_infinite_eccentricity() {
        let mut fixture = chain(&["A", "B"]);
        fixture.0.push(Node::new("solo"));
        let pf = engine(fixture);
        assert!(pf.eccentricity()["solo"].is_infinite());

        let dr = pf.diameter_and_radius();
        assert_eq!(dr.diameter, 1.0);
        assert_eq!(dr.radius, 1.0);
        assert!(!pf.center_and_periphery().center.contains(&"solo".to_string()));
    }

    #[test]
    fn test_diameter_of_edgeless_graph_is_zero() {
        let pf = engine((nodes(&["A", "B"]), vec![]));
        let dr = pf.diameter_and_radius();
        assert_eq!(dr.diameter, 0.0);
        assert_eq!(dr.radius, 0.0);
    }

    // --- Bridges / articulation points ---

    #[test]
    fn test_chain_bridges_and_articulation_points() {
        let pf = engine(chain(&["A", "B", "C", "D"]));
        let bridges: Vec<String> = pf.bridges().into_iter().map(|b| b.edge_id).collect();
        assert_eq!(bridges, vec!["AB", "BC", "CD"]);
        assert_eq!(pf.articulation_points(), vec!["B", "C"]);
    }

    #[test]
    fn test_cycle_has_no_bridges_or_articulation_points() {
        for len in 3..7 {
            let ids: Vec<String> = (0..len).map(|i| format!("n{i}")).collect();
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let pf = engine(cycle(&refs));
            assert!(pf.bridges().is_empty(), "cycle of {len} has a bridge");
            assert!(pf.articulation_points().is_empty());
        }
    }

    #[test]
    fn test_star_root_is_articulation_point() {
        let pf = engine(star(3));
        assert_eq!(pf.articulation_points(), vec!["hub"]);
        assert_eq!(pf.bridges().len(), 3);
    }

    #[test]
    fn test_parallel_edges_are_not_bridges() {
        let n = nodes(&["A", "B", "C"]);
        let e = vec![
            Edge::unweighted("ab1", "A", "B"),
            Edge::unweighted("ab2", "A", "B"),
            Edge::unweighted("bc", "B", "C"),
        ];
        let pf = engine((n, e));
        let bridges: Vec<String> = pf.bridges().into_iter().map(|b| b.edge_id).collect();
        assert_eq!(bridges, vec!["bc"]);
        assert_eq!(pf.articulation_points(), vec!["B"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let ids: Vec<String> = (0..20_000).map(|i| format!("n{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let pf = engine(chain(&refs));
        assert_eq!(pf.bridges().len(), 19_999);
        assert_eq!(pf.articulation_points().len(), 19_998);
        assert_eq!(pf.connected_component_of("n0").unwrap().size, 20_000);
    }

    // --- Components ---

    #[test]
    fn test_connected_components_two_triangles() {
        let pf = engine(two_triangles());
        let components = pf.connected_components();
        assert_eq!(components.len(), 2);
        assert!(components.iter().all(|c| c.size == 3 && c.is_main));
        assert_eq!(sorted(components[0].members.clone()), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_connected_component_of() {
        let mut fixture = chain(&["A", "B", "C"]);
        fixture.0.push(Node::new("solo"));
        let pf = engine(fixture);

        let component = pf.connected_component_of("B").unwrap();
        assert_eq!(component.size, 3);
        assert_eq!(sorted(component.nodes), vec!["A", "B", "C"]);
        assert_eq!(sorted(component.edges), vec!["AB", "BC"]);

        let solo = pf.connected_component_of("solo").unwrap();
        assert_eq!(solo.nodes, vec!["solo"]);
        assert!(solo.edges.is_empty());
        assert!(pf.connected_component_of("missing").is_none());
    }

    // --- Summary ---

    #[test]
    fn test_summary_chain() {
        let pf = engine(chain(&["A", "B", "C", "D"]));
        let summary = pf.summary();
        assert_eq!(summary.node_count, 4);
        assert_eq!(summary.edge_count, 3);
        assert_eq!(summary.component_count, 1);
        assert_eq!(summary.largest_component_size, 4);
        assert_eq!(summary.bridge_count, 3);
        assert_eq!(summary.articulation_point_count, 2);
        assert_eq!(summary.diameter, 3.0);
        assert_eq!(summary.radius, 2.0);
        assert!((summary.density - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_summary_empty_graph() {
        let pf = engine((vec![], vec![]));
        let summary = pf.summary();
        assert_eq!(summary.node_count, 0);
        assert_eq!(summary.component_count, 0);
        assert_eq!(summary.density, 0.0);
    }
}
