//! Community detection.
//!
//! Single-level Louvain, asynchronous label propagation, weighted k-core
//! peeling and a component baseline. Edge weights are read directly as
//! connection strength here (unlike eigenvector/PageRank centrality).

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::index::GraphIndex;
use super::models::{
    Assignment, ComponentClustering, KCoreResult, LabelPropagationResult, LouvainResult,
};

/// Label weights closer than this count as a tie.
const WEIGHT_EPSILON: f64 = 1e-12;

/// Slack when comparing residual degrees against the current core level.
const CORE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ClusteringEngine {
    index: Arc<GraphIndex>,
}

impl ClusteringEngine {
    pub fn new(index: Arc<GraphIndex>) -> Self {
        Self { index }
    }

    /// Renumber raw labels to `0..count` in order of first appearance.
    fn relabel(&self, raw: &[usize]) -> (Assignment, usize) {
        let mut mapping: HashMap<usize, usize> = HashMap::new();
        let mut assignment = Assignment::with_capacity(raw.len());
        for (v, &label) in raw.iter().enumerate() {
            let next = mapping.len();
            let community = *mapping.entry(label).or_insert(next);
            assignment.insert(self.index.node_id(v).to_string(), community);
        }
        (assignment, mapping.len())
    }

    // ========================================================================
    // Modularity
    // ========================================================================

    /// `Q = Σ_c [ internal_c / W − γ·(degree_c / 2W)² ]`, every edge counted once.
    fn modularity_raw(&self, community: &[usize], resolution: f64) -> f64 {
        let w = self.index.total_weight();
        if w <= 0.0 {
            return 0.0;
        }

        let mut internal: HashMap<usize, f64> = HashMap::new();
        let mut degree: HashMap<usize, f64> = HashMap::new();
        for (v, &c) in community.iter().enumerate() {
            *degree.entry(c).or_insert(0.0) += self.index.weighted_degree(v);
        }
        for e in 0..self.index.edge_count() {
            let (a, b) = self.index.endpoints(e);
            if community[a] == community[b] {
                *internal.entry(community[a]).or_insert(0.0) += self.index.edge(e).weight;
            }
        }

        degree
            .iter()
            .map(|(c, &deg)| {
                let inside = internal.get(c).copied().unwrap_or(0.0);
                inside / w - resolution * (deg / (2.0 * w)).powi(2)
            })
            .sum()
    }

    /// Modularity of an arbitrary assignment. Nodes missing from it count as singletons.
    pub fn modularity(&self, communities: &Assignment, resolution: f64) -> f64 {
        let n = self.index.node_count();
        let offset = communities.values().max().map_or(0, |m| m + 1);
        let raw: Vec<usize> = (0..n)
            .map(|v| {
                communities
                    .get(self.index.node_id(v))
                    .copied()
                    .unwrap_or(offset + v)
            })
            .collect();
        self.modularity_raw(&raw, resolution)
    }

    // ========================================================================
    // Louvain (single level)
    // ========================================================================

    /// Greedy local moves until a sweep changes nothing or `max_iterations` sweeps ran.
    ///
    /// Each node moves to the neighbouring community with the largest strictly
    /// positive gain
    /// `ΔQ = (k_in_new − k_in_old)/W − γ·k_i·(Σ_new − Σ_old + k_i) / 2W²`;
    /// equal gains keep the community met first in adjacency order.
    pub fn louvain(&self, resolution: f64, max_iterations: usize) -> LouvainResult {
        let start = std::time::Instant::now();
        let n = self.index.node_count();
        let w = self.index.total_weight();
        let mut community: Vec<usize> = (0..n).collect();
        let mut sigma_tot: Vec<f64> = (0..n).map(|v| self.index.weighted_degree(v)).collect();
        let mut iterations = 0;

        if w > 0.0 {
            let w2 = 2.0 * w * w;
            // Reused per node: community → weight from the node into it, in first-seen order
            let mut links: Vec<(usize, f64)> = Vec::new();

            while iterations < max_iterations {
                iterations += 1;
                let mut moved = false;

                for v in 0..n {
                    let current = community[v];
                    let k_i = self.index.weighted_degree(v);

                    links.clear();
                    for entry in self.index.neighbors(v) {
                        if entry.neighbor == v {
                            continue;
                        }
                        let c = community[entry.neighbor];
                        match links.iter_mut().find(|(lc, _)| *lc == c) {
                            Some(link) => link.1 += entry.weight,
                            None => links.push((c, entry.weight)),
                        }
                    }

                    let k_in_old = links
                        .iter()
                        .find(|(c, _)| *c == current)
                        .map_or(0.0, |(_, weight)| *weight);
                    let sigma_old = sigma_tot[current];

                    let mut best: Option<(usize, f64)> = None;
                    for &(c, k_in_new) in &links {
                        if c == current {
                            continue;
                        }
                        let gain = (k_in_new - k_in_old) / w
                            - resolution * k_i * (sigma_tot[c] - sigma_old + k_i) / w2;
                        if gain > 0.0 && best.map_or(true, |(_, g)| gain > g) {
                            best = Some((c, gain));
                        }
                    }

                    if let Some((target, _)) = best {
                        sigma_tot[current] -= k_i;
                        sigma_tot[target] += k_i;
                        community[v] = target;
                        moved = true;
                    }
                }

                if !moved {
                    break;
                }
            }
        }

        let modularity = self.modularity_raw(&community, resolution);
        let (communities, community_count) = self.relabel(&community);
        tracing::debug!(
            "Louvain: {} communities, modularity {:.4}, {} sweep(s) in {:?}",
            community_count,
            modularity,
            iterations,
            start.elapsed()
        );

        LouvainResult {
            communities,
            modularity,
            community_count,
            iterations,
        }
    }

    // ========================================================================
    // Label propagation
    // ========================================================================

    /// Asynchronous label propagation in random visiting order.
    ///
    /// A node adopts the label with the largest summed edge weight among its
    /// neighbours. It keeps its own label when that label is among the
    /// heaviest; other ties are broken by coin flip. Pass a `seed` for
    /// reproducible runs.
    pub fn label_propagation(
        &self,
        max_iterations: usize,
        seed: Option<u64>,
    ) -> LabelPropagationResult {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let n = self.index.node_count();
        let mut labels: Vec<usize> = (0..n).collect();
        let mut order: Vec<usize> = (0..n).collect();
        let mut weights: Vec<(usize, f64)> = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < max_iterations {
            iterations += 1;
            order.shuffle(&mut rng);
            let mut changed = false;

            for &v in &order {
                weights.clear();
                for entry in self.index.neighbors(v) {
                    if entry.neighbor == v {
                        continue;
                    }
                    let label = labels[entry.neighbor];
                    match weights.iter_mut().find(|(l, _)| *l == label) {
                        Some(slot) => slot.1 += entry.weight,
                        None => weights.push((label, entry.weight)),
                    }
                }
                if weights.is_empty() {
                    continue;
                }

                let max = weights
                    .iter()
                    .map(|(_, weight)| *weight)
                    .fold(f64::NEG_INFINITY, f64::max);
                let is_top = |weight: f64| (max - weight).abs() <= WEIGHT_EPSILON;

                let current = labels[v];
                if weights.iter().any(|&(l, weight)| l == current && is_top(weight)) {
                    continue;
                }

                let mut chosen: Option<usize> = None;
                for &(label, weight) in &weights {
                    if !is_top(weight) {
                        continue;
                    }
                    chosen = match chosen {
                        None => Some(label),
                        Some(kept) if rng.gen_bool(0.5) => Some(kept),
                        Some(_) => Some(label),
                    };
                }

                if let Some(label) = chosen {
                    labels[v] = label;
                    changed = true;
                }
            }

            if !changed {
                converged = true;
                break;
            }
        }

        let (communities, community_count) = self.relabel(&labels);
        tracing::debug!(
            "Label propagation: {} communities after {} round(s), converged={}",
            community_count,
            iterations,
            converged
        );

        LabelPropagationResult {
            communities,
            community_count,
            iterations,
            converged,
        }
    }

    // ========================================================================
    // k-core
    // ========================================================================

    /// Weighted k-core peeling.
    ///
    /// At level `k`, nodes whose residual weighted degree is at most `k` are
    /// removed with core number `k` and their weight is subtracted from their
    /// neighbours, until no such node remains; then `k` advances. Levels where
    /// nothing could be peeled are skipped in one step. The level is tracked as
    /// an `f64` and saturates into the `usize` core number.
    pub fn k_core_decomposition(&self) -> KCoreResult {
        let n = self.index.node_count();
        let mut residual: Vec<f64> = (0..n).map(|v| self.index.weighted_degree(v)).collect();
        let mut core = vec![0usize; n];
        let mut removed = vec![false; n];
        let mut remaining = n;
        let mut level = 0.0_f64;

        while remaining > 0 {
            let mut stack: Vec<usize> = (0..n)
                .filter(|&v| !removed[v] && residual[v] <= level + CORE_EPSILON)
                .collect();

            if stack.is_empty() {
                let lowest = (0..n)
                    .filter(|&v| !removed[v])
                    .map(|v| residual[v])
                    .fold(f64::INFINITY, f64::min);
                level = (lowest - CORE_EPSILON).ceil().max(level + 1.0);
                stack = (0..n)
                    .filter(|&v| !removed[v] && residual[v] <= level + CORE_EPSILON)
                    .collect();
                // Residuals that never compare (NaN) all land on this level
                if stack.is_empty() {
                    stack = (0..n).filter(|&v| !removed[v]).collect();
                }
            }

            let k = level as usize;
            for &v in &stack {
                removed[v] = true;
            }
            while let Some(v) = stack.pop() {
                core[v] = k;
                remaining -= 1;
                for entry in self.index.neighbors(v) {
                    let u = entry.neighbor;
                    if u == v || removed[u] {
                        continue;
                    }
                    residual[u] -= entry.weight;
                    if residual[u] <= level + CORE_EPSILON {
                        removed[u] = true;
                        stack.push(u);
                    }
                }
            }
        }

        let max_core = core.iter().copied().max().unwrap_or(0);
        let core_numbers = core
            .iter()
            .enumerate()
            .map(|(v, &c)| (self.index.node_id(v).to_string(), c))
            .collect();

        KCoreResult {
            core_numbers,
            max_core,
        }
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Baseline: one community per connected component.
    pub fn connected_components_clustering(&self) -> ComponentClustering {
        let (labels, count) = self.index.component_labels();
        let communities = labels
            .iter()
            .enumerate()
            .map(|(v, &c)| (self.index.node_id(v).to_string(), c))
            .collect();
        ComponentClustering {
            communities,
            community_count: count,
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
    use crate::test_helpers::{chain, complete, nodes, star, two_cliques, two_triangles};

    fn engine(fixture: (Vec<Node>, Vec<Edge>)) -> ClusteringEngine {
        let (n, e) = fixture;
        ClusteringEngine::new(Arc::new(GraphIndex::build(&n, &e)))
    }

    fn same(assignment: &Assignment, a: &str, b: &str) -> bool {
        assignment[a] == assignment[b]
    }

    // --- Louvain ---

    #[test]
    fn test_louvain_two_triangles_match_components() {
        let clustering = engine(two_triangles());
        let result = clustering.louvain(1.0, 100);

        assert_eq!(result.community_count, 2);
        assert!(same(&result.communities, "a1", "a2"));
        assert!(same(&result.communities, "a1", "a3"));
        assert!(same(&result.communities, "b1", "b3"));
        assert!(!same(&result.communities, "a1", "b1"));
        assert!((result.modularity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_louvain_two_cliques_split_at_bridge() {
        let clustering = engine(two_cliques(4));
        let result = clustering.louvain(1.0, 100);

        assert_eq!(result.community_count, 2);
        for i in 1..4 {
            assert!(same(&result.communities, "a_0", &format!("a_{i}")));
            assert!(same(&result.communities, "b_0", &format!("b_{i}")));
        }
        assert!(!same(&result.communities, "a_0", "b_0"));
        assert!(result.modularity > 0.0);
    }

    #[test]
    fn test_louvain_edgeless_graph() {
        let clustering = engine((nodes(&["A", "B", "C"]), vec![]));
        let result = clustering.louvain(1.0, 100);
        assert_eq!(result.community_count, 3);
        assert_eq!(result.modularity, 0.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_louvain_labels_are_contiguous() {
        let clustering = engine(two_cliques(5));
        let result = clustering.louvain(1.0, 100);
        let mut labels: Vec<usize> = result.communities.values().copied().collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels, (0..result.community_count).collect::<Vec<_>>());
    }

    #[test]
    fn test_louvain_respects_iteration_cap() {
        let clustering = engine(two_cliques(4));
        let result = clustering.louvain(1.0, 1);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_modularity_of_singletons_is_negative() {
        let clustering = engine(complete(4));
        let singletons: Assignment = (0..4).map(|i| (format!("k{i}"), i)).collect();
        assert!(clustering.modularity(&singletons, 1.0) < 0.0);

        let whole: Assignment = (0..4).map(|i| (format!("k{i}"), 0)).collect();
        assert!(clustering.modularity(&whole, 1.0).abs() < 1e-12);
    }

    // --- Label propagation ---

    #[test]
    fn test_label_propagation_respects_components() {
        let clustering = engine(two_triangles());
        for seed in 0..10 {
            let result = clustering.label_propagation(100, Some(seed));
            assert!(result.converged);
            assert_eq!(result.community_count, 2);
            assert!(same(&result.communities, "a1", "a2"));
            assert!(same(&result.communities, "a2", "a3"));
            assert!(same(&result.communities, "b1", "b2"));
            assert!(!same(&result.communities, "a1", "b1"));
        }
    }

    #[test]
    fn test_label_propagation_never_merges_components() {
        let mut fixture = two_cliques(4);
        fixture.1.retain(|e| e.id != "bridge");
        fixture.0.push(Node::new("solo"));
        let clustering = engine(fixture);

        let result = clustering.label_propagation(100, None);
        assert!(!same(&result.communities, "a_0", "b_0"));
        assert!(!same(&result.communities, "a_0", "solo"));
        assert!(!same(&result.communities, "b_0", "solo"));
        assert!(result.iterations <= 100);
    }

    #[test]
    fn test_label_propagation_seed_is_reproducible() {
        let clustering = engine(two_cliques(5));
        let first = clustering.label_propagation(100, Some(42));
        let second = clustering.label_propagation(100, Some(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_label_propagation_star_collapses() {
        let clustering = engine(star(6));
        let result = clustering.label_propagation(100, Some(7));
        assert_eq!(result.community_count, 1);
    }

    // --- k-core ---

    #[test]
    fn test_k_core_complete_graph() {
        for n in 2..7 {
            let clustering = engine(complete(n));
            let result = clustering.k_core_decomposition();
            assert!(result.core_numbers.values().all(|&c| c == n - 1));
            assert_eq!(result.max_core, n - 1);
        }
    }

    #[test]
    fn test_k_core_chain_and_isolated() {
        let mut fixture = chain(&["A", "B", "C"]);
        fixture.0.push(Node::new("solo"));
        let clustering = engine(fixture);
        let result = clustering.k_core_decomposition();

        assert_eq!(result.core_numbers["solo"], 0);
        assert_eq!(result.core_numbers["A"], 1);
        assert_eq!(result.core_numbers["B"], 1);
        assert_eq!(result.core(1), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_k_core_clique_with_tail() {
        let mut fixture = complete(4);
        fixture.0.push(Node::new("tail"));
        fixture.1.push(Edge::unweighted("k0-tail", "k0", "tail"));
        let clustering = engine(fixture);
        let result = clustering.k_core_decomposition();

        assert_eq!(result.core_numbers["tail"], 1);
        assert_eq!(result.core_numbers["k0"], 3);
        assert_eq!(result.max_core, 3);
        assert_eq!(result.core(3).len(), 4);
    }

    #[test]
    fn test_k_core_uses_weights() {
        let n = nodes(&["A", "B"]);
        let e = vec![Edge::new("ab", "A", "B", 5.0)];
        let clustering = engine((n, e));
        let result = clustering.k_core_decomposition();
        assert_eq!(result.core_numbers["A"], 5);
        assert_eq!(result.core_numbers["B"], 5);
    }

    #[test]
    fn test_k_core_huge_weight_terminates() {
        let n = nodes(&["A", "B", "C"]);
        let e = vec![
            Edge::new("ab", "A", "B", 1e20),
            Edge::new("bc", "B", "C", 1.0),
        ];
        let clustering = engine((n, e));
        let result = clustering.k_core_decomposition();

        assert_eq!(result.core_numbers["C"], 1);
        assert_eq!(result.core_numbers["A"], usize::MAX);
        assert_eq!(result.core_numbers["B"], usize::MAX);
        assert_eq!(result.max_core, usize::MAX);
    }

    // --- Components ---

    #[test]
    fn test_components_clustering() {
        let clustering = engine(two_triangles());
        let result = clustering.connected_components_clustering();
        assert_eq!(result.community_count, 2);
        assert_eq!(result.communities["a1"], 0);
        assert_eq!(result.communities["b2"], 1);
        assert_eq!(result.community_infos()[0].size, 3);
    }
}
