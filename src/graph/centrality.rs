//! Centrality measures, computed independently per connected component.
//!
//! - **Degree** — weighted degree over `component size − 1`
//! - **Betweenness** — Brandes' algorithm with weighted shortest paths (unnormalised)
//! - **Closeness** — summed Dijkstra distances scaled into `[0, 1]`
//! - **Eigenvector** — power iteration on the inverse-weight adjacency
//! - **PageRank** — inverse-weight transition probabilities with damping
//!
//! Eigenvector and PageRank treat a *smaller* weight as a *stronger* link and
//! use `1 / weight` as the link strength. Degree, betweenness and closeness
//! read the weight directly as a degree contribution or traversal cost.

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use super::index::GraphIndex;
use super::models::{to_fixed, Centralities, CentralityKind, ScoreMap};
use super::traversal::{dijkstra, HeapEntry};
use crate::config::AnalysisConfig;

/// Distances closer than this count as equal when accumulating path counts.
const DISTANCE_EPSILON: f64 = 1e-10;

/// Computes centrality measures over a shared [`GraphIndex`].
#[derive(Debug, Clone)]
pub struct CentralityCalculator {
    index: Arc<GraphIndex>,
    config: AnalysisConfig,
}

/// Component membership with each node's position inside its component.
struct ComponentLayout {
    components: Vec<Vec<usize>>,
    position: Vec<usize>,
}

impl CentralityCalculator {
    pub fn new(index: Arc<GraphIndex>, config: AnalysisConfig) -> Self {
        Self { index, config }
    }

    fn layout(&self) -> ComponentLayout {
        let components = self.index.components();
        let mut position = vec![0; self.index.node_count()];
        for members in &components {
            for (i, &v) in members.iter().enumerate() {
                position[v] = i;
            }
        }
        ComponentLayout {
            components,
            position,
        }
    }

    fn to_score_map(&self, scores: &[f64]) -> ScoreMap {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (self.index.node_id(i).to_string(), to_fixed(s)))
            .collect()
    }

    fn to_raw_map(&self, scores: &[f64]) -> HashMap<String, f64> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (self.index.node_id(i).to_string(), s))
            .collect()
    }

    // ========================================================================
    // Public surface
    // ========================================================================

    /// Raw (unformatted) scores for one measure, keyed by node id.
    pub fn scores(&self, kind: CentralityKind) -> HashMap<String, f64> {
        self.to_raw_map(&self.raw(kind))
    }

    /// Formatted scores for one measure.
    pub fn compute(&self, kind: CentralityKind) -> ScoreMap {
        self.to_score_map(&self.raw(kind))
    }

    /// All five measures.
    pub fn all(&self) -> Centralities {
        let start = std::time::Instant::now();
        let centralities = Centralities {
            degree: self.degree_centrality(),
            betweenness: self.betweenness_centrality(),
            closeness: self.closeness_centrality(),
            eigenvector: self.eigenvector_centrality(),
            pagerank: self.pagerank(),
        };
        tracing::debug!(
            "Computed all centralities for {} nodes in {:?}",
            self.index.node_count(),
            start.elapsed()
        );
        centralities
    }

    pub fn degree_centrality(&self) -> ScoreMap {
        self.compute(CentralityKind::Degree)
    }

    pub fn betweenness_centrality(&self) -> ScoreMap {
        self.compute(CentralityKind::Betweenness)
    }

    pub fn closeness_centrality(&self) -> ScoreMap {
        self.compute(CentralityKind::Closeness)
    }

    pub fn eigenvector_centrality(&self) -> ScoreMap {
        self.compute(CentralityKind::Eigenvector)
    }

    pub fn pagerank(&self) -> ScoreMap {
        self.compute(CentralityKind::Pagerank)
    }

    fn raw(&self, kind: CentralityKind) -> Vec<f64> {
        let layout = self.layout();
        match kind {
            CentralityKind::Degree => self.degree_raw(&layout),
            CentralityKind::Betweenness => self.betweenness_raw(&layout),
            CentralityKind::Closeness => self.closeness_raw(&layout),
            CentralityKind::Eigenvector => self.eigenvector_raw(&layout),
            CentralityKind::Pagerank => self.pagerank_raw(&layout),
        }
    }

    // ========================================================================
    // Degree
    // ========================================================================

    fn degree_raw(&self, layout: &ComponentLayout) -> Vec<f64> {
        let mut scores = vec![0.0; self.index.node_count()];
        for members in &layout.components {
            let size = members.len();
            if size <= 1 {
                continue;
            }
            for &v in members {
                scores[v] = self.index.weighted_degree(v) / (size - 1) as f64;
            }
        }
        scores
    }

    // ========================================================================
    // Betweenness (Brandes)
    // ========================================================================

    fn betweenness_raw(&self, layout: &ComponentLayout) -> Vec<f64> {
        let mut scores = vec![0.0; self.index.node_count()];

        for members in &layout.components {
            let m = members.len();
            if m <= 2 {
                continue;
            }

            let mut local = vec![0.0; m];
            let mut dist = vec![f64::INFINITY; m];
            let mut sigma = vec![0.0; m];
            let mut delta = vec![0.0; m];
            let mut settled = vec![false; m];
            let mut preds: Vec<Vec<usize>> = vec![Vec::new(); m];

            for s in 0..m {
                dist.fill(f64::INFINITY);
                sigma.fill(0.0);
                delta.fill(0.0);
                settled.fill(false);
                preds.iter_mut().for_each(Vec::clear);

                let mut order: Vec<usize> = Vec::with_capacity(m);
                let mut heap = BinaryHeap::new();
                dist[s] = 0.0;
                sigma[s] = 1.0;
                heap.push(HeapEntry { cost: 0.0, node: s });

                while let Some(HeapEntry { cost, node: u }) = heap.pop() {
                    if settled[u] || cost > dist[u] + DISTANCE_EPSILON {
                        continue;
                    }
                    settled[u] = true;
                    order.push(u);

                    for entry in self.index.neighbors(members[u]) {
                        let v = layout.position[entry.neighbor];
                        if v == u || settled[v] {
                            continue;
                        }
                        let next = dist[u] + entry.weight;
                        if next < dist[v] - DISTANCE_EPSILON {
                            dist[v] = next;
                            sigma[v] = sigma[u];
                            preds[v].clear();
                            preds[v].push(u);
                            heap.push(HeapEntry { cost: next, node: v });
                        } else if (next - dist[v]).abs() <= DISTANCE_EPSILON {
                            sigma[v] += sigma[u];
                            preds[v].push(u);
                        }
                    }
                }

                // Reverse settle order is a valid reverse topological order
                while let Some(w) = order.pop() {
                    for &v in &preds[w] {
                        delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                    }
                    if w != s {
                        local[w] += delta[w];
                    }
                }
            }

            // Each unordered pair was counted from both ends
            for (i, &v) in members.iter().enumerate() {
                scores[v] = local[i] / 2.0;
            }
        }
        scores
    }

    // ========================================================================
    // Closeness
    // ========================================================================

    /// Sum of distances mapped linearly from `[best, worst]` onto `[1, 0]`.
    ///
    /// For a component of size `m` the best possible sum is `(m−1)·w_min`
    /// (every node one lightest hop away) and the worst `(m−1)²·w_max` (every
    /// node at the end of a chain of heaviest edges).
    fn closeness_raw(&self, layout: &ComponentLayout) -> Vec<f64> {
        let mut scores = vec![0.0; self.index.node_count()];
        let w_min = self.config.closeness_min_weight;
        let w_max = self.config.closeness_max_weight;

        for members in &layout.components {
            let m = members.len();
            if m <= 1 {
                continue;
            }
            let others = (m - 1) as f64;
            let best = others * w_min;
            let worst = others * others * w_max;

            for &v in members {
                let sp = dijkstra(&self.index, v);
                let (total, reachable) = members
                    .iter()
                    .map(|&u| sp.dist[u])
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .fold((0.0, 0usize), |(sum, count), d| (sum + d, count + 1));

                if reachable == 0 || worst <= best {
                    continue;
                }
                scores[v] = ((worst - total) / (worst - best)).clamp(0.0, 1.0);
            }
        }
        scores
    }

    // ========================================================================
    // Eigenvector (power iteration)
    // ========================================================================

    /// Iterates `x ← (A + I)·x` with `A[u][v] = 1 / weight(u, v)`.
    ///
    /// The identity shift leaves the eigenvectors of `A` unchanged but keeps
    /// the iteration from oscillating on bipartite components (stars, chains).
    fn eigenvector_raw(&self, layout: &ComponentLayout) -> Vec<f64> {
        let mut scores = vec![0.0; self.index.node_count()];
        let tolerance = self.config.eigenvector_tolerance;
        let max_iter = self.config.eigenvector_max_iterations;

        for members in &layout.components {
            let m = members.len();
            if m <= 1 {
                continue;
            }

            let mut x = vec![1.0 / m as f64; m];
            let mut next = vec![0.0; m];

            for _ in 0..max_iter {
                for (i, &v) in members.iter().enumerate() {
                    next[i] = x[i]
                        + self
                            .index
                            .neighbors(v)
                            .iter()
                            .map(|entry| x[layout.position[entry.neighbor]] / entry.weight)
                            .sum::<f64>();
                }

                let norm = next.iter().map(|s| s * s).sum::<f64>().sqrt();
                if norm == 0.0 {
                    break;
                }
                next.iter_mut().for_each(|s| *s /= norm);

                let change = x
                    .iter()
                    .zip(next.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    .sqrt();

                std::mem::swap(&mut x, &mut next);
                if change < tolerance {
                    break;
                }
            }

            let max = x.iter().copied().fold(0.0f64, f64::max);
            for (i, &v) in members.iter().enumerate() {
                scores[v] = if max > 0.0 { x[i] / max } else { 0.0 };
            }
        }
        scores
    }

    // ========================================================================
    // PageRank (weighted power iteration)
    // ========================================================================

    fn pagerank_raw(&self, layout: &ComponentLayout) -> Vec<f64> {
        let mut scores = vec![0.0; self.index.node_count()];
        let damping = self.config.pagerank_damping;
        let tolerance = self.config.pagerank_tolerance;
        let max_iter = self.config.pagerank_max_iterations;

        for members in &layout.components {
            let m = members.len();
            if m <= 1 {
                for &v in members {
                    scores[v] = 1.0 / m as f64;
                }
                continue;
            }

            // Σ outgoing link strength per node
            let strength: Vec<f64> = members
                .iter()
                .map(|&v| {
                    self.index
                        .neighbors(v)
                        .iter()
                        .map(|entry| 1.0 / entry.weight)
                        .sum()
                })
                .collect();

            let base = (1.0 - damping) / m as f64;
            let mut rank = vec![1.0 / m as f64; m];
            let mut next = vec![0.0; m];

            for _ in 0..max_iter {
                next.fill(base);
                for (i, &v) in members.iter().enumerate() {
                    if strength[i] > 0.0 {
                        let share = damping * rank[i] / strength[i];
                        for entry in self.index.neighbors(v) {
                            next[layout.position[entry.neighbor]] += share / entry.weight;
                        }
                    } else {
                        let share = damping * rank[i] / m as f64;
                        next.iter_mut().for_each(|r| *r += share);
                    }
                }

                let max_delta = rank
                    .iter()
                    .zip(next.iter())
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0f64, f64::max);

                std::mem::swap(&mut rank, &mut next);
                if max_delta < tolerance {
                    break;
                }
            }

            let max = rank.iter().copied().fold(0.0f64, f64::max);
            for (i, &v) in members.iter().enumerate() {
                scores[v] = if max > 0.0 { rank[i] / max } else { 0.0 };
            }
        }
        scores
    }

    // ========================================================================
    // Clustering coefficient
    // ========================================================================

    /// Local clustering coefficient: closed neighbour pairs over possible pairs.
    ///
    /// Uses unique neighbours; self-loops and parallel edges are ignored.
    pub fn clustering_coefficient(&self) -> ScoreMap {
        let n = self.index.node_count();
        let neighbor_sets: Vec<HashSet<usize>> = (0..n)
            .map(|v| {
                self.index
                    .neighbors(v)
                    .iter()
                    .map(|entry| entry.neighbor)
                    .filter(|&u| u != v)
                    .collect()
            })
            .collect();

        let mut scores = vec![0.0; n];
        for (v, set) in neighbor_sets.iter().enumerate() {
            let neighbors: Vec<usize> = set.iter().copied().collect();
            let k = neighbors.len();
            if k < 2 {
                continue;
            }
            let mut triangles = 0usize;
            for i in 0..k {
                for j in (i + 1)..k {
                    if neighbor_sets[neighbors[i]].contains(&neighbors[j]) {
                        triangles += 1;
                    }
                }
            }
            scores[v] = triangles as f64 / (k * (k - 1) / 2) as f64;
        }
        self.to_score_map(&scores)
    }
}

// ============================================================================
// Tests
// ============================================================================
