//! Analysis coordinator.
//!
//! [`GraphAnalysis`] owns the centrality, pathfinding and clustering engines,
//! hands them one shared [`GraphIndex`], memoizes the expensive queries and
//! exposes a single query surface. Callers push every external mutation
//! through [`GraphAnalysis::update_graph`]; the engine never observes state
//! on its own.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::cache::{CacheStats, CachedResult, QueryCache};
use super::centrality::CentralityCalculator;
use super::clustering::ClusteringEngine;
use super::index::GraphIndex;
use super::models::{
    Bridge, CenterPeriphery, Centralities, CentralityKind, ComponentClustering, ComponentInfo,
    ConnectedComponent, DiameterRadius, DuplicateEdge, Edge, FullAnalysis, GraphSnapshot,
    GraphSummary, KCoreResult, LabelPropagationResult, LouvainResult, Node, NodeAnalysis,
    NodeDistance, PathResult, RankedNode, ScoreMap, ValidationReport,
};
use super::pathfinding::PathfindingEngine;
use crate::config::AnalysisConfig;
use crate::error::Result;

// ============================================================================
// Coordinator
// ============================================================================

/// Single entry point for graph analytics over one `(nodes, edges)` snapshot.
///
/// Queries take `&self`; [`update_graph`](Self::update_graph) takes `&mut self`
/// and swaps a freshly built index into all three engines at once, so no query
/// can ever observe a half-rebuilt graph.
#[derive(Debug)]
pub struct GraphAnalysis {
    config: AnalysisConfig,
    index: Arc<GraphIndex>,
    centrality: CentralityCalculator,
    pathfinding: PathfindingEngine,
    clustering: ClusteringEngine,
    cache: QueryCache,
}

impl GraphAnalysis {
    /// Build with the default configuration.
    pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
        Self::with_config(nodes, edges, AnalysisConfig::default())
    }

    pub fn with_config(nodes: &[Node], edges: &[Edge], config: AnalysisConfig) -> Self {
        let index = Arc::new(GraphIndex::build(nodes, edges));
        let cache = QueryCache::new(config.cache_ttl());
        Self {
            centrality: CentralityCalculator::new(index.clone(), config.clone()),
            pathfinding: PathfindingEngine::new(index.clone(), config.all_paths_max_depth),
            clustering: ClusteringEngine::new(index.clone()),
            index,
            cache,
            config,
        }
    }

    pub fn from_snapshot(snapshot: &GraphSnapshot, config: AnalysisConfig) -> Self {
        Self::with_config(&snapshot.nodes, &snapshot.edges, config)
    }

    /// Rebuild every index from scratch and drop all memoized results.
    pub fn update_graph(&mut self, nodes: &[Node], edges: &[Edge]) {
        let index = Arc::new(GraphIndex::build(nodes, edges));
        self.centrality = CentralityCalculator::new(index.clone(), self.config.clone());
        self.pathfinding = PathfindingEngine::new(index.clone(), self.config.all_paths_max_depth);
        self.clustering = ClusteringEngine::new(index.clone());
        self.index = index;
        self.cache.clear();

        tracing::info!(
            "Graph rebuilt: {} nodes, {} edges ({} dangling dropped)",
            self.index.node_count(),
            self.index.edge_count(),
            self.index.dropped_edges().len()
        );
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The current immutable index.
    pub fn graph(&self) -> &GraphIndex {
        &self.index
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // ========================================================================
    // Centrality
    // ========================================================================

    /// All five measures (memoized).
    pub fn centralities(&self) -> Centralities {
        let key = QueryCache::key("centralities", &());
        if let Some(CachedResult::Centralities(result)) = self.cache.get(&key) {
            return result;
        }
        let result = self.centrality.all();
        self.cache
            .insert(key, CachedResult::Centralities(result.clone()));
        result
    }

    /// One measure selected by name.
    ///
    /// Fails with [`AnalysisError::UnknownCentrality`](crate::AnalysisError::UnknownCentrality)
    /// for anything outside `degree|betweenness|closeness|eigenvector|pagerank`.
    pub fn centrality(&self, kind: &str) -> Result<ScoreMap> {
        let kind: CentralityKind = kind.parse()?;
        Ok(self.centrality_of(kind))
    }

    pub fn centrality_of(&self, kind: CentralityKind) -> ScoreMap {
        self.centrality.compute(kind)
    }

    /// Local clustering coefficient per node.
    pub fn clustering_coefficients(&self) -> ScoreMap {
        self.centrality.clustering_coefficient()
    }

    /// The `k` highest-scoring nodes for a measure, ties broken by id.
    pub fn top_nodes(&self, kind: CentralityKind, k: usize) -> Vec<RankedNode> {
        let mut ranked: Vec<RankedNode> = self
            .centrality
            .scores(kind)
            .into_iter()
            .map(|(node_id, score)| RankedNode { node_id, score })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        ranked.truncate(k);
        ranked
    }

    // ========================================================================
    // Paths and structure (never memoized)
    // ========================================================================

    pub fn shortest_path(&self, start: &str, end: &str) -> PathResult {
        self.pathfinding.shortest_path(start, end)
    }

    pub fn all_paths(&self, start: &str, end: &str, max_depth: Option<usize>) -> Vec<PathResult> {
        self.pathfinding.all_paths(start, end, max_depth)
    }

    pub fn k_shortest_paths(&self, start: &str, end: &str, k: usize) -> Vec<PathResult> {
        self.pathfinding.k_shortest_paths(start, end, k)
    }

    pub fn nodes_within_distance(&self, start: &str, max_distance: f64) -> Vec<NodeDistance> {
        self.pathfinding.nodes_within_distance(start, max_distance)
    }

    pub fn connected_component_of(&self, node_id: &str) -> Option<ConnectedComponent> {
        self.pathfinding.connected_component_of(node_id)
    }

    pub fn eccentricity(&self) -> HashMap<String, f64> {
        self.pathfinding.eccentricity()
    }

    pub fn diameter_and_radius(&self) -> DiameterRadius {
        self.pathfinding.diameter_and_radius()
    }

    pub fn center_and_periphery(&self) -> CenterPeriphery {
        self.pathfinding.center_and_periphery()
    }

    pub fn bridges(&self) -> Vec<Bridge> {
        self.pathfinding.bridges()
    }

    pub fn articulation_points(&self) -> Vec<String> {
        self.pathfinding.articulation_points()
    }

    pub fn connected_components(&self) -> Vec<ComponentInfo> {
        self.pathfinding.connected_components()
    }

    pub fn summary(&self) -> GraphSummary {
        self.pathfinding.summary()
    }

    // ========================================================================
    // Clustering
    // ========================================================================

    /// Single-level Louvain (memoized). `None` uses the configured resolution.
    pub fn louvain(&self, resolution: Option<f64>) -> LouvainResult {
        let resolution = resolution.unwrap_or(self.config.louvain_resolution);
        let max_iterations = self.config.louvain_max_iterations;
        let key = QueryCache::key("louvain", &(resolution, max_iterations));
        if let Some(CachedResult::Louvain(result)) = self.cache.get(&key) {
            return result;
        }
        let result = self.clustering.louvain(resolution, max_iterations);
        self.cache.insert(key, CachedResult::Louvain(result.clone()));
        result
    }

    /// Label propagation (memoized). `None` uses the configured round cap.
    pub fn label_propagation(&self, max_iterations: Option<usize>) -> LabelPropagationResult {
        let max_iterations =
            max_iterations.unwrap_or(self.config.label_propagation_max_iterations);
        let seed = self.config.label_propagation_seed;
        let key = QueryCache::key("label_propagation", &(max_iterations, seed));
        if let Some(CachedResult::LabelPropagation(result)) = self.cache.get(&key) {
            return result;
        }
        let result = self.clustering.label_propagation(max_iterations, seed);
        self.cache
            .insert(key, CachedResult::LabelPropagation(result.clone()));
        result
    }

    /// Weighted k-core decomposition (memoized).
    pub fn k_core(&self) -> KCoreResult {
        let key = QueryCache::key("kcore", &());
        if let Some(CachedResult::KCore(result)) = self.cache.get(&key) {
            return result;
        }
        let result = self.clustering.k_core_decomposition();
        self.cache.insert(key, CachedResult::KCore(result.clone()));
        result
    }

    pub fn components_clustering(&self) -> ComponentClustering {
        self.clustering.connected_components_clustering()
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Everything known about one node; `None` if the id is unknown.
    pub fn node_analysis(&self, node_id: &str) -> Option<NodeAnalysis> {
        let idx = self.index.index_of(node_id)?;
        let component = self.pathfinding.connected_component_of(node_id)?;
        let eccentricity = self.pathfinding.eccentricity_of(node_id)?;

        Some(NodeAnalysis {
            node_id: node_id.to_string(),
            degree: self.index.degree(idx),
            weighted_degree: self.index.weighted_degree(idx),
            centralities: self.centralities().for_node(node_id),
            eccentricity,
            component,
        })
    }

    /// Structural overview plus all centralities, stamped with the current time.
    pub fn full_analysis(&self) -> FullAnalysis {
        let start = std::time::Instant::now();
        let DiameterRadius { diameter, radius } = self.diameter_and_radius();
        let CenterPeriphery { center, periphery } = self.center_and_periphery();

        let analysis = FullAnalysis {
            summary: self.summary(),
            centralities: self.centralities(),
            components: self.connected_components(),
            bridges: self.bridges(),
            articulation_points: self.articulation_points(),
            diameter,
            radius,
            center,
            periphery,
            computed_at: Utc::now(),
        };
        tracing::debug!("Full analysis computed in {:?}", start.elapsed());
        analysis
    }

    /// Structural lint. Pure: runs only when asked and changes nothing.
    pub fn validate_graph(&self) -> ValidationReport {
        let isolated_nodes: Vec<String> = (0..self.index.node_count())
            .filter(|&v| self.index.degree(v) == 0)
            .map(|v| self.index.node_id(v).to_string())
            .collect();

        let mut by_pair: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
        for edge in self.index.edges() {
            by_pair
                .entry(edge.unordered_endpoints())
                .or_default()
                .push(edge.id.clone());
        }
        let duplicate_edges: Vec<DuplicateEdge> = by_pair
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(endpoints, edge_ids)| DuplicateEdge {
                endpoints,
                edge_ids,
            })
            .collect();

        let dangling_edges: Vec<String> = self
            .index
            .dropped_edges()
            .iter()
            .map(|e| e.id.clone())
            .collect();

        let self_loops: Vec<String> = self
            .index
            .edges()
            .filter(|e| e.is_self_loop())
            .map(|e| e.id.clone())
            .collect();

        let is_valid = isolated_nodes.is_empty()
            && duplicate_edges.is_empty()
            && dangling_edges.is_empty()
            && self_loops.is_empty();

        ValidationReport {
            isolated_nodes,
            duplicate_edges,
            dangling_edges,
            self_loops,
            is_valid,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
