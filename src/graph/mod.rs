//! Graph analytics engine.
//!
//! Computes centrality measures, shortest-path and structural queries, and
//! community detection over a weighted, undirected, possibly disconnected
//! graph. Centrality and clustering are scoped per connected component.
//!
//! ## Architecture
//!
//! ```text
//! (nodes, edges) ──► GraphIndex (petgraph::UnGraph + adjacency)
//!                          │ Arc
//!         ┌────────────────┼────────────────┐
//!   CentralityCalculator  PathfindingEngine  ClusteringEngine
//!         └────────────────┼────────────────┘
//!                   GraphAnalysis ◄── QueryCache (moka, TTL)
//! ```
//!
//! ## Modules
//!
//! - [`models`] — Input records and result types
//! - [`index`] — `GraphIndex`, the shared lookup structure
//! - [`centrality`] — Degree, betweenness, closeness, eigenvector, PageRank
//! - [`pathfinding`] — Dijkstra, all paths, Yen's k shortest paths, bridges, articulation points
//! - [`clustering`] — Louvain, label propagation, k-core, component baseline
//! - [`cache`] — TTL memoization for the expensive queries
//! - [`engine`] — `GraphAnalysis` coordinator

pub mod cache;
pub mod centrality;
pub mod clustering;
pub mod engine;
pub mod index;
pub mod models;
pub mod pathfinding;
mod traversal;

// Re-export primary types for convenience
pub use cache::{CacheStats, CachedResult, QueryCache};
pub use centrality::CentralityCalculator;
pub use clustering::ClusteringEngine;
pub use engine::GraphAnalysis;
pub use index::{AdjEntry, GraphIndex};
pub use models::{
    Assignment, Bridge, CenterPeriphery, Centralities, CentralityKind, CommunityInfo,
    ComponentClustering, ComponentInfo, ConnectedComponent, DiameterRadius, DuplicateEdge, Edge,
    FullAnalysis, GraphSnapshot, GraphSummary, KCoreResult, LabelPropagationResult,
    LouvainResult, Node, NodeAnalysis, NodeDistance, PathResult, RankedNode, RawEdge, ScoreMap,
    ValidationReport,
};
pub use pathfinding::PathfindingEngine;
