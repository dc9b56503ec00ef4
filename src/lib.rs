//! Graph Analysis
//!
//! An in-process analytics engine for weighted, undirected graphs:
//! - Centrality measures (degree, betweenness, closeness, eigenvector, PageRank)
//! - Shortest paths, k shortest paths and structural queries (bridges,
//!   articulation points, eccentricity, components)
//! - Community detection (Louvain, label propagation, k-core)
//! - TTL memoization of the expensive queries
//!
//! Collaborators hand over `(nodes, edges)` snapshots through
//! [`GraphAnalysis::new`] / [`GraphAnalysis::update_graph`] and read plain
//! result records back.
//!
//! ```
//! use graph_analysis::{Edge, GraphAnalysis, Node};
//!
//! let nodes = vec![Node::new("A"), Node::new("B"), Node::new("C")];
//! let edges = vec![
//!     Edge::unweighted("AB", "A", "B"),
//!     Edge::unweighted("BC", "B", "C"),
//! ];
//! let analysis = GraphAnalysis::new(&nodes, &edges);
//!
//! let path = analysis.shortest_path("A", "C");
//! assert_eq!(path.distance, 2.0);
//! assert_eq!(analysis.articulation_points(), vec!["B"]);
//! ```

pub mod config;
pub mod error;
pub mod graph;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use graph::{
    Bridge, CacheStats, Centralities, CentralityKind, CommunityInfo, ComponentInfo,
    ConnectedComponent, Edge, FullAnalysis, GraphAnalysis, GraphIndex, GraphSnapshot,
    GraphSummary, KCoreResult, LabelPropagationResult, LouvainResult, Node, NodeAnalysis,
    PathResult, ScoreMap, ValidationReport,
};
