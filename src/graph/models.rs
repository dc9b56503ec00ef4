//! Graph analysis data models.
//!
//! ## Input types (ingestion)
//! - [`Node`] — a graph vertex; only `id` matters to the engines
//! - [`Edge`] — canonical undirected edge record with a normalised weight
//! - [`RawEdge`] — ingestion adapter accepting the legacy field spellings
//! - [`GraphSnapshot`] — `(nodes, edges)` pair as handed over by collaborators
//!
//! ## Output types
//! - [`PathResult`], [`ConnectedComponent`], [`ComponentInfo`], [`Bridge`] — structural queries
//! - [`Centralities`], [`CentralityKind`] — centrality measures
//! - [`LouvainResult`], [`LabelPropagationResult`], [`KCoreResult`],
//!   [`ComponentClustering`], [`CommunityInfo`] — clustering
//! - [`GraphSummary`], [`NodeAnalysis`], [`FullAnalysis`], [`ValidationReport`] — aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

// ============================================================================
// Input types
// ============================================================================

/// A graph vertex. Display coordinates are carried through but never read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn at(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }
}

/// An undirected, weighted edge between two node ids.
///
/// The edge does not own its endpoints; ids that do not resolve to a node are
/// dropped when the index is built. Weights are normalised (see
/// [`normalize_weight`]) by the constructors, on deserialization and again by
/// [`GraphIndex::build`](super::index::GraphIndex::build), so the engines only
/// ever see strictly positive, finite weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default = "default_weight", deserialize_with = "de_weight")]
    pub weight: f64,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            weight: normalize_weight(Some(weight)),
        }
    }

    /// Edge with the default weight of 1.
    pub fn unweighted(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self::new(id, source_id, target_id, 1.0)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }

    /// Endpoints as an order-independent pair.
    pub fn unordered_endpoints(&self) -> (String, String) {
        if self.source_id <= self.target_id {
            (self.source_id.clone(), self.target_id.clone())
        } else {
            (self.target_id.clone(), self.source_id.clone())
        }
    }
}

/// Absent, non-positive and non-finite weights all become 1.
pub fn normalize_weight(weight: Option<f64>) -> f64 {
    match weight {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => 1.0,
    }
}

fn default_weight() -> f64 {
    1.0
}

fn de_weight<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(normalize_weight(Option::<f64>::deserialize(deserializer)?))
}

/// Edge as received from collaborators.
///
/// Accepts `from`/`to`, `from_node_id`/`to_node_id`, `sourceId`/`targetId`
/// and `source_id`/`target_id` spellings. Converted to [`Edge`] once, at the
/// ingestion boundary.
///
/// The spellings are aliases of one field, so a record must use exactly one
/// of them per endpoint: an edge carrying both `from` and `from_node_id` is a
/// duplicate-field error and fails the whole snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(
        alias = "from",
        alias = "from_node_id",
        alias = "sourceId",
        deserialize_with = "de_id"
    )]
    pub source_id: String,
    #[serde(
        alias = "to",
        alias = "to_node_id",
        alias = "targetId",
        deserialize_with = "de_id"
    )]
    pub target_id: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl RawEdge {
    /// Canonicalise. `position` names edges that arrive without an id.
    pub fn into_edge(self, position: usize) -> Edge {
        Edge {
            id: self.id.unwrap_or_else(|| format!("e{position}")),
            source_id: self.source_id,
            target_id: self.target_id,
            weight: normalize_weight(self.weight),
        }
    }
}

/// Ids may arrive as JSON strings or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(i) => i.to_string(),
            RawId::Float(f) => f.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(RawId::deserialize(deserializer)?.into())
}

fn de_opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// A `(nodes, edges)` pair in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Parse a JSON document of the form `{"nodes": [...], "edges": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        Ok(Self {
            nodes: raw.nodes,
            edges: raw
                .edges
                .into_iter()
                .enumerate()
                .map(|(i, e)| e.into_edge(i))
                .collect(),
        })
    }
}

// ============================================================================
// Serde helper for infinite distances
// ============================================================================

/// JSON has no infinity: unreachable distances serialize as `null`.
pub mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

// ============================================================================
// Structural query results
// ============================================================================

/// A weighted path between two nodes.
///
/// Unreachable targets yield `distance = ∞` with empty `path` and `edges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    #[serde(with = "infinite_as_null")]
    pub distance: f64,
    /// Node ids from start to end
    pub path: Vec<String>,
    /// Edge ids traversed, one fewer than `path`
    pub edges: Vec<String>,
}

impl PathResult {
    pub fn unreachable() -> Self {
        Self {
            distance: f64::INFINITY,
            path: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn trivial(node_id: impl Into<String>) -> Self {
        Self {
            distance: 0.0,
            path: vec![node_id.into()],
            edges: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// A node paired with its distance from some source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDistance {
    pub node_id: String,
    pub distance: f64,
}

/// Reachability closure of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedComponent {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
    pub size: usize,
}

/// One block of the connected-component partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Component index in discovery order
    pub id: usize,
    pub size: usize,
    pub members: Vec<String>,
    /// Whether this is (one of) the largest components
    pub is_main: bool,
}

/// An edge whose removal disconnects its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bridge {
    pub edge_id: String,
    pub source_id: String,
    pub target_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiameterRadius {
    pub diameter: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterPeriphery {
    pub center: Vec<String>,
    pub periphery: Vec<String>,
}

/// Global structural statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    /// Accepted edges only (dangling edges excluded)
    pub edge_count: usize,
    pub component_count: usize,
    pub largest_component_size: usize,
    pub bridge_count: usize,
    pub articulation_point_count: usize,
    pub diameter: f64,
    pub radius: f64,
    /// `|E| / (N(N-1)/2)`, 0 for fewer than two nodes
    pub density: f64,
}

// ============================================================================
// Centrality results
// ============================================================================

/// The closed set of centrality measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralityKind {
    Degree,
    Betweenness,
    Closeness,
    Eigenvector,
    Pagerank,
}

impl CentralityKind {
    pub const ALL: [CentralityKind; 5] = [
        Self::Degree,
        Self::Betweenness,
        Self::Closeness,
        Self::Eigenvector,
        Self::Pagerank,
    ];
}

impl fmt::Display for CentralityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degree => write!(f, "degree"),
            Self::Betweenness => write!(f, "betweenness"),
            Self::Closeness => write!(f, "closeness"),
            Self::Eigenvector => write!(f, "eigenvector"),
            Self::Pagerank => write!(f, "pagerank"),
        }
    }
}

impl FromStr for CentralityKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degree" => Ok(Self::Degree),
            "betweenness" => Ok(Self::Betweenness),
            "closeness" => Ok(Self::Closeness),
            "eigenvector" => Ok(Self::Eigenvector),
            "pagerank" => Ok(Self::Pagerank),
            _ => Err(AnalysisError::UnknownCentrality(s.to_string())),
        }
    }
}

/// Formatted scores: node id → score with four decimals.
pub type ScoreMap = HashMap<String, String>;

/// Format a score with four decimal digits.
pub fn to_fixed(value: f64) -> String {
    format!("{value:.4}")
}

/// All five measures, each as a formatted score map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Centralities {
    pub degree: ScoreMap,
    pub betweenness: ScoreMap,
    pub closeness: ScoreMap,
    pub eigenvector: ScoreMap,
    pub pagerank: ScoreMap,
}

impl Centralities {
    pub fn get(&self, kind: CentralityKind) -> &ScoreMap {
        match kind {
            CentralityKind::Degree => &self.degree,
            CentralityKind::Betweenness => &self.betweenness,
            CentralityKind::Closeness => &self.closeness,
            CentralityKind::Eigenvector => &self.eigenvector,
            CentralityKind::Pagerank => &self.pagerank,
        }
    }

    /// Scores of a single node across all measures.
    pub fn for_node(&self, node_id: &str) -> BTreeMap<CentralityKind, String> {
        CentralityKind::ALL
            .iter()
            .filter_map(|&kind| {
                self.get(kind)
                    .get(node_id)
                    .map(|score| (kind, score.clone()))
            })
            .collect()
    }
}

/// A node and its raw score, used for rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNode {
    pub node_id: String,
    pub score: f64,
}

// ============================================================================
// Clustering results
// ============================================================================

/// Community assignment: node id → community label.
pub type Assignment = HashMap<String, usize>;

/// Summary of one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityInfo {
    pub id: usize,
    pub size: usize,
    pub members: Vec<String>,
}

/// Group an assignment into communities, largest first (ties by id).
pub fn community_infos(assignment: &Assignment) -> Vec<CommunityInfo> {
    let mut members: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (node, &community) in assignment {
        members.entry(community).or_default().push(node.clone());
    }
    let mut infos: Vec<CommunityInfo> = members
        .into_iter()
        .map(|(id, mut members)| {
            members.sort();
            CommunityInfo {
                id,
                size: members.len(),
                members,
            }
        })
        .collect();
    infos.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)));
    infos
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LouvainResult {
    pub communities: Assignment,
    pub modularity: f64,
    pub community_count: usize,
    /// Number of sweeps performed
    pub iterations: usize,
}

impl LouvainResult {
    pub fn community_infos(&self) -> Vec<CommunityInfo> {
        community_infos(&self.communities)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPropagationResult {
    pub communities: Assignment,
    pub community_count: usize,
    pub iterations: usize,
    /// Whether a round finished without any label change
    pub converged: bool,
}

impl LabelPropagationResult {
    pub fn community_infos(&self) -> Vec<CommunityInfo> {
        community_infos(&self.communities)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KCoreResult {
    /// Node id → core number
    pub core_numbers: HashMap<String, usize>,
    pub max_core: usize,
}

impl KCoreResult {
    /// Node ids whose core number is at least `k`.
    pub fn core(&self, k: usize) -> Vec<String> {
        let mut nodes: Vec<String> = self
            .core_numbers
            .iter()
            .filter(|(_, &c)| c >= k)
            .map(|(id, _)| id.clone())
            .collect();
        nodes.sort();
        nodes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentClustering {
    pub communities: Assignment,
    pub community_count: usize,
}

impl ComponentClustering {
    pub fn community_infos(&self) -> Vec<CommunityInfo> {
        community_infos(&self.communities)
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Everything known about a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAnalysis {
    pub node_id: String,
    /// Number of incident edges
    pub degree: usize,
    pub weighted_degree: f64,
    pub centralities: BTreeMap<CentralityKind, String>,
    #[serde(with = "infinite_as_null")]
    pub eccentricity: f64,
    pub component: ConnectedComponent,
}

/// Bundle of the structural overview, stamped with its computation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    pub summary: GraphSummary,
    pub centralities: Centralities,
    pub components: Vec<ComponentInfo>,
    pub bridges: Vec<Bridge>,
    pub articulation_points: Vec<String>,
    pub diameter: f64,
    pub radius: f64,
    pub center: Vec<String>,
    pub periphery: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

/// Several edges over the same unordered endpoint pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEdge {
    pub endpoints: (String, String),
    pub edge_ids: Vec<String>,
}

/// Structural lint findings. Never produced implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Nodes with no incident edge
    pub isolated_nodes: Vec<String>,
    pub duplicate_edges: Vec<DuplicateEdge>,
    /// Edges referencing a node id that does not exist
    pub dangling_edges: Vec<String>,
    pub self_loops: Vec<String>,
    pub is_valid: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_weight() {
        assert_eq!(normalize_weight(None), 1.0);
        assert_eq!(normalize_weight(Some(0.0)), 1.0);
        assert_eq!(normalize_weight(Some(-3.0)), 1.0);
        assert_eq!(normalize_weight(Some(f64::NAN)), 1.0);
        assert_eq!(normalize_weight(Some(f64::INFINITY)), 1.0);
        assert_eq!(normalize_weight(Some(2.5)), 2.5);
    }

    #[test]
    fn test_raw_edge_accepts_both_field_spellings() {
        let short: RawEdge = serde_json::from_str(r#"{"id":"e1","from":"a","to":"b"}"#).unwrap();
        let long: RawEdge =
            serde_json::from_str(r#"{"id":"e1","from_node_id":"a","to_node_id":"b","weight":2}"#)
                .unwrap();

        let short = short.into_edge(0);
        let long = long.into_edge(0);
        assert_eq!(short.source_id, "a");
        assert_eq!(short.target_id, "b");
        assert_eq!(short.weight, 1.0);
        assert_eq!(long.source_id, "a");
        assert_eq!(long.weight, 2.0);
    }

    #[test]
    fn test_raw_edge_rejects_two_spellings_of_one_endpoint() {
        let result: std::result::Result<RawEdge, _> =
            serde_json::from_str(r#"{"from":"a","from_node_id":"a","to":"b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_edge_deserialization_normalizes_weight() {
        let edges: Vec<Edge> = serde_json::from_str(
            r#"[
                {"id":"neg","source_id":"A","target_id":"B","weight":-2},
                {"id":"zero","source_id":"A","target_id":"B","weight":0},
                {"id":"none","source_id":"A","target_id":"B"},
                {"id":"ok","source_id":"A","target_id":"B","weight":0.5}
            ]"#,
        )
        .unwrap();
        let weights: Vec<f64> = edges.iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn test_snapshot_from_json_numeric_ids_and_missing_edge_ids() {
        let json = r#"{
            "nodes": [{"id": 1, "x": 10.0, "y": 5.0, "label": "ignored"}, {"id": "2"}],
            "edges": [{"from": 1, "to": 2, "weight": -4}]
        }"#;
        let snapshot = GraphSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.nodes[0].id, "1");
        assert_eq!(snapshot.nodes[1].id, "2");
        assert_eq!(snapshot.edges[0].id, "e0");
        assert_eq!(snapshot.edges[0].source_id, "1");
        assert_eq!(snapshot.edges[0].weight, 1.0);
    }

    #[test]
    fn test_snapshot_from_invalid_json() {
        let err = GraphSnapshot::from_json(r#"{"edges":[{"id":"x"}]}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_centrality_kind_parsing() {
        assert_eq!(
            "PageRank".parse::<CentralityKind>().unwrap(),
            CentralityKind::Pagerank
        );
        assert_eq!(
            " degree ".parse::<CentralityKind>().unwrap(),
            CentralityKind::Degree
        );
        let err = "harmonic".parse::<CentralityKind>().unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownCentrality(s) if s == "harmonic"));
        for kind in CentralityKind::ALL {
            assert_eq!(kind.to_string().parse::<CentralityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0 / 3.0), "0.3333");
        assert_eq!(to_fixed(2.0 / 3.0), "0.6667");
        assert_eq!(to_fixed(0.0), "0.0000");
        assert_eq!(to_fixed(10.0), "10.0000");
    }

    #[test]
    fn test_unreachable_path_serializes_null_distance() {
        let json = serde_json::to_string(&PathResult::unreachable()).unwrap();
        assert_eq!(json, r#"{"distance":null,"path":[],"edges":[]}"#);
        let back: PathResult = serde_json::from_str(&json).unwrap();
        assert!(back.distance.is_infinite());
        assert!(!back.is_reachable());
    }

    #[test]
    fn test_community_infos_largest_first() {
        let assignment: Assignment = [("a", 0), ("b", 1), ("c", 1), ("d", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let infos = community_infos(&assignment);
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].id, 1);
        assert_eq!(infos[0].members, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(infos[1].id, 0);
        assert_eq!(infos[2].id, 2);
    }

    #[test]
    fn test_edge_unordered_endpoints() {
        let e = Edge::unweighted("e", "z", "a");
        assert_eq!(e.unordered_endpoints(), ("a".to_string(), "z".to_string()));
        assert!(!e.is_self_loop());
        assert!(Edge::unweighted("l", "a", "a").is_self_loop());
    }
}
