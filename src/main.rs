//! Graph Analysis - CLI
//!
//! Runs analysis queries over a JSON graph snapshot and prints JSON results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graph_analysis::{AnalysisConfig, CentralityKind, GraphAnalysis, GraphSnapshot};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "graph-analysis")]
#[command(about = "Centrality, pathfinding and community detection over a graph snapshot")]
struct Cli {
    /// JSON snapshot: {"nodes": [...], "edges": [...]}
    #[arg(short, long, env = "GRAPH_ANALYSIS_INPUT")]
    input: PathBuf,

    /// YAML config file (defaults to ./graph-analysis.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Global structural statistics
    Summary,

    /// Summary, centralities, components, bridges and eccentricity extremes
    Full,

    /// One centrality measure for every node
    Centrality {
        /// degree | betweenness | closeness | eigenvector | pagerank
        kind: String,

        /// Only print the N highest-scoring nodes
        #[arg(long)]
        top: Option<usize>,
    },

    /// Paths between two nodes
    Path {
        from: String,
        to: String,

        /// Return up to K loopless shortest paths
        #[arg(short, long)]
        k: Option<usize>,

        /// Enumerate every simple path up to the configured depth
        #[arg(long, conflicts_with = "k")]
        all: bool,
    },

    /// Community detection
    Communities {
        #[arg(value_enum)]
        algorithm: Algorithm,

        /// Louvain resolution (overrides config)
        #[arg(long)]
        resolution: Option<f64>,
    },

    /// Everything known about one node
    Node { id: String },

    /// Nodes within a distance of a start node
    Within { from: String, distance: f64 },

    /// Structural lint: isolated nodes, duplicate, dangling and self-loop edges
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum Algorithm {
    Louvain,
    Labels,
    Kcore,
    Components,
}

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr keeps stdout clean for JSON)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,graph_analysis=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AnalysisConfig::from_yaml_and_env(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read snapshot {}", cli.input.display()))?;
    let snapshot = GraphSnapshot::from_json(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", cli.input.display()))?;

    tracing::info!(
        "Loaded snapshot: {} nodes, {} edges",
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    let analysis = GraphAnalysis::from_snapshot(&snapshot, config);

    match cli.command {
        Commands::Summary => print_json(&analysis.summary()),
        Commands::Full => print_json(&analysis.full_analysis()),
        Commands::Centrality { kind, top } => match top {
            Some(n) => {
                let kind: CentralityKind = kind.parse()?;
                print_json(&analysis.top_nodes(kind, n))
            }
            None => print_json(&analysis.centrality(&kind)?),
        },
        Commands::Path { from, to, k, all } => {
            if all {
                print_json(&analysis.all_paths(&from, &to, None))
            } else if let Some(k) = k {
                print_json(&analysis.k_shortest_paths(&from, &to, k))
            } else {
                print_json(&analysis.shortest_path(&from, &to))
            }
        }
        Commands::Communities {
            algorithm,
            resolution,
        } => run_communities(&analysis, algorithm, resolution),
        Commands::Node { id } => {
            let node = analysis
                .node_analysis(&id)
                .with_context(|| format!("Unknown node '{id}'"))?;
            print_json(&node)
        }
        Commands::Within { from, distance } => {
            print_json(&analysis.nodes_within_distance(&from, distance))
        }
        Commands::Validate => print_json(&analysis.validate_graph()),
    }
}

fn run_communities(
    analysis: &GraphAnalysis,
    algorithm: Algorithm,
    resolution: Option<f64>,
) -> Result<()> {
    let output = match algorithm {
        Algorithm::Louvain => {
            let result = analysis.louvain(resolution);
            json!({
                "modularity": result.modularity,
                "community_count": result.community_count,
                "iterations": result.iterations,
                "communities": result.community_infos(),
            })
        }
        Algorithm::Labels => {
            let result = analysis.label_propagation(None);
            json!({
                "community_count": result.community_count,
                "iterations": result.iterations,
                "converged": result.converged,
                "communities": result.community_infos(),
            })
        }
        Algorithm::Kcore => serde_json::to_value(analysis.k_core())?,
        Algorithm::Components => {
            let result = analysis.components_clustering();
            json!({
                "community_count": result.community_count,
                "communities": result.community_infos(),
            })
        }
    };
    print_json(&output)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
