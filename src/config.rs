//! Tuning parameters for the analysis engines.
//!
//! Priority when loading: env var > YAML > default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Result;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "graph-analysis.yaml";

/// Algorithm parameters shared by all engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// PageRank damping factor (default: 0.85)
    pub pagerank_damping: f64,
    /// PageRank convergence threshold on the max absolute delta (default: 1e-6)
    pub pagerank_tolerance: f64,
    /// PageRank maximum iterations (default: 100)
    pub pagerank_max_iterations: usize,
    /// Eigenvector convergence threshold on the L2 norm of the change (default: 1e-10)
    pub eigenvector_tolerance: f64,
    /// Eigenvector maximum iterations (default: 100)
    pub eigenvector_max_iterations: usize,
    /// Louvain resolution (default: 1.0, higher = smaller communities)
    pub louvain_resolution: f64,
    /// Louvain maximum sweeps (default: 100)
    pub louvain_max_iterations: usize,
    /// Label propagation maximum rounds (default: 100)
    pub label_propagation_max_iterations: usize,
    /// Fixed RNG seed for label propagation; `None` draws from entropy.
    pub label_propagation_seed: Option<u64>,
    /// Depth cutoff (in edges) for exhaustive path enumeration (default: 10)
    pub all_paths_max_depth: usize,
    /// Lower bound of the weight range used to scale closeness (default: 0.1)
    pub closeness_min_weight: f64,
    /// Upper bound of the weight range used to scale closeness (default: 30.0)
    pub closeness_max_weight: f64,
    /// Lifetime of memoized query results in milliseconds (default: 5000)
    pub cache_ttl_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pagerank_damping: 0.85,
            pagerank_tolerance: 1e-6,
            pagerank_max_iterations: 100,
            eigenvector_tolerance: 1e-10,
            eigenvector_max_iterations: 100,
            louvain_resolution: 1.0,
            louvain_max_iterations: 100,
            label_propagation_max_iterations: 100,
            label_propagation_seed: None,
            all_paths_max_depth: 10,
            closeness_min_weight: 0.1,
            closeness_max_weight: 30.0,
            cache_ttl_ms: 5000,
        }
    }
}

impl AnalysisConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from an optional YAML file, then apply env overrides.
    ///
    /// An explicit `yaml_path` must exist and parse. Without one, the default
    /// file in the working directory is tried and silently skipped if absent.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let mut config = match yaml_path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                let config = Self::from_yaml_str(&contents)?;
                tracing::info!("Loaded analysis config from {}", path.display());
                config
            }
            None => Self::load_default_file(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_default_file() -> Self {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_yaml_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded analysis config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(ttl) = env_override("GRAPH_ANALYSIS_CACHE_TTL_MS") {
            self.cache_ttl_ms = ttl;
        }
        if let Some(resolution) = env_override("GRAPH_ANALYSIS_LOUVAIN_RESOLUTION") {
            self.louvain_resolution = resolution;
        }
        if let Some(damping) = env_override("GRAPH_ANALYSIS_PAGERANK_DAMPING") {
            self.pagerank_damping = damping;
        }
    }

    /// Cache lifetime as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

fn env_override<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable value for {}: {:?}", name, raw);
            None
        }
    }
}
