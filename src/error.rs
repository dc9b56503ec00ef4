//! Error types for the analysis engine.
//!
//! Only genuinely fatal conditions are errors. Unknown node ids, unreachable
//! targets and missing structure are reported by value (`None`, `f64::INFINITY`,
//! empty vectors) so callers can branch without error handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A centrality selector outside the closed set of supported measures.
    #[error(
        "unknown centrality type '{0}' (expected one of: degree, betweenness, closeness, eigenvector, pagerank)"
    )]
    UnknownCentrality(String),

    #[error("invalid graph snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
