//! Errors of the embedding pipeline.
//!
//! Configuration and degenerate input errors are detected before any training starts.
//! An invariant violation means the stages were not run in order (or a bug), it is not recoverable.

use thiserror::Error;

/// Errors that can occur in graph2vec.
#[derive(Error, Debug)]
pub enum GraphEmbedError {
    /// Inconsistent parameters, or parameters not satisfiable by the corpus.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Input the algorithm cannot process (empty corpus, single vertex graph ...).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    /// Internal tables out of sync.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    /// An edge references a vertex slot with no vertex.
    #[error("graph {graph} : edge ({from}, {to}) references a missing vertex")]
    InvalidEdge { graph: usize, from: u32, to: u32 },
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for graph2vec.
pub type Result<T> = std::result::Result<T, GraphEmbedError>;
