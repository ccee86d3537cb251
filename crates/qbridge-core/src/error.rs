//! Error types for the conversion core.

use thiserror::Error;

use crate::edge::EdgeId;

/// Boxed error returned by conversion callables.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building, querying or executing the
/// conversion graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A query referenced a node that is not part of the graph.
    #[error("Node '{0}' is not registered in the conversion graph")]
    UnregisteredNode(String),

    /// No route exists between the requested nodes.
    #[error("No conversion path from '{from}' to '{to}'")]
    NoPath {
        /// Requested source node.
        from: String,
        /// Requested target node.
        to: String,
    },

    /// None of the candidate targets is reachable from the source.
    #[error("None of the candidate targets [{}] is reachable from '{from}'", .candidates.join(", "))]
    NoReachableTarget {
        /// Requested source node.
        from: String,
        /// The candidates that were considered.
        candidates: Vec<String>,
    },

    /// Malformed graph construction input.
    #[error("Invalid conversion graph configuration: {0}")]
    Configuration(String),

    /// An edge identifier does not refer to a live edge.
    #[error("Conversion edge {0:?} not found")]
    EdgeNotFound(EdgeId),

    /// A conversion callable failed while executing a single path.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Every candidate path failed under fallback execution.
    #[error(
        "All {} conversion attempt(s) from '{from}' to '{to}' failed{}",
        .attempts.len(),
        format_last_attempt(.attempts)
    )]
    Exhausted {
        /// Requested source node.
        from: String,
        /// Requested target node.
        to: String,
        /// One entry per attempted path, in attempt order.
        attempts: Vec<ExecutionError>,
    },
}

impl ConvertError {
    /// Per-attempt failures collected during fallback execution.
    ///
    /// Empty for every variant except [`ConvertError::Exhausted`] and
    /// [`ConvertError::Execution`].
    pub fn attempts(&self) -> &[ExecutionError] {
        match self {
            ConvertError::Exhausted { attempts, .. } => attempts,
            ConvertError::Execution(err) => std::slice::from_ref(err),
            _ => &[],
        }
    }
}

fn format_last_attempt(attempts: &[ExecutionError]) -> String {
    match attempts.last() {
        Some(last) => format!(" (last: {last})"),
        None => String::new(),
    }
}

/// Failure of one edge while walking a conversion path.
#[derive(Debug, Error)]
#[error(
    "Conversion '{edge_name}' ({from_node} -> {to_node}) failed at step {step} of path {}: {cause}",
    .path.join(" -> ")
)]
pub struct ExecutionError {
    /// Identifier of the failing edge.
    pub edge_id: EdgeId,
    /// Human-readable name of the failing edge.
    pub edge_name: String,
    /// Source node of the failing edge.
    pub from_node: String,
    /// Target node of the failing edge.
    pub to_node: String,
    /// Zero-based position of the failing edge in the path.
    pub step: usize,
    /// Node sequence of the attempted path.
    pub path: Vec<String>,
    /// Error raised by the conversion callable.
    #[source]
    pub cause: BoxError,
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
