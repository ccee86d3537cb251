//! Conversion executor: walks resolved paths with fallback on edge failure.
//!
//! A single fallback call moves through these states:
//!
//! ```text
//! SEARCHING ──(no path, nothing tried)──────────────► FAILED_NO_PATH
//!     │
//!     ├──(no path, ≥1 attempt failed)───────────────► FAILED_EXHAUSTED
//!     ▼
//! ATTEMPTING ──(all edges succeed)──────────────────► SUCCEEDED
//!     │
//!     └──(edge fails) exclude edge ─► SEARCHING, or FAILED_EXHAUSTED
//!                                     once max_path_attempts is reached
//! ```
//!
//! Every attempt restarts from the original program: transforms are not
//! assumed to be resumable mid-path.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{ConvertError, ConvertResult, ExecutionError};
use crate::graph::ConversionGraph;
use crate::path::ConversionPath;
use crate::search::SearchLimits;

/// Parameters of fallback execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionScheme {
    /// Maximum number of distinct paths tried before giving up.
    #[serde(default = "default_max_path_attempts")]
    pub max_path_attempts: usize,

    /// Maximum number of edges per path; unbounded when `None`.
    #[serde(default)]
    pub max_path_depth: Option<usize>,
}

fn default_max_path_attempts() -> usize {
    3
}

impl ConversionScheme {
    /// Scheme with the given attempt budget and no depth bound.
    pub fn with_max_attempts(max_path_attempts: usize) -> Self {
        Self {
            max_path_attempts,
            max_path_depth: None,
        }
    }

    /// Bound the path depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_path_depth: Option<usize>) -> Self {
        self.max_path_depth = max_path_depth;
        self
    }
}

impl Default for ConversionScheme {
    fn default() -> Self {
        Self::with_max_attempts(default_max_path_attempts())
    }
}

/// Successful conversion.
#[derive(Debug)]
pub struct Converted<P> {
    /// The converted program.
    pub program: P,
    /// Node the program is now expressed in.
    pub node: String,
    /// The path that succeeded.
    pub path: ConversionPath<P>,
    /// Paths that failed before the successful one, in attempt order.
    pub failed_attempts: Vec<ExecutionError>,
}

/// Apply every edge of `path` in order, threading each output into the next
/// edge. Stops at the first failing edge.
pub fn execute<P>(program: P, path: &ConversionPath<P>) -> Result<P, ExecutionError> {
    let mut current = program;

    for (step, s) in path.steps().iter().enumerate() {
        trace!("Applying {} ({}/{})", s.edge.name(), step + 1, path.hops());
        current = s.edge.apply(current).map_err(|cause| {
            warn!(
                "Conversion {} failed at step {} of {}: {}",
                s.edge.name(),
                step,
                path,
                cause
            );
            ExecutionError {
                edge_id: s.id,
                edge_name: s.edge.name().to_string(),
                from_node: s.edge.source().to_string(),
                to_node: s.edge.target().to_string(),
                step,
                path: path.nodes(),
                cause,
            }
        })?;
    }

    Ok(current)
}

/// Convert `program` from `source` to `target`, retrying along alternative
/// paths when an edge fails.
///
/// After each failure the failing edge is excluded and the search re-runs,
/// so every attempt uses a distinct path and no failing edge is retried.
/// Returns [`ConvertError::NoPath`] when no path exists at all and
/// [`ConvertError::Exhausted`] once attempts run out or no untried path is
/// left.
#[instrument(skip(program, graph), level = "debug")]
pub fn execute_with_fallback<P: Clone>(
    program: &P,
    source: &str,
    target: &str,
    graph: &ConversionGraph<P>,
    scheme: &ConversionScheme,
) -> ConvertResult<Converted<P>> {
    let max_attempts = scheme.max_path_attempts.max(1);
    let mut limits = SearchLimits::new().with_max_hops(scheme.max_path_depth);
    let mut failures: Vec<ExecutionError> = Vec::new();

    loop {
        let path = match graph.shortest_path_with(source, target, &limits) {
            Ok(path) => path,
            Err(ConvertError::NoPath { .. }) if !failures.is_empty() => {
                debug!("No untried path from {} to {}", source, target);
                return Err(exhausted(source, target, failures));
            }
            Err(e) => return Err(e),
        };

        debug!(
            "Attempt {}/{}: {} (cost {:.4})",
            failures.len() + 1,
            max_attempts,
            path,
            path.cost()
        );

        match execute(program.clone(), &path) {
            Ok(converted) => {
                info!(
                    "Converted {} -> {} via {} after {} failed attempt(s)",
                    source,
                    target,
                    path,
                    failures.len()
                );
                return Ok(Converted {
                    program: converted,
                    node: target.to_string(),
                    path,
                    failed_attempts: failures,
                });
            }
            Err(err) => {
                limits.exclude(err.edge_id);
                failures.push(err);
                if failures.len() >= max_attempts {
                    return Err(exhausted(source, target, failures));
                }
            }
        }
    }
}

fn exhausted(source: &str, target: &str, attempts: Vec<ExecutionError>) -> ConvertError {
    info!(
        "Giving up on {} -> {} after {} failed attempt(s)",
        source,
        target,
        attempts.len()
    );
    ConvertError::Exhausted {
        from: source.to_string(),
        to: target.to_string(),
        attempts,
    }
}
