//! Resolved conversion paths.

use std::fmt;

use crate::edge::{ConversionEdge, EdgeId};

/// One edge of a resolved path together with its graph identifier.
pub struct PathStep<P> {
    /// Identifier of the edge in the graph it was resolved from.
    pub id: EdgeId,
    /// The edge itself.
    pub edge: ConversionEdge<P>,
}

impl<P> Clone for PathStep<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            edge: self.edge.clone(),
        }
    }
}

impl<P> fmt::Debug for PathStep<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathStep")
            .field("id", &self.id)
            .field("edge", &self.edge)
            .finish()
    }
}

/// An ordered chain of edges where each edge starts where the previous one
/// ended.
///
/// A path with no steps is the identity path; it only arises when source and
/// target coincide.
pub struct ConversionPath<P> {
    source: String,
    steps: Vec<PathStep<P>>,
    bias: f64,
}

impl<P> ConversionPath<P> {
    /// The zero-cost identity path on `node`.
    pub fn identity(node: impl Into<String>) -> Self {
        Self {
            source: node.into(),
            steps: Vec::new(),
            bias: 0.0,
        }
    }

    /// Assemble a path from already chained steps.
    pub(crate) fn from_steps(source: String, steps: Vec<PathStep<P>>, bias: f64) -> Self {
        debug_assert!(steps.first().is_none_or(|s| s.edge.source() == source));
        debug_assert!(
            steps
                .windows(2)
                .all(|w| w[0].edge.target() == w[1].edge.source())
        );
        Self {
            source,
            steps,
            bias,
        }
    }

    /// Source node.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Target node (the source for the identity path).
    pub fn target(&self) -> &str {
        self.steps
            .last()
            .map_or(self.source.as_str(), |s| s.edge.target())
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PathStep<P>] {
        &self.steps
    }

    /// Edge identifiers in execution order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.steps.iter().map(|s| s.id).collect()
    }

    /// Number of edges.
    pub fn hops(&self) -> usize {
        self.steps.len()
    }

    /// Whether this is the zero-length identity path.
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of the declared edge weights.
    pub fn raw_weight(&self) -> f64 {
        self.steps.iter().map(|s| s.edge.weight()).sum()
    }

    /// Effective cost: declared weights plus the per-hop bias.
    pub fn cost(&self) -> f64 {
        self.steps
            .iter()
            .fold(0.0, |acc, s| acc + s.edge.weight() + self.bias)
    }

    /// Node names visited, source first.
    pub fn nodes(&self) -> Vec<String> {
        std::iter::once(self.source.clone())
            .chain(self.steps.iter().map(|s| s.edge.target().to_string()))
            .collect()
    }

    /// Whether every edge on the path is native.
    pub fn is_native(&self) -> bool {
        self.steps.iter().all(|s| s.edge.is_native())
    }
}

impl<P> Clone for ConversionPath<P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            steps: self.steps.clone(),
            bias: self.bias,
        }
    }
}

impl<P> fmt::Debug for ConversionPath<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionPath")
            .field("nodes", &self.nodes())
            .field("cost", &self.cost())
            .finish()
    }
}

impl<P> fmt::Display for ConversionPath<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nodes().join(" -> "))
    }
}
