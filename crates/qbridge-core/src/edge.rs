//! Conversion edges: single directed transformations between two nodes.

use std::fmt;
use std::sync::Arc;

use petgraph::stable_graph::EdgeIndex;

use crate::error::{BoxError, ConvertError, ConvertResult};

/// Stable identifier of an edge inside a [`ConversionGraph`](crate::ConversionGraph).
///
/// Identifiers survive unrelated insertions and removals.
pub type EdgeId = EdgeIndex<u32>;

/// Shared conversion callable.
pub type TransformFn<P> = Arc<dyn Fn(P) -> Result<P, BoxError> + Send + Sync>;

/// Weight assigned to edges that do not declare one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A directed, possibly lossy transformation from one representation to another.
///
/// Edges are immutable once built. Cloning an edge shares its callable, so a
/// clone is the *same* conversion for deduplication purposes, while two edges
/// built from independent callables between the same nodes are alternative
/// routes.
pub struct ConversionEdge<P> {
    source: String,
    target: String,
    name: String,
    weight: f64,
    native: bool,
    transform: TransformFn<P>,
}

impl<P> ConversionEdge<P> {
    /// Create a native edge with the default weight.
    ///
    /// The edge name defaults to `"{source}_to_{target}"`. Fails with
    /// [`ConvertError::Configuration`] when `source == target`: identity is a
    /// zero-length path, never an edge.
    pub fn new<F>(source: impl Into<String>, target: impl Into<String>, transform: F) -> ConvertResult<Self>
    where
        F: Fn(P) -> Result<P, BoxError> + Send + Sync + 'static,
    {
        Self::from_shared(source, target, Arc::new(transform))
    }

    /// Create an edge around an already shared callable.
    pub fn from_shared(
        source: impl Into<String>,
        target: impl Into<String>,
        transform: TransformFn<P>,
    ) -> ConvertResult<Self> {
        let source = source.into();
        let target = target.into();

        if source.is_empty() || target.is_empty() {
            return Err(ConvertError::Configuration(
                "conversion edge endpoints must be non-empty node names".into(),
            ));
        }
        if source == target {
            return Err(ConvertError::Configuration(format!(
                "self-loop conversion on '{source}' is not allowed"
            )));
        }

        Ok(Self {
            name: format!("{source}_to_{target}"),
            source,
            target,
            weight: DEFAULT_WEIGHT,
            native: true,
            transform,
        })
    }

    /// Set the declared weight. Validated when the edge enters a graph.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Mark the edge as native (first-party) or as a generic fallback.
    #[must_use]
    pub fn with_native(mut self, native: bool) -> Self {
        self.native = native;
        self
    }

    /// Override the human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Source node name.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Target node name.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Human-readable name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared weight, before the per-hop bias.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Whether the edge is a first-party conversion.
    #[inline]
    pub fn is_native(&self) -> bool {
        self.native
    }

    /// Apply the conversion.
    ///
    /// Errors from the callable propagate unchanged; the executor is the
    /// isolation boundary.
    pub fn apply(&self, program: P) -> Result<P, BoxError> {
        (self.transform)(program)
    }

    /// Whether both edges describe the same conversion: same endpoints and
    /// the same underlying callable.
    pub fn same_conversion(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && Arc::ptr_eq(&self.transform, &other.transform)
    }

    /// Check the declared weight.
    pub(crate) fn validate(&self) -> ConvertResult<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ConvertError::Configuration(format!(
                "edge '{}' has invalid weight {}; weights must be finite and non-negative",
                self.name, self.weight
            )));
        }
        Ok(())
    }
}

impl<P> Clone for ConversionEdge<P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            target: self.target.clone(),
            name: self.name.clone(),
            weight: self.weight,
            native: self.native,
            transform: Arc::clone(&self.transform),
        }
    }
}

impl<P> fmt::Debug for ConversionEdge<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEdge")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("weight", &self.weight)
            .field("native", &self.native)
            .finish_non_exhaustive()
    }
}

impl<P> fmt::Display for ConversionEdge<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
