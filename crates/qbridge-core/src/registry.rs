//! Conversion registry for collecting available edges.
//!
//! The [`ConversionRegistry`] is the static registration point that plugin
//! discovery feeds into. Graphs are built from a snapshot of it with
//! [`ConversionGraph::from_registry`](crate::ConversionGraph::from_registry).

use std::collections::BTreeMap;

use tracing::debug;

use crate::edge::ConversionEdge;
use crate::error::{BoxError, ConvertResult};
use crate::node::ExperimentType;

/// Central registry of conversions and representation nodes.
pub struct ConversionRegistry<P> {
    /// Registered edges in registration order.
    edges: Vec<ConversionEdge<P>>,
    /// Explicitly declared nodes and their optional classification.
    nodes: BTreeMap<String, Option<ExperimentType>>,
}

impl<P> ConversionRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            nodes: BTreeMap::new(),
        }
    }

    /// Register a native conversion with the default weight.
    pub fn register<F>(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        transform: F,
    ) -> ConvertResult<()>
    where
        F: Fn(P) -> Result<P, BoxError> + Send + Sync + 'static,
    {
        let edge = ConversionEdge::new(source, target, transform)?;
        self.register_edge(edge)
    }

    /// Register a fully configured edge.
    ///
    /// Registering the same conversion twice is a no-op.
    pub fn register_edge(&mut self, edge: ConversionEdge<P>) -> ConvertResult<()> {
        edge.validate()?;
        if self.edges.iter().any(|e| e.same_conversion(&edge)) {
            debug!("Conversion {} already registered", edge.name());
            return Ok(());
        }
        debug!("Registering conversion: {}", edge.name());
        self.edges.push(edge);
        Ok(())
    }

    /// Declare a node explicitly, optionally classifying it.
    ///
    /// Declared nodes appear in built graphs even when no edge touches them.
    /// Re-declaring a node with `None` keeps an earlier classification.
    pub fn register_node(&mut self, name: impl Into<String>, experiment_type: Option<ExperimentType>) {
        let slot = self.nodes.entry(name.into()).or_insert(None);
        if experiment_type.is_some() {
            *slot = experiment_type;
        }
    }

    /// Registered edges in registration order.
    pub fn edges(&self) -> &[ConversionEdge<P>] {
        &self.edges
    }

    /// Explicitly declared nodes with their classification, in lexical order.
    pub fn declared_nodes(&self) -> impl Iterator<Item = (&str, Option<ExperimentType>)> + '_ {
        self.nodes.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Every node mentioned by an edge or a declaration, sorted and unique.
    pub fn nodes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.source(), e.target()])
            .chain(self.nodes.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Whether a direct conversion from `source` to `target` is registered.
    pub fn has_conversion(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source() == source && e.target() == target)
    }

    /// Number of registered edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edge is registered.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl<P> Default for ConversionRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
