//! Weighted directed multigraph of available conversions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::edge::{ConversionEdge, EdgeId};
use crate::error::{ConvertError, ConvertResult};
use crate::node::{ExperimentType, NodeInfo};
use crate::path::{ConversionPath, PathStep};
use crate::registry::ConversionRegistry;
use crate::search::{
    self, DEFAULT_PATH_BIAS, Inner, SearchLimits, ShortestPaths, compare_ids,
};

/// Options controlling how a [`ConversionGraph`] is built.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOptions {
    nodes: Option<Vec<String>>,
    include_isolated: bool,
    native_only: bool,
    bias: f64,
}

impl GraphOptions {
    /// Keep every supplied edge, ε = [`DEFAULT_PATH_BIAS`].
    pub fn new() -> Self {
        Self {
            nodes: None,
            include_isolated: false,
            native_only: false,
            bias: DEFAULT_PATH_BIAS,
        }
    }

    /// Keep only edges whose endpoints are both in `nodes`.
    #[must_use]
    pub fn restrict_to<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes = Some(nodes.into_iter().map(Into::into).collect());
        self
    }

    /// Also add restriction nodes that end up without edges.
    #[must_use]
    pub fn include_isolated(mut self, include: bool) -> Self {
        self.include_isolated = include;
        self
    }

    /// Drop non-native edges.
    #[must_use]
    pub fn native_only(mut self, native_only: bool) -> Self {
        self.native_only = native_only;
        self
    }

    /// Set the per-edge bias ε.
    #[must_use]
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Restriction node set, if any.
    pub fn nodes(&self) -> Option<&[String]> {
        self.nodes.as_deref()
    }

    /// Per-edge bias ε.
    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A node ranked by its distance from (or to) a reference node.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedNode {
    /// Node name.
    pub node: String,
    /// Effective path cost.
    pub cost: f64,
    /// Number of edges on the best path.
    pub hops: usize,
}

/// Memoized unrestricted single-source results.
#[derive(Debug, Default)]
struct SearchCache {
    outgoing: FxHashMap<NodeIndex<u32>, Arc<ShortestPaths>>,
    incoming: FxHashMap<NodeIndex<u32>, Arc<ShortestPaths>>,
}

impl SearchCache {
    fn slot(&mut self, direction: Direction) -> &mut FxHashMap<NodeIndex<u32>, Arc<ShortestPaths>> {
        match direction {
            Direction::Outgoing => &mut self.outgoing,
            Direction::Incoming => &mut self.incoming,
        }
    }

    fn get(&self, origin: NodeIndex<u32>, direction: Direction) -> Option<Arc<ShortestPaths>> {
        let slot = match direction {
            Direction::Outgoing => &self.outgoing,
            Direction::Incoming => &self.incoming,
        };
        slot.get(&origin).cloned()
    }

    fn clear(&mut self) {
        self.outgoing.clear();
        self.incoming.clear();
    }
}

/// Weighted directed multigraph over program-representation names.
///
/// Queries take `&self` and may run concurrently; shortest-path trees are
/// computed lazily and memoized behind an `RwLock`. Mutations take
/// `&mut self`, so the borrow checker enforces the single-writer rule, and
/// every mutation drops the memoized trees.
pub struct ConversionGraph<P> {
    graph: Inner<P>,
    index: FxHashMap<String, NodeIndex<u32>>,
    bias: f64,
    cache: RwLock<SearchCache>,
}

impl<P> ConversionGraph<P> {
    /// Create an empty graph with the default bias.
    pub fn new() -> Self {
        Self {
            graph: Inner::default(),
            index: FxHashMap::default(),
            bias: DEFAULT_PATH_BIAS,
            cache: RwLock::new(SearchCache::default()),
        }
    }

    /// Build a graph from an edge collection.
    ///
    /// Edges identical to one already kept (same endpoints, same callable)
    /// are skipped. Fails with [`ConvertError::Configuration`] for invalid
    /// weights or bias, and when edges were supplied but the restriction
    /// left neither nodes nor edges.
    pub fn build<I>(edges: I, options: &GraphOptions) -> ConvertResult<Self>
    where
        I: IntoIterator<Item = ConversionEdge<P>>,
    {
        if !options.bias.is_finite() || options.bias < 0.0 {
            return Err(ConvertError::Configuration(format!(
                "path bias must be finite and non-negative, got {}",
                options.bias
            )));
        }

        let mut graph = Self::new();
        graph.bias = options.bias;

        let allowed: Option<FxHashSet<&str>> = options
            .nodes
            .as_ref()
            .map(|nodes| nodes.iter().map(String::as_str).collect());

        let mut supplied = 0usize;
        for edge in edges {
            supplied += 1;
            edge.validate()?;

            if options.native_only && !edge.is_native() {
                trace!("Dropping non-native edge {}", edge.name());
                continue;
            }
            if let Some(allowed) = &allowed {
                if !allowed.contains(edge.source()) || !allowed.contains(edge.target()) {
                    trace!("Edge {} lies outside the node restriction", edge.name());
                    continue;
                }
            }
            if graph.find_conversion(&edge).is_some() {
                debug!("Skipping duplicate conversion edge {}", edge.name());
                continue;
            }
            graph.insert_edge(edge);
        }

        if options.include_isolated {
            if let Some(nodes) = &options.nodes {
                for node in nodes {
                    graph.ensure_node(node);
                }
            }
        }

        if supplied > 0 && graph.node_count() == 0 && graph.edge_count() == 0 {
            return Err(ConvertError::Configuration(format!(
                "restriction removed all {supplied} supplied edge(s) and left no nodes"
            )));
        }

        debug!(
            "Built conversion graph with {} nodes and {} edges ({} supplied)",
            graph.node_count(),
            graph.edge_count(),
            supplied
        );

        Ok(graph)
    }

    /// Build a graph from a registry snapshot.
    ///
    /// Without a restriction, nodes the registry declares explicitly are kept
    /// even when no edge touches them. With a restriction, a declared node
    /// must be part of it, and one left without edges is only kept when
    /// isolated nodes are included. Registry classifications are attached
    /// to the resulting nodes.
    pub fn from_registry(registry: &ConversionRegistry<P>, options: &GraphOptions) -> ConvertResult<Self> {
        let mut graph = Self::build(registry.edges().iter().cloned(), options)?;

        for (name, experiment_type) in registry.declared_nodes() {
            let ix = match &options.nodes {
                None => graph.ensure_node(name),
                Some(nodes) if !nodes.iter().any(|n| n == name) => continue,
                Some(_) if options.include_isolated => graph.ensure_node(name),
                Some(_) => match graph.index.get(name) {
                    Some(&ix) => ix,
                    None => {
                        trace!("Declared node {} has no edges inside the restriction", name);
                        continue;
                    }
                },
            };
            if experiment_type.is_some() {
                graph.graph[ix].experiment_type = experiment_type;
            }
        }

        Ok(graph)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Per-edge bias ε used by path search.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of native edges.
    pub fn native_edge_count(&self) -> usize {
        self.graph
            .edge_indices()
            .filter(|&e| self.graph[e].is_native())
            .count()
    }

    /// Whether `name` is a node of this graph.
    pub fn has_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Node names in lexical order.
    pub fn nodes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All edges, ordered by identifier.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &ConversionEdge<P>)> + '_ {
        let mut ids: Vec<EdgeId> = self.graph.edge_indices().collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| (id, &self.graph[id]))
    }

    /// Look up an edge by identifier.
    pub fn edge(&self, id: EdgeId) -> Option<&ConversionEdge<P>> {
        self.graph.edge_weight(id)
    }

    /// Every edge from `source` to `target`, ordered by identifier.
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<(EdgeId, &ConversionEdge<P>)> {
        let (Some(&a), Some(&b)) = (self.index.get(source), self.index.get(target)) else {
            return Vec::new();
        };
        let mut found: Vec<_> = self
            .graph
            .edges_directed(a, Direction::Outgoing)
            .filter(|e| e.target() == b)
            .map(|e| (e.id(), e.weight()))
            .collect();
        found.sort_unstable_by_key(|(id, _)| *id);
        found
    }

    /// Whether a direct edge exists from `source` to `target`.
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        !self.edges_between(source, target).is_empty()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Register an isolated node. Returns `false` if it already existed.
    pub fn add_node(&mut self, name: &str) -> bool {
        if self.has_node(name) {
            return false;
        }
        self.ensure_node(name);
        self.invalidate();
        true
    }

    /// Remove a node and every edge touching it. Returns the number of
    /// removed edges.
    pub fn remove_node(&mut self, name: &str) -> ConvertResult<usize> {
        let ix = self.node_index(name)?;
        let before = self.graph.edge_count();
        self.graph.remove_node(ix);
        self.index.remove(name);
        self.invalidate();
        let removed = before - self.graph.edge_count();
        debug!("Removed node {} and {} incident edge(s)", name, removed);
        Ok(removed)
    }

    /// Add an edge without rebuilding the graph, creating missing endpoints.
    ///
    /// Adding a conversion that is already present returns the existing
    /// identifier.
    pub fn add_edge(&mut self, edge: ConversionEdge<P>) -> ConvertResult<EdgeId> {
        edge.validate()?;
        if let Some(existing) = self.find_conversion(&edge) {
            debug!("Conversion {} already present as {:?}", edge.name(), existing);
            return Ok(existing);
        }
        let id = self.insert_edge(edge);
        self.invalidate();
        Ok(id)
    }

    /// Remove an edge by identifier. Its endpoints stay in the graph.
    pub fn remove_edge(&mut self, id: EdgeId) -> ConvertResult<ConversionEdge<P>> {
        let edge = self
            .graph
            .remove_edge(id)
            .ok_or(ConvertError::EdgeNotFound(id))?;
        self.invalidate();
        debug!("Removed conversion edge {}", edge.name());
        Ok(edge)
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Attach a classification to a node.
    pub fn set_experiment_type(&mut self, name: &str, experiment_type: ExperimentType) -> ConvertResult<()> {
        let ix = self.node_index(name)?;
        self.graph[ix].experiment_type = Some(experiment_type);
        Ok(())
    }

    /// Classification of a node, if any.
    pub fn experiment_type(&self, name: &str) -> Option<ExperimentType> {
        self.index
            .get(name)
            .and_then(|&ix| self.graph[ix].experiment_type)
    }

    /// Classified nodes and their category.
    pub fn experiment_types_by_node(&self) -> BTreeMap<String, ExperimentType> {
        self.node_infos()
            .filter_map(|info| info.experiment_type.map(|ty| (info.name.clone(), ty)))
            .collect()
    }

    /// Nodes of the given category, in lexical order.
    pub fn nodes_by_experiment_type(&self, experiment_type: ExperimentType) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .node_infos()
            .filter(|info| info.experiment_type == Some(experiment_type))
            .map(|info| info.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    // ------------------------------------------------------------------
    // Path queries
    // ------------------------------------------------------------------

    /// Whether `target` can be produced from `source`.
    ///
    /// Unknown nodes yield `false`; a node always reaches itself.
    pub fn has_path(&self, source: &str, target: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };
        a == b || self.tree(a, Direction::Outgoing).route(b).is_some()
    }

    /// Lowest-cost path from `source` to `target`.
    pub fn shortest_path(&self, source: &str, target: &str) -> ConvertResult<ConversionPath<P>> {
        self.shortest_path_with(source, target, &SearchLimits::new())
    }

    /// Lowest-cost path under the given limits.
    pub fn shortest_path_with(
        &self,
        source: &str,
        target: &str,
        limits: &SearchLimits,
    ) -> ConvertResult<ConversionPath<P>> {
        let a = self.node_index(source)?;
        let b = self.node_index(target)?;
        if a == b {
            return Ok(ConversionPath::identity(source));
        }

        let tree = self.search(a, Direction::Outgoing, limits);
        let route = tree.route(b).ok_or_else(|| ConvertError::NoPath {
            from: source.to_string(),
            to: target.to_string(),
        })?;
        Ok(self.assemble(source, &route.edges))
    }

    /// Effective cost of the lowest-cost path; `0.0` when `source == target`.
    pub fn shortest_path_cost(&self, source: &str, target: &str) -> ConvertResult<f64> {
        let a = self.node_index(source)?;
        let b = self.node_index(target)?;
        if a == b {
            return Ok(0.0);
        }
        self.tree(a, Direction::Outgoing)
            .route(b)
            .map(|route| route.cost)
            .ok_or_else(|| ConvertError::NoPath {
                from: source.to_string(),
                to: target.to_string(),
            })
    }

    /// Every simple path with at most `max_hops` edges, cheapest first.
    pub fn all_paths(&self, source: &str, target: &str, max_hops: usize) -> ConvertResult<Vec<ConversionPath<P>>> {
        let a = self.node_index(source)?;
        let b = self.node_index(target)?;
        if a == b {
            return Ok(vec![ConversionPath::identity(source)]);
        }

        let mut paths: Vec<ConversionPath<P>> = search::simple_paths(&self.graph, a, b, max_hops)
            .iter()
            .map(|edges| self.assemble(source, edges))
            .collect();
        paths.sort_by(|x, y| {
            x.cost()
                .total_cmp(&y.cost())
                .then_with(|| x.hops().cmp(&y.hops()))
                .then_with(|| x.nodes().cmp(&y.nodes()))
                .then_with(|| compare_ids(&x.edge_ids(), &y.edge_ids()))
        });
        Ok(paths)
    }

    /// Rank the candidates reachable from `source` by ascending cost, then
    /// hops, then name. Unreachable or unknown candidates are left out; an
    /// empty result means none is reachable.
    pub fn top_targets<S: AsRef<str>>(
        &self,
        source: &str,
        candidates: &[S],
        k: Option<usize>,
    ) -> ConvertResult<Vec<RankedNode>> {
        self.rank(source, Direction::Outgoing, candidates, k, &SearchLimits::new())
    }

    /// Rank the candidates reachable from `source` under the given limits.
    ///
    /// Candidates whose best route needs more hops than `limits` allows are
    /// ranked by their best route within the bound, or left out.
    pub fn top_targets_with<S: AsRef<str>>(
        &self,
        source: &str,
        candidates: &[S],
        k: Option<usize>,
        limits: &SearchLimits,
    ) -> ConvertResult<Vec<RankedNode>> {
        self.rank(source, Direction::Outgoing, candidates, k, limits)
    }

    /// Rank the candidates that can produce `target`, cheapest first.
    pub fn top_sources<S: AsRef<str>>(
        &self,
        target: &str,
        candidates: &[S],
        k: Option<usize>,
    ) -> ConvertResult<Vec<RankedNode>> {
        self.rank(target, Direction::Incoming, candidates, k, &SearchLimits::new())
    }

    /// Every node reachable from `source`, ranked like [`Self::top_targets`].
    pub fn reachable_from(&self, source: &str) -> ConvertResult<Vec<RankedNode>> {
        let all: Vec<&str> = self.nodes();
        self.rank(source, Direction::Outgoing, &all, None, &SearchLimits::new())
    }

    fn rank<S: AsRef<str>>(
        &self,
        origin: &str,
        direction: Direction,
        candidates: &[S],
        k: Option<usize>,
        limits: &SearchLimits,
    ) -> ConvertResult<Vec<RankedNode>> {
        let origin_ix = self.node_index(origin)?;
        let tree = self.search(origin_ix, direction, limits);

        let mut seen = FxHashSet::default();
        let mut ranked: Vec<RankedNode> = candidates
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| seen.insert(*name))
            .filter_map(|name| {
                let ix = *self.index.get(name)?;
                let route = tree.route(ix)?;
                Some(RankedNode {
                    node: name.to_string(),
                    cost: route.cost,
                    hops: route.hops(),
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.cost
                .total_cmp(&b.cost)
                .then_with(|| a.hops.cmp(&b.hops))
                .then_with(|| a.node.cmp(&b.node))
        });
        if let Some(k) = k {
            ranked.truncate(k);
        }
        Ok(ranked)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn node_index(&self, name: &str) -> ConvertResult<NodeIndex<u32>> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ConvertError::UnregisteredNode(name.to_string()))
    }

    fn node_infos(&self) -> impl Iterator<Item = &NodeInfo> + '_ {
        self.graph.node_indices().map(|ix| &self.graph[ix])
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex<u32> {
        if let Some(&ix) = self.index.get(name) {
            return ix;
        }
        let ix = self.graph.add_node(NodeInfo::new(name));
        self.index.insert(name.to_string(), ix);
        ix
    }

    fn insert_edge(&mut self, edge: ConversionEdge<P>) -> EdgeId {
        let a = self.ensure_node(edge.source());
        let b = self.ensure_node(edge.target());
        self.graph.add_edge(a, b, edge)
    }

    fn find_conversion(&self, edge: &ConversionEdge<P>) -> Option<EdgeId> {
        let a = *self.index.get(edge.source())?;
        let b = *self.index.get(edge.target())?;
        self.graph
            .edges_directed(a, Direction::Outgoing)
            .filter(|e| e.target() == b)
            .find_map(|e| e.weight().same_conversion(edge).then(|| e.id()))
    }

    fn assemble(&self, source: &str, edges: &[EdgeId]) -> ConversionPath<P> {
        let steps = edges
            .iter()
            .map(|&id| PathStep {
                id,
                edge: self.graph[id].clone(),
            })
            .collect();
        ConversionPath::from_steps(source.to_string(), steps, self.bias)
    }

    fn tree(&self, origin: NodeIndex<u32>, direction: Direction) -> Arc<ShortestPaths> {
        self.search(origin, direction, &SearchLimits::new())
    }

    fn search(&self, origin: NodeIndex<u32>, direction: Direction, limits: &SearchLimits) -> Arc<ShortestPaths> {
        if !limits.is_unrestricted() {
            return Arc::new(search::shortest_paths(
                &self.graph,
                origin,
                direction,
                self.bias,
                limits,
            ));
        }

        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(origin, direction)
        {
            return hit;
        }

        let computed = Arc::new(search::shortest_paths(
            &self.graph,
            origin,
            direction,
            self.bias,
            limits,
        ));
        trace!(
            "Cached {:?} search from {} ({} reachable)",
            direction,
            self.graph[origin].name,
            computed.len()
        );

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.slot(direction).entry(origin).or_insert(computed))
    }

    fn invalidate(&mut self) {
        self.cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<P> Default for ConversionGraph<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for ConversionGraph<P> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            index: self.index.clone(),
            bias: self.bias,
            cache: RwLock::new(SearchCache::default()),
        }
    }
}

impl<P> fmt::Debug for ConversionGraph<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionGraph")
            .field("nodes", &self.nodes())
            .field("edges", &self.edge_count())
            .field("bias", &self.bias)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = DEFAULT_PATH_BIAS;

    fn edge(source: &str, target: &str, weight: f64) -> ConversionEdge<String> {
        let tag = target.to_string();
        ConversionEdge::new(source, target, move |s: String| Ok(format!("{s}>{tag}")))
            .unwrap()
            .with_weight(weight)
    }

    /// A→B(1), B→D(1), A→C(1), C→D(5).
    fn diamond() -> Vec<ConversionEdge<String>> {
        vec![
            edge("A", "B", 1.0),
            edge("B", "D", 1.0),
            edge("A", "C", 1.0),
            edge("C", "D", 5.0),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_graph() {
        let graph: ConversionGraph<String> = ConversionGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert!(!graph.has_path("A", "A"));
    }

    #[test]
    fn test_build_from_nothing_is_ok() {
        let graph = ConversionGraph::<String>::build(Vec::new(), &GraphOptions::new()).unwrap();
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_self_cost_is_zero() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        for node in ["A", "B", "C", "D"] {
            assert_eq!(graph.shortest_path_cost(node, node).unwrap(), 0.0);
            assert!(graph.has_path(node, node));
        }
    }

    #[test]
    fn test_single_edge_cost() {
        let graph = ConversionGraph::build(vec![edge("a", "b", 0.7)], &GraphOptions::new()).unwrap();
        assert!(approx(graph.shortest_path_cost("a", "b").unwrap(), 0.7 + EPS));
        assert!(graph.has_path("a", "b"));
        assert!(!graph.has_path("b", "a"));
    }

    #[test]
    fn test_diamond_shortest_path() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let cost = graph.shortest_path_cost("A", "D").unwrap();
        assert!(approx(cost, 2.0 + 2.0 * EPS));

        let path = graph.shortest_path("A", "D").unwrap();
        assert_eq!(path.nodes(), vec!["A", "B", "D"]);
        assert!(approx(path.cost(), cost));
    }

    #[test]
    fn test_diamond_top_targets() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let ranked = graph.top_targets("A", &["B", "C", "D"], None).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.node.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "D"]);
        assert_eq!(ranked[2].hops, 2);

        let top1 = graph.top_targets("A", &["D", "C"], Some(1)).unwrap();
        assert_eq!(top1.len(), 1);
        assert_eq!(top1[0].node, "C");
    }

    #[test]
    fn test_top_targets_excludes_unreachable() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let ranked = graph.top_targets("B", &["A", "C", "missing"], None).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_top_targets_includes_source_at_zero() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let ranked = graph.top_targets("A", &["D", "A", "A"], None).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].node, "A");
        assert_eq!(ranked[0].cost, 0.0);
    }

    #[test]
    fn test_top_targets_with_hop_bound() {
        let graph = ConversionGraph::build(
            vec![edge("s", "m", 0.1), edge("m", "x", 0.1), edge("s", "y", 5.0)],
            &GraphOptions::new(),
        )
        .unwrap();

        let unbounded = graph.top_targets("s", &["x", "y"], None).unwrap();
        assert_eq!(unbounded[0].node, "x");

        let limits = SearchLimits::new().with_max_hops(Some(1));
        let bounded = graph.top_targets_with("s", &["x", "y"], None, &limits).unwrap();
        let names: Vec<&str> = bounded.iter().map(|r| r.node.as_str()).collect();
        assert_eq!(names, vec!["y"]);
    }

    #[test]
    fn test_top_targets_unknown_source() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let err = graph.top_targets("Z", &["A"], None).unwrap_err();
        assert!(matches!(err, ConvertError::UnregisteredNode(n) if n == "Z"));
    }

    #[test]
    fn test_top_sources() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let ranked = graph.top_sources("D", &["A", "B", "C"], None).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.node.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_bias_prefers_direct_edge() {
        let graph = ConversionGraph::build(
            vec![edge("a", "b", 1.0), edge("b", "c", 1.0), edge("a", "c", 2.0)],
            &GraphOptions::new(),
        )
        .unwrap();
        let path = graph.shortest_path("a", "c").unwrap();
        assert_eq!(path.hops(), 1);
        assert!(approx(graph.shortest_path_cost("a", "c").unwrap(), 2.0 + EPS));
    }

    #[test]
    fn test_zero_bias_still_deterministic() {
        let options = GraphOptions::new().with_bias(0.0);
        let graph = ConversionGraph::build(
            vec![edge("a", "b", 1.0), edge("b", "c", 1.0), edge("a", "c", 2.0)],
            &options,
        )
        .unwrap();
        // Equal cost, fewer hops wins.
        assert_eq!(graph.shortest_path("a", "c").unwrap().hops(), 1);
    }

    #[test]
    fn test_restriction_drops_outside_nodes() {
        let options = GraphOptions::new().restrict_to(["A", "B"]);
        let graph = ConversionGraph::build(diamond(), &options).unwrap();
        assert_eq!(graph.nodes(), vec!["A", "B"]);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.has_path("A", "D"));
        assert!(matches!(
            graph.shortest_path_cost("A", "D"),
            Err(ConvertError::UnregisteredNode(n)) if n == "D"
        ));
    }

    #[test]
    fn test_restriction_with_isolated_nodes() {
        let options = GraphOptions::new()
            .restrict_to(["A", "B", "E"])
            .include_isolated(true);
        let graph = ConversionGraph::build(diamond(), &options).unwrap();
        assert_eq!(graph.nodes(), vec!["A", "B", "E"]);

        let without = GraphOptions::new().restrict_to(["A", "B", "E"]);
        let graph = ConversionGraph::build(diamond(), &without).unwrap();
        assert_eq!(graph.nodes(), vec!["A", "B"]);
    }

    #[test]
    fn test_degenerate_restriction_is_configuration_error() {
        let options = GraphOptions::new().restrict_to(["X", "Y"]);
        let err = ConversionGraph::build(diamond(), &options).unwrap_err();
        assert!(matches!(err, ConvertError::Configuration(_)));
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let err = ConversionGraph::build(vec![edge("a", "b", -2.0)], &GraphOptions::new()).unwrap_err();
        assert!(matches!(err, ConvertError::Configuration(_)));
    }

    #[test]
    fn test_invalid_bias_rejected() {
        let options = GraphOptions::new().with_bias(f64::INFINITY);
        assert!(ConversionGraph::build(diamond(), &options).is_err());
    }

    #[test]
    fn test_native_only() {
        let edges = vec![edge("a", "b", 1.0), edge("b", "c", 1.0).with_native(false)];
        let graph = ConversionGraph::build(edges, &GraphOptions::new().native_only(true)).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.has_node("c"));
    }

    #[test]
    fn test_duplicate_edges_deduplicated() {
        let e = edge("a", "b", 1.0);
        let graph = ConversionGraph::build(vec![e.clone(), e, edge("a", "b", 3.0)], &GraphOptions::new()).unwrap();
        // The clone is the same conversion; the independent edge is kept.
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_between("a", "b").len(), 2);
    }

    #[test]
    fn test_multi_edge_picks_cheapest() {
        let graph = ConversionGraph::build(
            vec![edge("a", "b", 3.0), edge("a", "b", 0.5)],
            &GraphOptions::new(),
        )
        .unwrap();
        let path = graph.shortest_path("a", "b").unwrap();
        assert!(approx(path.raw_weight(), 0.5));
    }

    #[test]
    fn test_add_edge_invalidates_cache() {
        let mut graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        assert!(approx(graph.shortest_path_cost("A", "D").unwrap(), 2.0 + 2.0 * EPS));

        let id = graph.add_edge(edge("A", "D", 0.5)).unwrap();
        assert!(approx(graph.shortest_path_cost("A", "D").unwrap(), 0.5 + EPS));

        graph.remove_edge(id).unwrap();
        assert!(approx(graph.shortest_path_cost("A", "D").unwrap(), 2.0 + 2.0 * EPS));
    }

    #[test]
    fn test_add_existing_conversion_returns_same_id() {
        let e = edge("a", "b", 1.0);
        let mut graph = ConversionGraph::new();
        let first = graph.add_edge(e.clone()).unwrap();
        let second = graph.add_edge(e).unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_missing_edge() {
        let mut graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let id = graph.edges().next().unwrap().0;
        graph.remove_edge(id).unwrap();
        assert!(matches!(graph.remove_edge(id), Err(ConvertError::EdgeNotFound(_))));
    }

    #[test]
    fn test_remove_node() {
        let mut graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        assert_eq!(graph.remove_node("B").unwrap(), 2);
        assert!(!graph.has_node("B"));
        assert!(approx(graph.shortest_path_cost("A", "D").unwrap(), 6.0 + 2.0 * EPS));
        assert!(graph.remove_node("B").is_err());
    }

    #[test]
    fn test_add_isolated_node() {
        let mut graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        assert!(graph.add_node("E"));
        assert!(!graph.add_node("E"));
        assert!(graph.has_path("E", "E"));
        assert!(!graph.has_path("A", "E"));
        assert!(matches!(
            graph.shortest_path("A", "E"),
            Err(ConvertError::NoPath { .. })
        ));
    }

    #[test]
    fn test_all_paths_sorted() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let paths = graph.all_paths("A", "D", 5).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].nodes(), vec!["A", "B", "D"]);
        assert_eq!(paths[1].nodes(), vec!["A", "C", "D"]);
        assert_eq!(graph.all_paths("A", "A", 5).unwrap()[0].hops(), 0);
    }

    #[test]
    fn test_experiment_types() {
        let mut graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        graph.set_experiment_type("A", ExperimentType::GateModel).unwrap();
        graph.set_experiment_type("D", ExperimentType::Annealing).unwrap();
        assert!(graph.set_experiment_type("Z", ExperimentType::Other).is_err());

        let by_node = graph.experiment_types_by_node();
        assert_eq!(by_node.len(), 2);
        assert_eq!(by_node["D"], ExperimentType::Annealing);
        assert_eq!(graph.nodes_by_experiment_type(ExperimentType::GateModel), vec!["A"]);
        assert_eq!(graph.experiment_type("B"), None);

        // Classification never changes routing.
        assert!(approx(graph.shortest_path_cost("A", "D").unwrap(), 2.0 + 2.0 * EPS));
    }

    #[test]
    fn test_reachable_from() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let names: Vec<String> = graph
            .reachable_from("A")
            .unwrap()
            .into_iter()
            .map(|r| r.node)
            .collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let graph = ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap();
        let _ = graph.shortest_path_cost("A", "D").unwrap();
        let mut copy = graph.clone();
        copy.remove_node("D").unwrap();
        assert!(graph.has_path("A", "D"));
        assert!(!copy.has_path("A", "D"));
    }

    #[test]
    fn test_concurrent_queries() {
        let graph = Arc::new(ConversionGraph::build(diamond(), &GraphOptions::new()).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let graph = Arc::clone(&graph);
                std::thread::spawn(move || {
                    graph
                        .top_targets("A", &["B", "C", "D"], None)
                        .unwrap()
                        .into_iter()
                        .map(|r| r.node)
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec!["B", "C", "D"]);
        }
    }
}
