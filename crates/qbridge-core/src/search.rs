//! Shortest-path search over the conversion graph.
//!
//! Every edge costs its declared weight plus a fixed bias ε. Among routes of
//! equal declared weight the bias favours fewer hops; remaining ties are
//! broken by the lexical order of the visited node names, then by edge
//! identifier, so results are reproducible across runs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::edge::{ConversionEdge, EdgeId};
use crate::node::NodeInfo;

/// Default per-edge bias ε.
pub const DEFAULT_PATH_BIAS: f64 = 1e-3;

/// Storage type shared by the graph and the search routines.
pub(crate) type Inner<P> = StableDiGraph<NodeInfo, ConversionEdge<P>, u32>;

/// Restrictions applied to a single search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of edges a route may use.
    pub max_hops: Option<usize>,
    /// Edges the search must not traverse.
    pub excluded: FxHashSet<EdgeId>,
}

impl SearchLimits {
    /// No restrictions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of edges per route.
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: Option<usize>) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Exclude the given edges.
    #[must_use]
    pub fn excluding(mut self, edges: impl IntoIterator<Item = EdgeId>) -> Self {
        self.excluded.extend(edges);
        self
    }

    /// Exclude one more edge.
    pub fn exclude(&mut self, edge: EdgeId) -> bool {
        self.excluded.insert(edge)
    }

    /// Whether the limits leave the graph untouched. Only unrestricted
    /// results are memoized.
    pub fn is_unrestricted(&self) -> bool {
        self.max_hops.is_none() && self.excluded.is_empty()
    }
}

/// Best route from the search origin to one node.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    /// Effective cost (weights plus bias).
    pub cost: f64,
    /// Edges in walk order. For a reverse search this is the order in which
    /// edges were discovered walking backwards from the origin.
    pub edges: Vec<EdgeId>,
}

impl Route {
    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

/// Single-source search result.
#[derive(Debug, Default)]
pub(crate) struct ShortestPaths {
    routes: FxHashMap<NodeIndex<u32>, Route>,
}

impl ShortestPaths {
    pub fn route(&self, node: NodeIndex<u32>) -> Option<&Route> {
        self.routes.get(&node)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

/// Frontier entry. Ordered so that `BinaryHeap` pops the cheapest first.
#[derive(Debug)]
struct Candidate {
    cost: f64,
    node: NodeIndex<u32>,
    names: Vec<String>,
    edges: Vec<EdgeId>,
}

impl Candidate {
    fn rank(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.edges.len().cmp(&other.edges.len()))
            .then_with(|| self.names.cmp(&other.names))
            .then_with(|| compare_ids(&self.edges, &other.edges))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap
        other.rank(self)
    }
}

pub(crate) fn compare_ids(a: &[EdgeId], b: &[EdgeId]) -> Ordering {
    a.iter().map(|e| e.index()).cmp(b.iter().map(|e| e.index()))
}

/// Dijkstra from `origin` following edges in `direction`.
///
/// With a hop bound the search runs over (node, hops) states and drops a
/// state only when the same node was already settled with no more hops, so
/// the bound is exact rather than a post-filter.
pub(crate) fn shortest_paths<P>(
    graph: &Inner<P>,
    origin: NodeIndex<u32>,
    direction: Direction,
    bias: f64,
    limits: &SearchLimits,
) -> ShortestPaths {
    let mut routes: FxHashMap<NodeIndex<u32>, Route> = FxHashMap::default();
    let mut settled_hops: FxHashMap<NodeIndex<u32>, usize> = FxHashMap::default();
    let mut heap = BinaryHeap::new();

    heap.push(Candidate {
        cost: 0.0,
        node: origin,
        names: Vec::new(),
        edges: Vec::new(),
    });

    while let Some(candidate) = heap.pop() {
        let hops = candidate.edges.len();

        if let Some(&best) = settled_hops.get(&candidate.node) {
            if limits.max_hops.is_none() || best <= hops {
                continue;
            }
        }
        settled_hops.insert(candidate.node, hops);

        routes.entry(candidate.node).or_insert_with(|| Route {
            cost: candidate.cost,
            edges: candidate.edges.clone(),
        });

        if limits.max_hops.is_some_and(|max| hops >= max) {
            continue;
        }

        for edge_ref in graph.edges_directed(candidate.node, direction) {
            let id = edge_ref.id();
            if limits.excluded.contains(&id) {
                continue;
            }
            let Some((from, to)) = graph.edge_endpoints(id) else {
                continue;
            };
            let next = match direction {
                Direction::Outgoing => to,
                Direction::Incoming => from,
            };
            if settled_hops.get(&next).is_some_and(|&best| best <= hops + 1) {
                continue;
            }

            let mut names = candidate.names.clone();
            names.push(graph[next].name.clone());
            let mut edges = candidate.edges.clone();
            edges.push(id);

            heap.push(Candidate {
                cost: candidate.cost + edge_ref.weight().weight() + bias,
                node: next,
                names,
                edges,
            });
        }
    }

    ShortestPaths { routes }
}

/// Every simple path from `from` to `to` with at most `max_hops` edges.
pub(crate) fn simple_paths<P>(
    graph: &Inner<P>,
    from: NodeIndex<u32>,
    to: NodeIndex<u32>,
    max_hops: usize,
) -> Vec<Vec<EdgeId>> {
    let mut found = Vec::new();
    let mut visited = vec![from];
    let mut trail = Vec::new();
    walk(graph, from, to, max_hops, &mut visited, &mut trail, &mut found);
    found
}

fn walk<P>(
    graph: &Inner<P>,
    node: NodeIndex<u32>,
    to: NodeIndex<u32>,
    max_hops: usize,
    visited: &mut Vec<NodeIndex<u32>>,
    trail: &mut Vec<EdgeId>,
    found: &mut Vec<Vec<EdgeId>>,
) {
    if trail.len() >= max_hops {
        return;
    }
    for edge_ref in graph.edges_directed(node, Direction::Outgoing) {
        let next = edge_ref.target();
        if visited.contains(&next) {
            continue;
        }
        trail.push(edge_ref.id());
        if next == to {
            found.push(trail.clone());
        } else {
            visited.push(next);
            walk(graph, next, to, max_hops, visited, trail, found);
            visited.pop();
        }
        trail.pop();
    }
}
