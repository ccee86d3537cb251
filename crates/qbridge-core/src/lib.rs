//! qbridge Conversion Core
//!
//! This crate models the conversions available between quantum program
//! representations as a weighted directed multigraph, finds the cheapest
//! chain of conversions between two representations, and executes that
//! chain against a concrete program with fallback to alternative chains
//! when a conversion fails.
//!
//! # Overview
//!
//! - [`ConversionEdge`]: one directed, possibly failing transform between two
//!   named nodes
//! - [`ConversionRegistry`]: static registration point for edges and nodes
//! - [`ConversionGraph`]: path, reachability and ranking queries
//! - [`execute`] / [`execute_with_fallback`]: apply a path to a program
//! - [`Converter`]: graph plus fallback policy behind `convert` and
//!   `convert_to_best`
//!
//! # Architecture
//!
//! ```text
//! ConversionRegistry ──build──► ConversionGraph ──shortest path──► ConversionPath
//!                                     ▲                                  │
//!                                     │ exclude failed edge              ▼
//!                                     └──────────────── execute_with_fallback ──► Converted
//! ```
//!
//! Every edge costs its declared weight plus a small bias ε, so among routes
//! of equal declared weight the one with fewer hops wins. Remaining ties are
//! broken by the lexical order of the visited node names.
//!
//! # Example
//!
//! ```rust
//! use qbridge_core::{ConversionEdge, ConversionGraph, GraphOptions};
//!
//! let edges = vec![
//!     ConversionEdge::new("A", "B", |p: String| Ok(p + "b")).unwrap(),
//!     ConversionEdge::new("B", "D", |p: String| Ok(p + "d")).unwrap(),
//!     ConversionEdge::new("A", "C", |p: String| Ok(p + "c")).unwrap(),
//!     ConversionEdge::new("C", "D", |p: String| Ok(p + "d"))
//!         .unwrap()
//!         .with_weight(5.0),
//! ];
//! let graph = ConversionGraph::build(edges, &GraphOptions::new()).unwrap();
//!
//! let path = graph.shortest_path("A", "D").unwrap();
//! assert_eq!(path.nodes(), vec!["A", "B", "D"]);
//!
//! let ranked = graph.top_targets("A", &["D", "C", "B"], None).unwrap();
//! let names: Vec<&str> = ranked.iter().map(|r| r.node.as_str()).collect();
//! assert_eq!(names, vec!["B", "C", "D"]);
//! ```

pub mod config;
pub mod converter;
pub mod edge;
pub mod error;
pub mod executor;
pub mod graph;
pub mod node;
pub mod path;
pub mod registry;
pub mod search;

pub use config::{Config, ConfigError};
pub use converter::Converter;
pub use edge::{ConversionEdge, DEFAULT_WEIGHT, EdgeId, TransformFn};
pub use error::{BoxError, ConvertError, ConvertResult, ExecutionError};
pub use executor::{ConversionScheme, Converted, execute, execute_with_fallback};
pub use graph::{ConversionGraph, GraphOptions, RankedNode};
pub use node::{ExperimentType, NodeInfo, Program};
pub use path::{ConversionPath, PathStep};
pub use registry::ConversionRegistry;
pub use search::{DEFAULT_PATH_BIAS, SearchLimits};
