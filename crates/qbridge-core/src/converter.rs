//! High-level conversion entry points.

use tracing::{debug, info, instrument};

use crate::error::{ConvertError, ConvertResult};
use crate::executor::{ConversionScheme, Converted, execute, execute_with_fallback};
use crate::graph::{ConversionGraph, GraphOptions};
use crate::node::Program;
use crate::path::ConversionPath;
use crate::registry::ConversionRegistry;
use crate::search::SearchLimits;

/// Graph plus fallback policy.
///
/// This is the surface other subsystems depend on: it converts program
/// payloads between named representations and picks the cheapest target
/// among candidates.
///
/// # Example
///
/// ```
/// use qbridge_core::{ConversionRegistry, Converter, GraphOptions};
///
/// let mut registry = ConversionRegistry::new();
/// registry.register("upper", "lower", |s: String| Ok(s.to_lowercase())).unwrap();
///
/// let converter = Converter::from_registry(&registry, &GraphOptions::new()).unwrap();
/// let converted = converter.convert(&"HELLO".to_string(), "upper", "lower").unwrap();
/// assert_eq!(converted.program, "hello");
/// ```
#[derive(Debug, Clone)]
pub struct Converter<P> {
    graph: ConversionGraph<P>,
    scheme: ConversionScheme,
}

impl<P: Clone> Converter<P> {
    /// Wrap a graph with the default scheme.
    pub fn new(graph: ConversionGraph<P>) -> Self {
        Self {
            graph,
            scheme: ConversionScheme::default(),
        }
    }

    /// Build the graph from a registry snapshot.
    pub fn from_registry(registry: &ConversionRegistry<P>, options: &GraphOptions) -> ConvertResult<Self> {
        Ok(Self::new(ConversionGraph::from_registry(registry, options)?))
    }

    /// Replace the fallback scheme.
    pub fn with_scheme(mut self, scheme: ConversionScheme) -> ConvertResult<Self> {
        if scheme.max_path_attempts == 0 {
            return Err(ConvertError::Configuration(
                "max_path_attempts must be at least 1".into(),
            ));
        }
        self.scheme = scheme;
        Ok(self)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &ConversionGraph<P> {
        &self.graph
    }

    /// Mutable access to the graph for incremental updates.
    pub fn graph_mut(&mut self) -> &mut ConversionGraph<P> {
        &mut self.graph
    }

    /// The active scheme.
    pub fn scheme(&self) -> &ConversionScheme {
        &self.scheme
    }

    /// Convert `payload` from `from` to `to`, falling back to alternative
    /// paths when an edge fails.
    pub fn convert(&self, payload: &P, from: &str, to: &str) -> ConvertResult<Converted<P>> {
        execute_with_fallback(payload, from, to, &self.graph, &self.scheme)
    }

    /// Walk one given path without fallback.
    ///
    /// A failing edge surfaces as [`ConvertError::Execution`].
    pub fn convert_along(&self, payload: P, path: &ConversionPath<P>) -> ConvertResult<P> {
        Ok(execute(payload, path)?)
    }

    /// Convert a tagged program, returning it re-tagged with `to`.
    pub fn convert_program(&self, program: Program<P>, to: &str) -> ConvertResult<Program<P>> {
        let converted = self.convert(&program.payload, &program.node, to)?;
        Ok(Program::new(converted.node, converted.program))
    }

    /// Convert toward the cheapest reachable candidate.
    ///
    /// Candidates are ranked within the scheme's depth bound and tried in
    /// rank order. When conversion toward one fails after fallback, the next
    /// is tried. Fails with [`ConvertError::NoReachableTarget`] when no
    /// candidate is reachable, or with the last [`ConvertError::Exhausted`]
    /// when every candidate failed.
    #[instrument(skip(self, payload, candidates), level = "debug")]
    pub fn convert_to_best<S: AsRef<str>>(
        &self,
        payload: &P,
        from: &str,
        candidates: &[S],
    ) -> ConvertResult<Converted<P>> {
        let limits = SearchLimits::new().with_max_hops(self.scheme.max_path_depth);
        let ranked = self.graph.top_targets_with(from, candidates, None, &limits)?;
        if ranked.is_empty() {
            return Err(ConvertError::NoReachableTarget {
                from: from.to_string(),
                candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
            });
        }

        let mut last_error = None;
        for candidate in &ranked {
            debug!("Trying target {} (cost {:.4})", candidate.node, candidate.cost);
            match self.convert(payload, from, &candidate.node) {
                Ok(converted) => {
                    info!("Selected target {}", converted.node);
                    return Ok(converted);
                }
                Err(e @ ConvertError::Exhausted { .. }) => last_error = Some(e),
                Err(ConvertError::NoPath { .. }) => {
                    debug!("Target {} became unreachable", candidate.node);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ConvertError::NoReachableTarget {
            from: from.to_string(),
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::ConversionEdge;

    fn converter() -> Converter<String> {
        let mut registry = ConversionRegistry::new();
        registry
            .register("a", "b", |s: String| Ok(format!("{s}b")))
            .unwrap();
        registry
            .register("a", "c", |_: String| Err("lossy".into()))
            .unwrap();
        registry
            .register_edge(
                ConversionEdge::new("b", "d", |s: String| Ok(format!("{s}d")))
                    .unwrap()
                    .with_weight(3.0),
            )
            .unwrap();
        Converter::from_registry(&registry, &GraphOptions::new()).unwrap()
    }

    #[test]
    fn test_convert() {
        let converted = converter().convert(&"a".to_string(), "a", "d").unwrap();
        assert_eq!(converted.program, "abd");
        assert_eq!(converted.path.hops(), 2);
    }

    #[test]
    fn test_convert_program_retags() {
        let program = Program::new("a", "x".to_string());
        let out = converter().convert_program(program, "b").unwrap();
        assert_eq!(out.node, "b");
        assert_eq!(out.payload, "xb");
    }

    #[test]
    fn test_convert_to_best_skips_failing_candidate() {
        // c ranks ahead of d (cheaper) but its only edge fails.
        let converted = converter()
            .convert_to_best(&String::new(), "a", &["d", "c"])
            .unwrap();
        assert_eq!(converted.node, "d");
    }

    #[test]
    fn test_convert_to_best_picks_cheapest() {
        let converted = converter()
            .convert_to_best(&String::new(), "a", &["d", "b"])
            .unwrap();
        assert_eq!(converted.node, "b");
    }

    #[test]
    fn test_convert_to_best_unreachable() {
        let err = converter()
            .convert_to_best(&String::new(), "d", &["a", "zzz"])
            .unwrap_err();
        assert!(matches!(err, ConvertError::NoReachableTarget { .. }));
    }

    #[test]
    fn test_convert_to_best_all_fail() {
        let err = converter()
            .convert_to_best(&String::new(), "a", &["c"])
            .unwrap_err();
        assert!(matches!(err, ConvertError::Exhausted { .. }));
    }

    #[test]
    fn test_convert_to_best_honors_depth_bound() {
        // x is cheapest overall but needs two hops; y is one hop away.
        let mut registry = ConversionRegistry::new();
        for (source, target, weight) in [("s", "m", 0.1), ("m", "x", 0.1), ("s", "y", 5.0)] {
            let tag = target.to_string();
            registry
                .register_edge(
                    ConversionEdge::new(source, target, move |s: String| Ok(format!("{s}{tag}")))
                        .unwrap()
                        .with_weight(weight),
                )
                .unwrap();
        }
        let converter = Converter::from_registry(&registry, &GraphOptions::new())
            .unwrap()
            .with_scheme(ConversionScheme::default().with_max_depth(Some(1)))
            .unwrap();

        let converted = converter.convert_to_best(&String::new(), "s", &["x", "y"]).unwrap();
        assert_eq!(converted.node, "y");
        assert_eq!(converted.program, "y");

        let err = converter.convert_to_best(&String::new(), "s", &["x"]).unwrap_err();
        assert!(matches!(err, ConvertError::NoReachableTarget { .. }));
    }

    #[test]
    fn test_convert_along_surfaces_execution_error() {
        let converter = converter();
        let path = converter.graph().shortest_path("a", "c").unwrap();
        let err = converter.convert_along(String::new(), &path).unwrap_err();
        match &err {
            ConvertError::Execution(e) => {
                assert_eq!(e.to_node, "c");
                assert_eq!(e.step, 0);
            }
            other => panic!("expected Execution, got {other:?}"),
        }
        assert_eq!(err.attempts().len(), 1);

        let path = converter.graph().shortest_path("a", "d").unwrap();
        assert_eq!(converter.convert_along("a".to_string(), &path).unwrap(), "abd");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = converter().with_scheme(ConversionScheme::with_max_attempts(0));
        assert!(matches!(result, Err(ConvertError::Configuration(_))));
    }
}
