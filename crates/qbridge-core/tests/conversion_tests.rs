//! End-to-end tests: registry → graph → fallback conversion.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use qbridge_core::{
    ConversionEdge, ConversionGraph, ConversionRegistry, ConversionScheme, ConvertError,
    Converter, DEFAULT_PATH_BIAS, GraphOptions, Program,
};

/// Payload that records the nodes it has been converted through.
#[derive(Debug, Clone, PartialEq)]
struct Trace(Vec<String>);

fn step(target: &'static str) -> impl Fn(Trace) -> Result<Trace, qbridge_core::BoxError> {
    move |mut t: Trace| {
        t.0.push(target.to_string());
        Ok(t)
    }
}

fn diamond() -> ConversionRegistry<Trace> {
    let mut registry = ConversionRegistry::new();
    registry.register("A", "B", step("B")).unwrap();
    registry.register("B", "D", step("D")).unwrap();
    registry.register("A", "C", step("C")).unwrap();
    registry
        .register_edge(ConversionEdge::new("C", "D", step("D")).unwrap().with_weight(5.0))
        .unwrap();
    registry
}

// =============================================================================
// Graph scenarios
// =============================================================================

#[test]
fn test_diamond_cost_and_ranking() {
    let graph = ConversionGraph::from_registry(&diamond(), &GraphOptions::new()).unwrap();

    let cost = graph.shortest_path_cost("A", "D").unwrap();
    assert!((cost - (2.0 + 2.0 * DEFAULT_PATH_BIAS)).abs() < 1e-12);

    let ranked = graph.top_targets("A", &["B", "C", "D"], None).unwrap();
    let names: Vec<&str> = ranked.iter().map(|r| r.node.as_str()).collect();
    assert_eq!(names, vec!["B", "C", "D"]);

    let top = graph.top_targets("A", &["B", "C", "D"], Some(1)).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].node, "B");
}

#[test]
fn test_restricted_build() {
    let options = GraphOptions::new().restrict_to(["A", "B"]);
    let graph = ConversionGraph::from_registry(&diamond(), &options).unwrap();

    assert_eq!(graph.nodes(), vec!["A", "B"]);
    assert_eq!(graph.edge_count(), 1);
    assert!(!graph.has_path("A", "D"));
    assert!(matches!(
        graph.shortest_path_cost("A", "D"),
        Err(ConvertError::UnregisteredNode(n)) if n == "D"
    ));
}

#[test]
fn test_bias_prefers_direct_edge() {
    let mut registry = ConversionRegistry::new();
    registry
        .register_edge(ConversionEdge::new("a", "c", step("c")).unwrap().with_weight(2.0))
        .unwrap();
    registry.register("a", "b", step("b")).unwrap();
    registry.register("b", "c", step("c")).unwrap();

    let graph = ConversionGraph::from_registry(&registry, &GraphOptions::new()).unwrap();
    let path = graph.shortest_path("a", "c").unwrap();
    assert_eq!(path.hops(), 1);
    assert!((path.cost() - (2.0 + DEFAULT_PATH_BIAS)).abs() < 1e-12);
}

#[test]
fn test_mutation_changes_route() {
    let mut graph = ConversionGraph::from_registry(&diamond(), &GraphOptions::new()).unwrap();
    assert_eq!(graph.shortest_path("A", "D").unwrap().nodes(), vec!["A", "B", "D"]);

    let (id, _) = graph.edges_between("B", "D")[0];
    graph.remove_edge(id).unwrap();
    assert_eq!(graph.shortest_path("A", "D").unwrap().nodes(), vec!["A", "C", "D"]);

    graph
        .add_edge(ConversionEdge::new("A", "D", step("D")).unwrap().with_weight(0.5))
        .unwrap();
    assert_eq!(graph.shortest_path("A", "D").unwrap().nodes(), vec!["A", "D"]);
}

// =============================================================================
// Fallback execution
// =============================================================================

#[test]
fn test_fallback_reports_one_failed_attempt() {
    let mut registry = diamond();
    // Make the preferred B -> D leg fail by shadowing it with a cheaper failing edge.
    registry
        .register_edge(
            ConversionEdge::new("B", "D", |_: Trace| Err("lossy gate".into()))
                .unwrap()
                .with_weight(0.0)
                .with_name("broken_b_to_d"),
        )
        .unwrap();

    let converter = Converter::from_registry(&registry, &GraphOptions::new()).unwrap();
    let converted = converter.convert(&Trace(vec!["A".into()]), "A", "D").unwrap();

    assert_eq!(converted.failed_attempts.len(), 1);
    assert_eq!(converted.failed_attempts[0].edge_name, "broken_b_to_d");
    // The remaining B -> D edge is a distinct conversion and still usable.
    assert_eq!(converted.program, Trace(vec!["A".into(), "B".into(), "D".into()]));
}

#[test]
fn test_exhaustion_on_single_failing_edge() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = ConversionRegistry::new();
    registry
        .register("A", "B", move |_: Trace| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("always fails".into())
        })
        .unwrap();

    let converter = Converter::from_registry(&registry, &GraphOptions::new())
        .unwrap()
        .with_scheme(ConversionScheme::with_max_attempts(3))
        .unwrap();
    let err = converter.convert(&Trace(Vec::new()), "A", "B").unwrap_err();

    assert!(matches!(err, ConvertError::Exhausted { .. }));
    assert_eq!(err.attempts().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(err.to_string().contains("always fails"));
}

#[test]
fn test_exhaustion_capped_by_max_attempts() {
    let mut registry = ConversionRegistry::new();
    for mid in ["m1", "m2", "m3", "m4"] {
        registry.register("src", mid, step(mid)).unwrap();
        registry
            .register(mid, "dst", |_: Trace| Err("nope".into()))
            .unwrap();
    }

    let converter = Converter::from_registry(&registry, &GraphOptions::new())
        .unwrap()
        .with_scheme(ConversionScheme::with_max_attempts(3))
        .unwrap();
    let err = converter.convert(&Trace(Vec::new()), "src", "dst").unwrap_err();
    assert_eq!(err.attempts().len(), 3);

    let mut seen: Vec<&str> = err.attempts().iter().map(|a| a.from_node.as_str()).collect();
    seen.dedup();
    assert_eq!(seen.len(), 3, "every attempt must use a distinct path");
}

#[test]
fn test_no_path_is_not_exhaustion() {
    let converter = Converter::from_registry(&diamond(), &GraphOptions::new()).unwrap();
    let err = converter.convert(&Trace(Vec::new()), "D", "A").unwrap_err();
    assert!(matches!(err, ConvertError::NoPath { .. }));
    assert!(err.attempts().is_empty());
}

#[test]
fn test_convert_program() {
    let converter = Converter::from_registry(&diamond(), &GraphOptions::new()).unwrap();
    let program = Program::new("A", Trace(Vec::new()));
    let converted = converter.convert_program(program, "C").unwrap();
    assert_eq!(converted.node, "C");
    assert_eq!(converted.into_payload(), Trace(vec!["C".into()]));
}

#[test]
fn test_convert_to_best() {
    let converter = Converter::from_registry(&diamond(), &GraphOptions::new()).unwrap();
    let converted = converter
        .convert_to_best(&Trace(Vec::new()), "A", &["D", "C"])
        .unwrap();
    assert_eq!(converted.node, "C");

    let err = converter
        .convert_to_best(&Trace(Vec::new()), "B", &["A", "C"])
        .unwrap_err();
    assert!(matches!(err, ConvertError::NoReachableTarget { .. }));
}
