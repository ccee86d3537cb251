//! End-to-end conversions through the built-in graph.

use qbridge_core::{
    ConversionEdge, ConversionScheme, ConvertError, Converter, ExperimentType, GraphOptions, Program,
};
use qbridge_formats::{
    FormatError, IONQ, IonQGate, QASM2, QASM3, QuantumProgram, builtin_registry,
};

fn converter() -> Converter<QuantumProgram> {
    let registry = builtin_registry().unwrap();
    Converter::from_registry(&registry, &GraphOptions::new()).unwrap()
}

const GHZ_QASM3: &str = r#"OPENQASM 3.0;
include "stdgates.inc";
qubit[3] q;
bit[3] c;
h q[0];
cx q[0], q[1];
cx q[1], q[2];
rz(pi/4) q[2];
c = measure q;
"#;

// =============================================================================
// Graph shape
// =============================================================================

#[test]
fn test_builtin_graph_shape() {
    let converter = converter();
    let graph = converter.graph();

    assert_eq!(graph.nodes(), vec![IONQ, QASM2, QASM3]);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.native_edge_count(), 4);
    assert_eq!(
        graph.nodes_by_experiment_type(ExperimentType::GateModel),
        vec![IONQ, QASM2, QASM3]
    );

    let path = graph.shortest_path(QASM3, IONQ).unwrap();
    assert_eq!(path.nodes(), vec![QASM3, QASM2, IONQ]);
    assert_eq!(path.hops(), 2);
}

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn test_qasm3_to_ionq_through_qasm2() {
    let converted = converter()
        .convert(&QuantumProgram::Qasm3(GHZ_QASM3.into()), QASM3, IONQ)
        .unwrap();

    assert_eq!(converted.node, IONQ);
    assert!(converted.failed_attempts.is_empty());
    let QuantumProgram::IonQ(circuit) = converted.program else {
        panic!("expected an IonQ circuit");
    };
    assert_eq!(circuit.qubits, 3);
    assert_eq!(
        circuit.circuit[..3],
        [
            IonQGate::new("h", 0),
            IonQGate::new("cnot", 1).with_control(0),
            IonQGate::new("cnot", 2).with_control(1),
        ]
    );
    let rz = &circuit.circuit[3];
    assert!((rz.rotation.unwrap() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
}

#[test]
fn test_ionq_back_to_qasm3() {
    let converter = converter();
    let ionq = converter
        .convert_program(Program::new(QASM3, QuantumProgram::Qasm3(GHZ_QASM3.into())), IONQ)
        .unwrap();
    let back = converter.convert_program(ionq, QASM3).unwrap();

    assert_eq!(back.node, QASM3);
    let QuantumProgram::Qasm3(text) = back.payload else {
        panic!("expected OpenQASM 3 text");
    };
    assert!(text.starts_with("OPENQASM 3.0;\n"));
    assert!(text.contains("qubit[3] q;"));
    assert!(text.contains("cx q[1], q[2];"));
    assert!(text.ends_with("c = measure q;\n"));
}

#[test]
fn test_identity_conversion_returns_input() {
    let program = QuantumProgram::Qasm2("not even parsed".into());
    let converted = converter().convert(&program, QASM2, QASM2).unwrap();
    assert_eq!(converted.program, program);
    assert!(converted.path.is_identity());
}

#[test]
fn test_unsupported_construct_exhausts_conversion() {
    let source = QuantumProgram::Qasm3("OPENQASM 3.0;\nqubit[2] q;\nctrl @ x q[0], q[1];".into());
    let err = converter().convert(&source, QASM3, IONQ).unwrap_err();

    let ConvertError::Exhausted { attempts, .. } = &err else {
        panic!("expected exhaustion, got {err}");
    };
    assert_eq!(attempts.len(), 1);
    let cause = std::error::Error::source(&attempts[0])
        .and_then(|e| e.downcast_ref::<FormatError>());
    assert!(matches!(cause, Some(FormatError::UnsupportedFeature { .. })));
}

#[test]
fn test_fallback_uses_alternative_route() {
    // A direct edge that always fails is preferred by weight, then abandoned.
    let mut converter = converter();
    let broken = ConversionEdge::new(QASM3, IONQ, |_p: QuantumProgram| {
        Err("vendor endpoint unavailable".into())
    })
    .unwrap()
    .with_weight(0.5)
    .with_native(false);
    converter.graph_mut().add_edge(broken).unwrap();

    let converted = converter
        .convert(&QuantumProgram::Qasm3(GHZ_QASM3.into()), QASM3, IONQ)
        .unwrap();

    assert_eq!(converted.failed_attempts.len(), 1);
    assert_eq!(converted.failed_attempts[0].edge_name, "qasm3_to_ionq");
    assert_eq!(converted.path.nodes(), vec![QASM3, QASM2, IONQ]);
}

#[test]
fn test_convert_to_best_prefers_cheapest_target() {
    let converted = converter()
        .convert_to_best(&QuantumProgram::Qasm3(GHZ_QASM3.into()), QASM3, &[IONQ, QASM2])
        .unwrap();
    assert_eq!(converted.node, QASM2);
}

#[test]
fn test_depth_limit_blocks_two_hop_route() {
    let converter = converter()
        .with_scheme(ConversionScheme::with_max_attempts(3).with_max_depth(Some(1)))
        .unwrap();
    let err = converter
        .convert(&QuantumProgram::Qasm3(GHZ_QASM3.into()), QASM3, IONQ)
        .unwrap_err();
    assert!(matches!(err, ConvertError::NoPath { .. }), "{err}");
}

#[test]
fn test_restricted_graph() {
    let registry = builtin_registry().unwrap();
    let options = GraphOptions::new().restrict_to([QASM2, QASM3]);
    let converter = Converter::from_registry(&registry, &options).unwrap();

    assert!(!converter.graph().has_node(IONQ));
    let err = converter
        .convert(&QuantumProgram::Qasm2(String::new()), QASM2, IONQ)
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnregisteredNode(ref n) if n == IONQ));
}
