//! Built-in program formats for qbridge.
//!
//! This crate provides the conversions a stock installation ships with:
//!
//! - `qasm2`: OpenQASM 2.0 source text
//! - `qasm3`: OpenQASM 3.0 source text
//! - `ionq`: IonQ JSON circuits in the `qis` gateset
//!
//! Programs travel through the conversion graph as [`QuantumProgram`]
//! values; [`builtin_registry`] wires every conversion into a
//! [`ConversionRegistry`](qbridge_core::ConversionRegistry).
//!
//! # Example
//!
//! ```rust
//! use qbridge_core::{Converter, GraphOptions};
//! use qbridge_formats::{IONQ, QASM3, QuantumProgram, builtin_registry};
//!
//! let registry = builtin_registry().unwrap();
//! let converter = Converter::from_registry(&registry, &GraphOptions::new()).unwrap();
//!
//! let source = QuantumProgram::Qasm3(
//!     "OPENQASM 3.0;\nqubit[2] q;\nh q[0];\ncx q[0], q[1];".into(),
//! );
//! let converted = converter.convert(&source, QASM3, IONQ).unwrap();
//!
//! assert_eq!(converted.path.nodes(), vec!["qasm3", "qasm2", "ionq"]);
//! let QuantumProgram::IonQ(circuit) = converted.program else {
//!     unreachable!()
//! };
//! assert_eq!(circuit.circuit.len(), 2);
//! ```

pub mod builtin;
pub mod error;
pub mod ionq;
pub mod program;
pub mod qasm;

pub use builtin::builtin_registry;
pub use error::{FormatError, FormatResult};
pub use ionq::{IonQCircuit, IonQGate};
pub use program::QuantumProgram;

/// OpenQASM 2.0 node.
pub const QASM2: &str = "qasm2";

/// OpenQASM 3.0 node.
pub const QASM3: &str = "qasm3";

/// IonQ JSON node.
pub const IONQ: &str = "ionq";

/// Every built-in node.
pub const NODES: [&str; 3] = [QASM2, QASM3, IONQ];
