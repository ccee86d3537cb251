//! Registration of the built-in conversions.

use qbridge_core::{BoxError, ConversionRegistry, ConvertResult, ExperimentType};
use tracing::debug;

use crate::error::FormatError;
use crate::program::QuantumProgram;
use crate::{IONQ, QASM2, QASM3, ionq, qasm};

/// A registry holding every built-in node and conversion.
///
/// All nodes are gate-model representations:
///
/// ```text
/// qasm3 <──> qasm2 <──> ionq
/// ```
pub fn builtin_registry() -> ConvertResult<ConversionRegistry<QuantumProgram>> {
    let mut registry = ConversionRegistry::new();
    for node in [QASM2, QASM3, IONQ] {
        registry.register_node(node, Some(ExperimentType::GateModel));
    }

    registry.register(QASM2, QASM3, qasm2_to_qasm3)?;
    registry.register(QASM3, QASM2, qasm3_to_qasm2)?;
    registry.register(QASM2, IONQ, qasm2_to_ionq)?;
    registry.register(IONQ, QASM2, ionq_to_qasm2)?;

    debug!("Registered {} built-in conversions", registry.len());
    Ok(registry)
}

fn unexpected(expected: &'static str, found: &QuantumProgram) -> BoxError {
    Box::new(FormatError::UnexpectedProgram {
        expected,
        found: found.node(),
    })
}

fn qasm2_to_qasm3(program: QuantumProgram) -> Result<QuantumProgram, BoxError> {
    match program {
        QuantumProgram::Qasm2(source) => {
            debug!("Rewriting {} bytes of OpenQASM 2 as OpenQASM 3", source.len());
            Ok(QuantumProgram::Qasm3(qasm::qasm2_to_qasm3(&source)?))
        }
        other => Err(unexpected(QASM2, &other)),
    }
}

fn qasm3_to_qasm2(program: QuantumProgram) -> Result<QuantumProgram, BoxError> {
    match program {
        QuantumProgram::Qasm3(source) => {
            debug!("Rewriting {} bytes of OpenQASM 3 as OpenQASM 2", source.len());
            Ok(QuantumProgram::Qasm2(qasm::qasm3_to_qasm2(&source)?))
        }
        other => Err(unexpected(QASM3, &other)),
    }
}

fn qasm2_to_ionq(program: QuantumProgram) -> Result<QuantumProgram, BoxError> {
    match program {
        QuantumProgram::Qasm2(source) => {
            let circuit = ionq::from_qasm2(&source)?;
            debug!(
                "Converted OpenQASM 2 to IonQ: {} qubits, {} gates",
                circuit.qubits,
                circuit.circuit.len()
            );
            Ok(QuantumProgram::IonQ(circuit))
        }
        other => Err(unexpected(QASM2, &other)),
    }
}

fn ionq_to_qasm2(program: QuantumProgram) -> Result<QuantumProgram, BoxError> {
    match program {
        QuantumProgram::IonQ(circuit) => {
            debug!("Converting {} IonQ gates to OpenQASM 2", circuit.circuit.len());
            Ok(QuantumProgram::Qasm2(ionq::to_qasm2(&circuit)?))
        }
        other => Err(unexpected(IONQ, &other)),
    }
}
