//! The program payload carried through built-in conversions.

use crate::error::{FormatError, FormatResult};
use crate::ionq::IonQCircuit;
use crate::{IONQ, QASM2, QASM3};

/// A quantum program in one of the built-in representations.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumProgram {
    /// OpenQASM 2.0 source text.
    Qasm2(String),
    /// OpenQASM 3.0 source text.
    Qasm3(String),
    /// IonQ JSON circuit.
    IonQ(IonQCircuit),
}

impl QuantumProgram {
    /// The graph node this program belongs to.
    pub fn node(&self) -> &'static str {
        match self {
            QuantumProgram::Qasm2(_) => QASM2,
            QuantumProgram::Qasm3(_) => QASM3,
            QuantumProgram::IonQ(_) => IONQ,
        }
    }

    /// Load program text for `node`.
    ///
    /// OpenQASM text is kept verbatim and only checked when converted; IonQ
    /// JSON is parsed immediately.
    pub fn from_text(node: &str, text: &str) -> FormatResult<Self> {
        match node {
            QASM2 => Ok(QuantumProgram::Qasm2(text.to_string())),
            QASM3 => Ok(QuantumProgram::Qasm3(text.to_string())),
            IONQ => Ok(QuantumProgram::IonQ(IonQCircuit::from_json(text)?)),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }

    /// Render the program as text.
    pub fn to_text(&self) -> FormatResult<String> {
        match self {
            QuantumProgram::Qasm2(source) | QuantumProgram::Qasm3(source) => Ok(source.clone()),
            QuantumProgram::IonQ(circuit) => circuit.to_json(),
        }
    }

    /// Guess the node of program text from its header or shape.
    pub fn detect(text: &str) -> Option<&'static str> {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') {
            return Some(IONQ);
        }

        let first = trimmed
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with("//"))?;
        let version = first.strip_prefix("OPENQASM")?.trim_start();
        if version.starts_with('2') {
            Some(QASM2)
        } else if version.starts_with('3') {
            Some(QASM3)
        } else {
            None
        }
    }
}
