//! Program-representation nodes and their classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Broad problem domain a program representation belongs to.
///
/// Purely descriptive: classification never influences path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentType {
    /// Gate-model circuits (OpenQASM, vendor circuit JSON, ...).
    GateModel,
    /// Analog Hamiltonian simulation programs.
    AnalogHamiltonian,
    /// Quantum annealing problems (QUBO, Ising).
    Annealing,
    /// Anything else.
    Other,
}

impl ExperimentType {
    /// Stable lowercase name of this experiment type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentType::GateModel => "gate_model",
            ExperimentType::AnalogHamiltonian => "analog_hamiltonian",
            ExperimentType::Annealing => "annealing",
            ExperimentType::Other => "other",
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "gate_model" | "gate" => Ok(ExperimentType::GateModel),
            "analog_hamiltonian" | "analog" | "ahs" => Ok(ExperimentType::AnalogHamiltonian),
            "annealing" => Ok(ExperimentType::Annealing),
            "other" => Ok(ExperimentType::Other),
            other => Err(format!("Unknown experiment type: '{other}'")),
        }
    }
}

/// Vertex payload of the conversion graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Unique representation name.
    pub name: String,
    /// Optional classification.
    pub experiment_type: Option<ExperimentType>,
}

impl NodeInfo {
    /// Create an unclassified node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            experiment_type: None,
        }
    }
}

/// A program payload tagged with the node it currently belongs to.
///
/// The core never inspects the payload; the tag is the only type information
/// path search relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<P> {
    /// Node name of the representation `payload` is expressed in.
    pub node: String,
    /// The program itself.
    pub payload: P,
}

impl<P> Program<P> {
    /// Tag a payload with its node name.
    pub fn new(node: impl Into<String>, payload: P) -> Self {
        Self {
            node: node.into(),
            payload,
        }
    }

    /// Discard the tag.
    pub fn into_payload(self) -> P {
        self.payload
    }
}
