//! Error types for the built-in formats.

use thiserror::Error;

/// Errors raised by the built-in conversions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// Malformed source text.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A gate the target format cannot express.
    #[error("Gate '{gate}' is not supported by {format}")]
    UnsupportedGate { gate: String, format: &'static str },

    /// A language construct the target format cannot express.
    #[error("{feature} is not supported by {format}")]
    UnsupportedFeature {
        feature: String,
        format: &'static str,
    },

    /// A conversion received a program of the wrong representation.
    #[error("Expected a {expected} program, got {found}")]
    UnexpectedProgram {
        expected: &'static str,
        found: &'static str,
    },

    /// A node name no built-in format answers to.
    #[error("Unknown program format '{0}'")]
    UnknownFormat(String),

    /// Structurally valid input that describes an impossible circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormatError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FormatError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(feature: impl Into<String>, format: &'static str) -> Self {
        FormatError::UnsupportedFeature {
            feature: feature.into(),
            format,
        }
    }
}

/// Result type for format operations.
pub type FormatResult<T> = Result<T, FormatError>;
