//! OpenQASM 2 and 3 support.
//!
//! Both dialects parse into one syntax tree covering what they have in
//! common; translating between them is parsing one and emitting the other.

pub mod ast;
mod emitter;
mod lexer;
mod parser;

pub use ast::{Dialect, QasmProgram};
pub use emitter::emit;
pub use parser::parse;

use crate::error::FormatResult;

/// Rewrite OpenQASM 2 source as OpenQASM 3.
pub fn qasm2_to_qasm3(source: &str) -> FormatResult<String> {
    let program = parse(source, Dialect::Qasm2)?;
    Ok(emit(&program, Dialect::Qasm3))
}

/// Rewrite OpenQASM 3 source as OpenQASM 2.
pub fn qasm3_to_qasm2(source: &str) -> FormatResult<String> {
    let program = parse(source, Dialect::Qasm3)?;
    Ok(emit(&program, Dialect::Qasm2))
}
