//! Syntax tree for the OpenQASM subset both dialects share.

use std::f64::consts::{E, PI, TAU};

use crate::error::{FormatError, FormatResult};

/// OpenQASM language version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// OpenQASM 2.0
    Qasm2,
    /// OpenQASM 3.0
    Qasm3,
}

impl Dialect {
    /// Node name of this dialect.
    pub fn node(self) -> &'static str {
        match self {
            Dialect::Qasm2 => crate::QASM2,
            Dialect::Qasm3 => crate::QASM3,
        }
    }

    /// Major version number in the `OPENQASM` header.
    pub fn major(self) -> u64 {
        match self {
            Dialect::Qasm2 => 2,
            Dialect::Qasm3 => 3,
        }
    }
}

/// A parsed program.
#[derive(Debug, Clone, PartialEq)]
pub struct QasmProgram {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `qreg q[n];` / `qubit[n] q;` / `qubit q;`
    QubitDecl { name: String, size: Option<usize> },

    /// `creg c[n];` / `bit[n] c;` / `bit c;`
    BitDecl { name: String, size: Option<usize> },

    /// `gate name(params) qubits { body }`
    GateDef(GateDef),

    /// Gate application.
    Gate(GateCall),

    /// `measure q -> c;` / `c = measure q;`
    Measure { qubit: Operand, target: Operand },

    /// `reset q;`
    Reset(Operand),

    /// `barrier q, r;`
    Barrier(Vec<Operand>),

    /// Operation conditioned on a whole classical register.
    If {
        register: String,
        value: u64,
        body: Box<Statement>,
    },
}

/// A gate definition.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    pub body: Vec<GateCall>,
}

/// A gate call.
#[derive(Debug, Clone, PartialEq)]
pub struct GateCall {
    pub name: String,
    pub params: Vec<Expr>,
    pub qubits: Vec<Operand>,
}

/// A register or a single register element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub register: String,
    pub index: Option<usize>,
}

impl Operand {
    /// Reference to a single element.
    pub fn indexed(register: impl Into<String>, index: usize) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Reference to a whole register.
    pub fn whole(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// Arithmetic expression used for gate parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Pi,
    Tau,
    Euler,
    Ident(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call { func: String, arg: Box<Expr> },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 3,
        }
    }

    pub(crate) fn is_right_assoc(self) -> bool {
        self == BinOp::Pow
    }
}

/// Functions accepted in parameter expressions.
pub(crate) const FUNCTIONS: [&str; 6] = ["sin", "cos", "tan", "exp", "ln", "sqrt"];

impl Expr {
    /// Evaluate a closed expression to radians.
    ///
    /// Fails on free identifiers (gate parameters) and non-finite results.
    pub fn eval(&self) -> FormatResult<f64> {
        let value = match self {
            Expr::Number(v) => *v,
            Expr::Pi => PI,
            Expr::Tau => TAU,
            Expr::Euler => E,
            Expr::Ident(name) => {
                return Err(FormatError::InvalidCircuit(format!(
                    "cannot evaluate free parameter '{name}'"
                )));
            }
            Expr::Neg(inner) => -inner.eval()?,
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (lhs.eval()?, rhs.eval()?);
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            Expr::Call { func, arg } => {
                let x = arg.eval()?;
                match func.as_str() {
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    "tan" => x.tan(),
                    "exp" => x.exp(),
                    "ln" => x.ln(),
                    "sqrt" => x.sqrt(),
                    other => {
                        return Err(FormatError::InvalidCircuit(format!(
                            "unknown function '{other}'"
                        )));
                    }
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormatError::InvalidCircuit(format!(
                "expression evaluates to {value}"
            )))
        }
    }
}
