//! IonQ JSON circuit format.
//!
//! Only the abstract `qis` gateset is handled. Measurement is implicit in the
//! JSON form: every qubit is measured at the end of the circuit.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::IONQ;
use crate::error::{FormatError, FormatResult};
use crate::qasm::ast::{Expr, GateCall, Operand, QasmProgram, Statement};
use crate::qasm::{Dialect, emit, parse};

/// Format tag written into converted circuits.
pub const CIRCUIT_FORMAT: &str = "ionq.circuit.v0";

/// Gateset of abstract quantum instructions.
pub const QIS_GATESET: &str = "qis";

/// An IonQ circuit document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonQCircuit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateset: Option<String>,
    pub qubits: usize,
    pub circuit: Vec<IonQGate>,
}

/// A single gate in an IonQ circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonQGate {
    pub gate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl IonQGate {
    /// Gate on one target.
    pub fn new(gate: impl Into<String>, target: usize) -> Self {
        Self {
            gate: gate.into(),
            target: Some(target),
            targets: None,
            control: None,
            controls: None,
            rotation: None,
        }
    }

    /// Add a control qubit.
    pub fn with_control(mut self, control: usize) -> Self {
        self.control = Some(control);
        self
    }

    /// Add a rotation angle in radians.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Swap of two qubits.
    pub fn swap(a: usize, b: usize) -> Self {
        Self {
            gate: "swap".into(),
            target: None,
            targets: Some(vec![a, b]),
            control: None,
            controls: None,
            rotation: None,
        }
    }
}

impl IonQCircuit {
    /// Parse a JSON document.
    pub fn from_json(text: &str) -> FormatResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> FormatResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Single-qubit gates: OpenQASM name, IonQ name.
const SINGLE_QUBIT: [(&str, &str); 10] = [
    ("h", "h"),
    ("x", "x"),
    ("y", "y"),
    ("z", "z"),
    ("s", "s"),
    ("sdg", "si"),
    ("t", "t"),
    ("tdg", "ti"),
    ("sx", "v"),
    ("sxdg", "vi"),
];

/// Rotations: OpenQASM name, controlled OpenQASM name, IonQ name.
const ROTATIONS: [(&str, &str, &str); 3] = [
    ("rx", "crx", "rx"),
    ("ry", "cry", "ry"),
    ("rz", "crz", "rz"),
];

/// Controlled single-qubit gates: OpenQASM name, IonQ target gate.
const CONTROLLED: [(&str, &str); 5] = [
    ("cx", "cnot"),
    ("CX", "cnot"),
    ("cy", "y"),
    ("cz", "z"),
    ("ch", "h"),
];

/// Largest total qubit count accepted when flattening registers.
pub const MAX_QUBITS: usize = 4096;

/// Qubit registers flattened onto one index space in declaration order.
#[derive(Default)]
struct QubitLayout {
    registers: FxHashMap<String, (usize, usize)>,
    total: usize,
}

impl QubitLayout {
    fn declare(&mut self, name: &str, size: usize) -> FormatResult<()> {
        if self.registers.contains_key(name) {
            return Err(FormatError::InvalidCircuit(format!(
                "register '{name}' declared twice"
            )));
        }
        let total = self
            .total
            .checked_add(size)
            .filter(|&total| total <= MAX_QUBITS)
            .ok_or_else(|| {
                FormatError::InvalidCircuit(format!(
                    "register '{name}[{size}]' exceeds the limit of {MAX_QUBITS} qubits"
                ))
            })?;
        self.registers.insert(name.to_string(), (self.total, size));
        self.total = total;
        Ok(())
    }

    fn resolve(&self, operand: &Operand) -> FormatResult<Vec<usize>> {
        let &(offset, size) = self.registers.get(&operand.register).ok_or_else(|| {
            FormatError::InvalidCircuit(format!("unknown qubit register '{}'", operand.register))
        })?;
        match operand.index {
            Some(i) if i < size => Ok(vec![offset + i]),
            Some(i) => Err(FormatError::InvalidCircuit(format!(
                "index {i} out of range for register '{}' of size {size}",
                operand.register
            ))),
            None => Ok((offset..offset + size).collect()),
        }
    }

    /// Expand whole-register operands into one qubit tuple per element.
    fn broadcast(&self, call: &GateCall) -> FormatResult<Vec<Vec<usize>>> {
        let resolved = call
            .qubits
            .iter()
            .map(|op| self.resolve(op))
            .collect::<FormatResult<Vec<_>>>()?;

        let width = resolved.iter().map(Vec::len).max().unwrap_or(0);
        if resolved.iter().any(|r| r.len() != 1 && r.len() != width) {
            return Err(FormatError::InvalidCircuit(format!(
                "mismatched register sizes in '{}'",
                call.name
            )));
        }

        let applications: Vec<Vec<usize>> = (0..width)
            .map(|k| resolved.iter().map(|r| if r.len() == 1 { r[0] } else { r[k] }).collect())
            .collect();

        for qubits in &applications {
            let mut sorted = qubits.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != qubits.len() {
                return Err(FormatError::InvalidCircuit(format!(
                    "repeated qubit argument to '{}'",
                    call.name
                )));
            }
        }
        Ok(applications)
    }
}

/// Convert OpenQASM 2 source into an IonQ circuit.
pub fn from_qasm2(source: &str) -> FormatResult<IonQCircuit> {
    let program = parse(source, Dialect::Qasm2)?;
    let mut layout = QubitLayout::default();
    let mut circuit = Vec::new();

    for statement in &program.statements {
        match statement {
            Statement::QubitDecl { name, size } => layout.declare(name, size.unwrap_or(1))?,
            Statement::BitDecl { .. } | Statement::Measure { .. } | Statement::Barrier(_) => {}
            Statement::Gate(call) => {
                for qubits in layout.broadcast(call)? {
                    circuit.push(convert_gate(call, &qubits)?);
                }
            }
            Statement::Reset(_) => return Err(FormatError::unsupported("reset", IONQ)),
            Statement::GateDef(def) => {
                return Err(FormatError::unsupported(
                    format!("gate definition '{}'", def.name),
                    IONQ,
                ));
            }
            Statement::If { .. } => {
                return Err(FormatError::unsupported("classically conditioned operations", IONQ));
            }
        }
    }

    Ok(IonQCircuit {
        format: Some(CIRCUIT_FORMAT.into()),
        gateset: Some(QIS_GATESET.into()),
        qubits: layout.total,
        circuit,
    })
}

fn convert_gate(call: &GateCall, qubits: &[usize]) -> FormatResult<IonQGate> {
    let name = call.name.as_str();
    let unsupported = || FormatError::UnsupportedGate {
        gate: call.name.clone(),
        format: IONQ,
    };
    let arity = |params: usize, width: usize| -> FormatResult<()> {
        if call.params.len() == params && qubits.len() == width {
            Ok(())
        } else {
            Err(FormatError::InvalidCircuit(format!(
                "'{name}' takes {params} parameter(s) and {width} qubit(s)"
            )))
        }
    };

    if let Some(&(_, ionq)) = SINGLE_QUBIT.iter().find(|(qasm, _)| *qasm == name) {
        arity(0, 1)?;
        return Ok(IonQGate::new(ionq, qubits[0]));
    }
    if let Some(&(_, _, ionq)) = ROTATIONS.iter().find(|(qasm, _, _)| *qasm == name) {
        arity(1, 1)?;
        return Ok(IonQGate::new(ionq, qubits[0]).with_rotation(call.params[0].eval()?));
    }
    if let Some(&(_, _, ionq)) = ROTATIONS.iter().find(|(_, qasm, _)| *qasm == name) {
        arity(1, 2)?;
        return Ok(IonQGate::new(ionq, qubits[1])
            .with_control(qubits[0])
            .with_rotation(call.params[0].eval()?));
    }
    if let Some(&(_, ionq)) = CONTROLLED.iter().find(|(qasm, _)| *qasm == name) {
        arity(0, 2)?;
        return Ok(IonQGate::new(ionq, qubits[1]).with_control(qubits[0]));
    }
    if name == "swap" {
        arity(0, 2)?;
        return Ok(IonQGate::swap(qubits[0], qubits[1]));
    }
    Err(unsupported())
}

/// Convert an IonQ circuit into OpenQASM 2 with a `q`/`c` register pair and
/// a final measurement of every qubit.
pub fn to_qasm2(circuit: &IonQCircuit) -> FormatResult<String> {
    if let Some(gateset) = circuit.gateset.as_deref() {
        if gateset != QIS_GATESET {
            return Err(FormatError::unsupported(format!("the '{gateset}' gateset"), IONQ));
        }
    }
    if circuit.qubits == 0 {
        return Err(FormatError::InvalidCircuit("circuit has no qubits".into()));
    }
    if circuit.qubits > MAX_QUBITS {
        return Err(FormatError::InvalidCircuit(format!(
            "circuit has {} qubits, the limit is {MAX_QUBITS}",
            circuit.qubits
        )));
    }

    let mut statements = vec![
        Statement::QubitDecl {
            name: "q".into(),
            size: Some(circuit.qubits),
        },
        Statement::BitDecl {
            name: "c".into(),
            size: Some(circuit.qubits),
        },
    ];
    for gate in &circuit.circuit {
        statements.extend(qasm_calls(gate, circuit.qubits)?.into_iter().map(Statement::Gate));
    }
    statements.push(Statement::Measure {
        qubit: Operand::whole("q"),
        target: Operand::whole("c"),
    });

    Ok(emit(&QasmProgram { statements }, Dialect::Qasm2))
}

fn qasm_calls(gate: &IonQGate, width: usize) -> FormatResult<Vec<GateCall>> {
    let check = |q: usize| -> FormatResult<usize> {
        if q < width {
            Ok(q)
        } else {
            Err(FormatError::InvalidCircuit(format!(
                "qubit {q} out of range for a {width}-qubit circuit"
            )))
        }
    };
    let call = |name: &str, params: Vec<Expr>, qubits: &[usize]| GateCall {
        name: name.to_string(),
        params,
        qubits: qubits.iter().map(|&q| Operand::indexed("q", q)).collect(),
    };

    let control = match (gate.control, gate.controls.as_deref()) {
        (Some(c), None) | (None, Some(&[c])) => Some(check(c)?),
        (None, None) | (None, Some(&[])) => None,
        _ => return Err(FormatError::unsupported("multi-controlled gates", IONQ)),
    };

    let targets: Vec<usize> = match (gate.target, gate.targets.as_deref()) {
        (Some(t), None) => vec![check(t)?],
        (None, Some(ts)) if !ts.is_empty() => ts.iter().map(|&t| check(t)).collect::<FormatResult<_>>()?,
        _ => {
            return Err(FormatError::InvalidCircuit(format!(
                "gate '{}' has no target",
                gate.gate
            )));
        }
    };

    if gate.gate == "swap" {
        return match (control, targets.as_slice()) {
            (None, &[a, b]) if a != b => Ok(vec![call("swap", Vec::new(), &[a, b])]),
            (None, _) => Err(FormatError::InvalidCircuit(
                "swap takes two distinct targets".into(),
            )),
            (Some(_), _) => Err(FormatError::unsupported("controlled swap", IONQ)),
        };
    }

    let rotation = || {
        gate.rotation.map(|r| vec![Expr::Number(r)]).ok_or_else(|| {
            FormatError::InvalidCircuit(format!("gate '{}' has no rotation", gate.gate))
        })
    };

    let mut calls = Vec::with_capacity(targets.len());
    for target in targets {
        let next = match control {
            None => {
                if let Some(&(qasm, _)) = SINGLE_QUBIT.iter().find(|(_, ionq)| *ionq == gate.gate) {
                    call(qasm, Vec::new(), &[target])
                } else if let Some(&(qasm, _, _)) = ROTATIONS.iter().find(|(_, _, ionq)| *ionq == gate.gate) {
                    call(qasm, rotation()?, &[target])
                } else if gate.gate == "cnot" {
                    return Err(FormatError::InvalidCircuit("cnot has no control".into()));
                } else {
                    return Err(unsupported_gate(gate));
                }
            }
            Some(c) if c == target => {
                return Err(FormatError::InvalidCircuit(format!(
                    "gate '{}' controls its own target",
                    gate.gate
                )));
            }
            Some(c) => {
                if gate.gate == "cnot" || gate.gate == "x" {
                    call("cx", Vec::new(), &[c, target])
                } else if let Some(&(qasm, _)) = CONTROLLED
                    .iter()
                    .skip(2)
                    .find(|(_, ionq)| *ionq == gate.gate)
                {
                    call(qasm, Vec::new(), &[c, target])
                } else if let Some(&(_, qasm, _)) = ROTATIONS.iter().find(|(_, _, ionq)| *ionq == gate.gate) {
                    call(qasm, rotation()?, &[c, target])
                } else {
                    return Err(unsupported_gate(gate));
                }
            }
        };
        calls.push(next);
    }
    Ok(calls)
}

fn unsupported_gate(gate: &IonQGate) -> FormatError {
    FormatError::UnsupportedGate {
        gate: gate.gate.clone(),
        format: crate::QASM2,
    }
}
