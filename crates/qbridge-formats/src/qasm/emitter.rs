//! OpenQASM 2 and 3 text emission.

use std::fmt::Write;

use crate::qasm::ast::{BinOp, Dialect, Expr, GateCall, GateDef, Operand, QasmProgram, Statement};

/// qelib1 names of the OpenQASM 3 phase gates.
const QASM2_RENAMES: [(&str, &str); 4] =
    [("p", "u1"), ("phase", "u1"), ("cp", "cu1"), ("cphase", "cu1")];

/// Emit `program` as `dialect` source text.
pub fn emit(program: &QasmProgram, dialect: Dialect) -> String {
    let mut out = String::new();
    match dialect {
        Dialect::Qasm2 => out.push_str("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n"),
        Dialect::Qasm3 => out.push_str("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n"),
    }

    for statement in &program.statements {
        emit_statement(&mut out, statement, dialect);
        out.push('\n');
    }
    out
}

fn emit_statement(out: &mut String, statement: &Statement, dialect: Dialect) {
    match (statement, dialect) {
        (Statement::QubitDecl { name, size }, Dialect::Qasm2) => {
            let _ = write!(out, "qreg {name}[{}];", size.unwrap_or(1));
        }
        (Statement::BitDecl { name, size }, Dialect::Qasm2) => {
            let _ = write!(out, "creg {name}[{}];", size.unwrap_or(1));
        }
        (Statement::QubitDecl { name, size }, Dialect::Qasm3) => match size {
            Some(n) => {
                let _ = write!(out, "qubit[{n}] {name};");
            }
            None => {
                let _ = write!(out, "qubit {name};");
            }
        },
        (Statement::BitDecl { name, size }, Dialect::Qasm3) => match size {
            Some(n) => {
                let _ = write!(out, "bit[{n}] {name};");
            }
            None => {
                let _ = write!(out, "bit {name};");
            }
        },
        (Statement::GateDef(def), _) => emit_gate_def(out, def, dialect),
        (Statement::Gate(call), _) => emit_gate_call(out, call, dialect),
        (Statement::Measure { qubit, target }, Dialect::Qasm2) => {
            let _ = write!(out, "measure {} -> {};", operand(qubit), operand(target));
        }
        (Statement::Measure { qubit, target }, Dialect::Qasm3) => {
            let _ = write!(out, "{} = measure {};", operand(target), operand(qubit));
        }
        (Statement::Reset(q), _) => {
            let _ = write!(out, "reset {};", operand(q));
        }
        (Statement::Barrier(qs), _) => {
            let _ = write!(out, "barrier {};", operand_list(qs));
        }
        (
            Statement::If {
                register,
                value,
                body,
            },
            Dialect::Qasm2,
        ) => {
            let _ = write!(out, "if({register}=={value}) ");
            emit_statement(out, body, dialect);
        }
        (
            Statement::If {
                register,
                value,
                body,
            },
            Dialect::Qasm3,
        ) => {
            let _ = write!(out, "if ({register} == {value}) {{ ");
            emit_statement(out, body, dialect);
            out.push_str(" }");
        }
    }
}

fn emit_gate_def(out: &mut String, def: &GateDef, dialect: Dialect) {
    let _ = write!(out, "gate {}", def.name);
    if !def.params.is_empty() {
        let _ = write!(out, "({})", def.params.join(", "));
    }
    let _ = writeln!(out, " {} {{", def.qubits.join(", "));
    for call in &def.body {
        out.push_str("  ");
        emit_gate_call(out, call, dialect);
        out.push('\n');
    }
    out.push('}');
}

fn emit_gate_call(out: &mut String, call: &GateCall, dialect: Dialect) {
    out.push_str(gate_name(&call.name, dialect));
    if !call.params.is_empty() {
        let params: Vec<String> = call.params.iter().map(|p| expr(p, dialect)).collect();
        let _ = write!(out, "({})", params.join(", "));
    }
    let _ = write!(out, " {};", operand_list(&call.qubits));
}

fn gate_name(name: &str, dialect: Dialect) -> &str {
    match dialect {
        Dialect::Qasm2 => QASM2_RENAMES
            .iter()
            .find(|(from, _)| *from == name)
            .map_or(name, |&(_, to)| to),
        Dialect::Qasm3 => name,
    }
}

fn operand(op: &Operand) -> String {
    match op.index {
        Some(i) => format!("{}[{i}]", op.register),
        None => op.register.clone(),
    }
}

fn operand_list(ops: &[Operand]) -> String {
    ops.iter().map(operand).collect::<Vec<_>>().join(", ")
}

/// Render an expression with the minimal parentheses.
pub fn expr(e: &Expr, dialect: Dialect) -> String {
    let mut out = String::new();
    write_expr(&mut out, e, dialect);
    out
}

/// Binding strength of the outermost operator; atoms bind tightest.
fn strength(e: &Expr) -> u8 {
    match e {
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Neg(_) => 4,
        Expr::Number(v) if *v < 0.0 => 4,
        _ => 5,
    }
}

fn write_expr(out: &mut String, e: &Expr, dialect: Dialect) {
    match e {
        Expr::Number(v) => {
            let _ = write!(out, "{v}");
        }
        Expr::Pi => out.push_str("pi"),
        Expr::Tau => match dialect {
            Dialect::Qasm2 => out.push_str("(2*pi)"),
            Dialect::Qasm3 => out.push_str("tau"),
        },
        Expr::Euler => match dialect {
            Dialect::Qasm2 => {
                let _ = write!(out, "{}", std::f64::consts::E);
            }
            Dialect::Qasm3 => out.push_str("euler"),
        },
        Expr::Ident(name) => out.push_str(name),
        Expr::Neg(inner) => {
            out.push('-');
            write_operand(out, inner, dialect, strength(inner) < 4);
        }
        Expr::Binary { op, lhs, rhs } => {
            let prec = op.precedence();
            let (lhs_paren, rhs_paren) = if op.is_right_assoc() {
                (strength(lhs) <= prec, strength(rhs) < prec)
            } else {
                (strength(lhs) < prec, strength(rhs) <= prec)
            };
            write_operand(out, lhs, dialect, lhs_paren);
            out.push_str(match (op, dialect) {
                (BinOp::Add, _) => " + ",
                (BinOp::Sub, _) => " - ",
                (BinOp::Mul, _) => "*",
                (BinOp::Div, _) => "/",
                (BinOp::Pow, Dialect::Qasm2) => "^",
                (BinOp::Pow, Dialect::Qasm3) => "**",
            });
            write_operand(out, rhs, dialect, rhs_paren);
        }
        Expr::Call { func, arg } => {
            let _ = write!(out, "{func}(");
            write_expr(out, arg, dialect);
            out.push(')');
        }
    }
}

fn write_operand(out: &mut String, e: &Expr, dialect: Dialect, paren: bool) {
    if paren {
        out.push('(');
        write_expr(out, e, dialect);
        out.push(')');
    } else {
        write_expr(out, e, dialect);
    }
}
