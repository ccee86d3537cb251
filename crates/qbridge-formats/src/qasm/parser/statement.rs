//! Statement parsing.

use super::Parser;
use crate::error::FormatResult;
use crate::qasm::ast::{Dialect, GateCall, GateDef, Operand, Statement};
use crate::qasm::lexer::Token;

/// Standard gate libraries; including them is implied by the emitted header.
const STANDARD_INCLUDES: [&str; 2] = ["qelib1.inc", "stdgates.inc"];

/// OpenQASM 3 keywords that start constructs outside the shared subset.
const QASM3_ONLY: [&str; 31] = [
    "for", "while", "def", "box", "delay", "input", "output", "const", "let", "int", "uint",
    "float", "angle", "bool", "complex", "duration", "stretch", "array", "extern", "return",
    "break", "continue", "end", "defcal", "cal", "defcalgrammar", "switch", "ctrl", "negctrl",
    "inv", "pow",
];

impl Parser {
    /// Parse one statement. Includes of the standard library produce
    /// nothing; an OpenQASM 3 conditional block produces one conditional
    /// statement per body statement.
    pub(super) fn parse_statement(&mut self) -> FormatResult<Vec<Statement>> {
        let word = match self.peek() {
            Some(Token::Identifier(word)) => word.clone(),
            Some(other) => return Err(self.error(format!("expected statement, found '{other}'"))),
            None => return Err(self.error("expected statement, found end of input")),
        };

        if self.dialect == Dialect::Qasm3 && QASM3_ONLY.contains(&word.as_str()) {
            return Err(self.unsupported(format!("'{word}'")));
        }

        let statement = match word.as_str() {
            "include" => return self.parse_include().map(|()| Vec::new()),
            "if" => return self.parse_if(),
            "opaque" => return Err(self.unsupported("opaque gate declarations")),
            "qreg" | "creg" => self.parse_register_decl()?,
            "qubit" | "bit" if self.dialect == Dialect::Qasm3 => self.parse_typed_decl()?,
            "gate" => self.parse_gate_def()?,
            _ => self.parse_operation()?,
        };
        Ok(vec![statement])
    }

    /// Parse a quantum operation: gate call, measurement, reset or barrier.
    fn parse_operation(&mut self) -> FormatResult<Statement> {
        if self.check_keyword("measure") {
            return self.parse_measure();
        }
        if self.check_keyword("reset") {
            self.advance();
            let operand = self.parse_operand()?;
            self.expect(&Token::Semicolon)?;
            return Ok(Statement::Reset(operand));
        }
        if self.check_keyword("barrier") {
            self.advance();
            let operands = self.parse_operand_list()?;
            self.expect(&Token::Semicolon)?;
            return Ok(Statement::Barrier(operands));
        }
        if self.dialect == Dialect::Qasm3 && self.is_measure_assignment() {
            return self.parse_measure_assignment();
        }

        let call = self.parse_gate_call()?;
        Ok(Statement::Gate(call))
    }

    fn parse_include(&mut self) -> FormatResult<()> {
        self.advance();
        let path = match self.advance() {
            Some(Token::Str(path)) => path,
            Some(other) => {
                self.pos -= 1;
                return Err(self.error(format!("expected include path, found '{other}'")));
            }
            None => return Err(self.error("expected include path, found end of input")),
        };
        self.expect(&Token::Semicolon)?;

        if STANDARD_INCLUDES.contains(&path.as_str()) {
            Ok(())
        } else {
            Err(self.unsupported(format!("include of \"{path}\"")))
        }
    }

    /// `qreg q[n];` or `creg c[n];`
    fn parse_register_decl(&mut self) -> FormatResult<Statement> {
        let quantum = self.check_keyword("qreg");
        self.advance();
        let name = self.parse_identifier()?;
        self.expect(&Token::LBracket)?;
        let size = self.parse_size()?;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Semicolon)?;

        Ok(if quantum {
            Statement::QubitDecl {
                name,
                size: Some(size),
            }
        } else {
            Statement::BitDecl {
                name,
                size: Some(size),
            }
        })
    }

    /// `qubit[n] q;`, `qubit q;`, `bit[n] c;` or `bit c;`
    fn parse_typed_decl(&mut self) -> FormatResult<Statement> {
        let quantum = self.check_keyword("qubit");
        self.advance();
        let size = if self.consume(&Token::LBracket) {
            let size = self.parse_size()?;
            self.expect(&Token::RBracket)?;
            Some(size)
        } else {
            None
        };
        let name = self.parse_identifier()?;
        if self.check(&Token::Eq) {
            return Err(self.unsupported("initialized classical declarations"));
        }
        self.expect(&Token::Semicolon)?;

        Ok(if quantum {
            Statement::QubitDecl { name, size }
        } else {
            Statement::BitDecl { name, size }
        })
    }

    /// `measure q -> c;`, or `measure q;` which has no OpenQASM 2 form.
    fn parse_measure(&mut self) -> FormatResult<Statement> {
        self.advance();
        let qubit = self.parse_operand()?;
        if !self.consume(&Token::Arrow) {
            if self.dialect == Dialect::Qasm3 && self.check(&Token::Semicolon) {
                return Err(self.unsupported("measurement without a classical target"));
            }
            return Err(self.error("expected '->' after measured operand"));
        }
        let target = self.parse_operand()?;
        self.expect(&Token::Semicolon)?;
        Ok(Statement::Measure { qubit, target })
    }

    /// `c = ...` or `c[i] = ...`
    fn is_measure_assignment(&self) -> bool {
        matches!(self.peek_at(1), Some(Token::Eq))
            || (matches!(self.peek_at(1), Some(Token::LBracket))
                && matches!(self.peek_at(4), Some(Token::Eq)))
    }

    /// `c = measure q;` or `c[i] = measure q[j];`
    fn parse_measure_assignment(&mut self) -> FormatResult<Statement> {
        let target = self.parse_operand()?;
        self.expect(&Token::Eq)?;
        if !self.check_keyword("measure") {
            return Err(self.unsupported("classical assignments"));
        }
        self.advance();
        let qubit = self.parse_operand()?;
        self.expect(&Token::Semicolon)?;
        Ok(Statement::Measure { qubit, target })
    }

    /// `if (c == n) op;` and, in OpenQASM 3, `if (c == n) { ops }`.
    fn parse_if(&mut self) -> FormatResult<Vec<Statement>> {
        self.advance();
        self.expect(&Token::LParen)?;
        let register = self.parse_identifier()?;
        if self.check(&Token::LBracket) {
            return Err(self.unsupported("conditions on single bits"));
        }
        if !self.consume(&Token::EqEq) {
            return Err(self.unsupported("conditions other than register equality"));
        }
        let value = self.parse_int()?;
        self.expect(&Token::RParen)?;

        let body = if self.dialect == Dialect::Qasm3 && self.consume(&Token::LBrace) {
            let mut body = Vec::new();
            while !self.consume(&Token::RBrace) {
                if self.is_eof() {
                    return Err(self.error("unterminated conditional block"));
                }
                body.push(self.parse_conditional_body()?);
            }
            body
        } else {
            vec![self.parse_conditional_body()?]
        };

        if self.check_keyword("else") {
            return Err(self.unsupported("'else' branches"));
        }

        Ok(body
            .into_iter()
            .map(|statement| Statement::If {
                register: register.clone(),
                value,
                body: Box::new(statement),
            })
            .collect())
    }

    fn parse_conditional_body(&mut self) -> FormatResult<Statement> {
        if let Some(Token::Identifier(word)) = self.peek() {
            let word = word.clone();
            if self.dialect == Dialect::Qasm3 && QASM3_ONLY.contains(&word.as_str()) {
                return Err(self.unsupported(format!("'{word}'")));
            }
            if matches!(
                word.as_str(),
                "if" | "gate" | "qreg" | "creg" | "qubit" | "bit" | "include" | "barrier" | "opaque"
            ) {
                return Err(self.unsupported(format!("'{word}' inside a conditional")));
            }
        }
        self.parse_operation()
    }

    /// `gate name(params) a, b { body }`
    fn parse_gate_def(&mut self) -> FormatResult<Statement> {
        self.advance();
        let name = self.parse_identifier()?;
        let params = if self.consume(&Token::LParen) {
            if self.consume(&Token::RParen) {
                Vec::new()
            } else {
                let params = self.parse_identifier_list()?;
                self.expect(&Token::RParen)?;
                params
            }
        } else {
            Vec::new()
        };
        let qubits = self.parse_identifier_list()?;
        self.expect(&Token::LBrace)?;

        let mut body = Vec::new();
        while !self.consume(&Token::RBrace) {
            if self.is_eof() {
                return Err(self.error(format!("unterminated body of gate '{name}'")));
            }
            if let Some(Token::Identifier(word)) = self.peek() {
                if self.dialect == Dialect::Qasm3 && QASM3_ONLY.contains(&word.as_str()) {
                    let word = word.clone();
                    return Err(self.unsupported(format!("'{word}'")));
                }
            }
            if self.check_keyword("barrier") {
                // No effect inside a gate body.
                self.advance();
                self.parse_operand_list()?;
                self.expect(&Token::Semicolon)?;
                continue;
            }
            body.push(self.parse_gate_call()?);
        }

        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    /// `name(params) a, b;`
    fn parse_gate_call(&mut self) -> FormatResult<GateCall> {
        let name = self.parse_identifier()?;
        if self.check(&Token::At) {
            return Err(self.unsupported("gate modifiers"));
        }
        let params = if self.consume(&Token::LParen) {
            let params = self.parse_expression_list()?;
            self.expect(&Token::RParen)?;
            params
        } else {
            Vec::new()
        };
        let qubits = self.parse_operand_list()?;
        self.expect(&Token::Semicolon)?;
        Ok(GateCall {
            name,
            params,
            qubits,
        })
    }

    fn parse_operand_list(&mut self) -> FormatResult<Vec<Operand>> {
        let mut operands = vec![self.parse_operand()?];
        while self.consume(&Token::Comma) {
            operands.push(self.parse_operand()?);
        }
        Ok(operands)
    }

    /// `q` or `q[i]`
    fn parse_operand(&mut self) -> FormatResult<Operand> {
        let register = self.parse_identifier()?;
        if !self.consume(&Token::LBracket) {
            return Ok(Operand::whole(register));
        }
        let index = self.parse_size()?;
        if self.check(&Token::Colon) || self.check(&Token::Comma) {
            return Err(self.unsupported("register slices"));
        }
        self.expect(&Token::RBracket)?;
        Ok(Operand::indexed(register, index))
    }
}
