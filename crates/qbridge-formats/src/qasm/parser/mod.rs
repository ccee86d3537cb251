//! Recursive-descent parser for the shared OpenQASM subset.

mod expression;
mod statement;

use crate::error::{FormatError, FormatResult};
use crate::qasm::ast::{Dialect, QasmProgram};
use crate::qasm::lexer::{SpannedToken, Token, tokenize};

/// Parse `source` as the given dialect.
///
/// Constructs outside the shared subset fail with
/// [`FormatError::UnsupportedFeature`]; malformed input fails with
/// [`FormatError::Parse`].
pub fn parse(source: &str, dialect: Dialect) -> FormatResult<QasmProgram> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
        dialect,
    };
    parser.parse_program()
}

/// Parser state.
pub(super) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    dialect: Dialect,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    /// Line of the current token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    fn error(&self, message: impl Into<String>) -> FormatError {
        FormatError::parse(self.line(), message)
    }

    fn unsupported(&self, feature: impl Into<String>) -> FormatError {
        FormatError::unsupported(feature, self.dialect.node())
    }

    fn expect(&mut self, expected: &Token) -> FormatResult<()> {
        match self.advance() {
            Some(found) if std::mem::discriminant(&found) == std::mem::discriminant(expected) => {
                Ok(())
            }
            Some(found) => {
                self.pos -= 1;
                Err(self.error(format!("expected '{expected}', found '{found}'")))
            }
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Identifier(word)) if word == keyword)
    }

    fn parse_program(&mut self) -> FormatResult<QasmProgram> {
        if self.consume(&Token::OpenQasm) {
            self.parse_version()?;
            self.expect(&Token::Semicolon)?;
        }

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.extend(self.parse_statement()?);
        }

        Ok(QasmProgram { statements })
    }

    fn parse_version(&mut self) -> FormatResult<()> {
        let version = match self.advance() {
            Some(Token::Float(v)) => v,
            #[allow(clippy::cast_precision_loss)]
            Some(Token::Int(v)) => v as f64,
            Some(other) => return Err(self.error(format!("invalid version '{other}'"))),
            None => return Err(self.error("missing version number")),
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let major = version.trunc() as u64;
        if major != self.dialect.major() {
            return Err(self.error(format!(
                "expected OpenQASM {} source, found version {version}",
                self.dialect.major()
            )));
        }
        Ok(())
    }

    fn parse_identifier(&mut self) -> FormatResult<String> {
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(name),
            Some(other) => {
                self.pos -= 1;
                Err(self.error(format!("expected identifier, found '{other}'")))
            }
            None => Err(self.error("expected identifier, found end of input")),
        }
    }

    fn parse_identifier_list(&mut self) -> FormatResult<Vec<String>> {
        let mut names = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            names.push(self.parse_identifier()?);
        }
        Ok(names)
    }

    fn parse_int(&mut self) -> FormatResult<u64> {
        match self.advance() {
            Some(Token::Int(v)) => Ok(v),
            Some(other) => {
                self.pos -= 1;
                Err(self.error(format!("expected integer, found '{other}'")))
            }
            None => Err(self.error("expected integer, found end of input")),
        }
    }

    fn parse_size(&mut self) -> FormatResult<usize> {
        let value = self.parse_int()?;
        usize::try_from(value).map_err(|_| self.error(format!("size {value} is too large")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qasm::ast::{BinOp, Expr, GateCall, Operand, Statement};

    fn qasm2(source: &str) -> FormatResult<QasmProgram> {
        parse(source, Dialect::Qasm2)
    }

    fn qasm3(source: &str) -> FormatResult<QasmProgram> {
        parse(source, Dialect::Qasm3)
    }

    #[test]
    fn test_parse_qasm2_program() {
        let program = qasm2(
            r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
            "#,
        )
        .unwrap();

        assert_eq!(
            program.statements,
            vec![
                Statement::QubitDecl {
                    name: "q".into(),
                    size: Some(2)
                },
                Statement::BitDecl {
                    name: "c".into(),
                    size: Some(2)
                },
                Statement::Gate(GateCall {
                    name: "h".into(),
                    params: vec![],
                    qubits: vec![Operand::indexed("q", 0)],
                }),
                Statement::Gate(GateCall {
                    name: "cx".into(),
                    params: vec![],
                    qubits: vec![Operand::indexed("q", 0), Operand::indexed("q", 1)],
                }),
                Statement::Measure {
                    qubit: Operand::whole("q"),
                    target: Operand::whole("c"),
                },
            ]
        );
    }

    #[test]
    fn test_parse_qasm3_declarations_and_measure() {
        let program = qasm3(
            "OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[2] q;\nqubit a;\nbit[2] c;\nc[0] = measure q[0];\n",
        )
        .unwrap();

        assert_eq!(program.statements.len(), 4);
        assert_eq!(
            program.statements[1],
            Statement::QubitDecl {
                name: "a".into(),
                size: None
            }
        );
        assert_eq!(
            program.statements[3],
            Statement::Measure {
                qubit: Operand::indexed("q", 0),
                target: Operand::indexed("c", 0),
            }
        );
    }

    #[test]
    fn test_parse_parameter_expression() {
        let program = qasm2("qreg q[1];\nrx(-pi/2 + 0.5) q[0];").unwrap();
        let Statement::Gate(call) = &program.statements[1] else {
            panic!("expected gate call");
        };
        assert_eq!(
            call.params[0],
            Expr::Binary {
                op: BinOp::Add,
                lhs: Box::new(Expr::Binary {
                    op: BinOp::Div,
                    lhs: Box::new(Expr::Neg(Box::new(Expr::Pi))),
                    rhs: Box::new(Expr::Number(2.0)),
                }),
                rhs: Box::new(Expr::Number(0.5)),
            }
        );
    }

    #[test]
    fn test_version_mismatch() {
        let err = qasm2("OPENQASM 3.0;\nqubit q;").unwrap_err();
        assert!(matches!(err, FormatError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_missing_semicolon_reports_line() {
        let err = qasm2("qreg q[1];\n\nh q[0]\nx q[0];").unwrap_err();
        assert!(matches!(err, FormatError::Parse { line: 4, .. }), "{err}");
    }

    #[test]
    fn test_qasm3_only_constructs_rejected() {
        for source in [
            "qubit[2] q;\nfor int i in [0:1] { h q[i]; }",
            "qubit q;\nctrl @ x q, q;",
            "qubit q;\ninv @ h q;",
            "input angle theta;",
            "qubit[2] q;\ndelay[100ns] q;",
            "def f(qubit a) { h a; }",
            "int x = 3;",
            "qubit[4] q;\nh q[0:2];",
        ] {
            let err = qasm3(source).unwrap_err();
            assert!(
                matches!(err, FormatError::UnsupportedFeature { .. }),
                "{source}: {err}"
            );
        }
    }

    #[test]
    fn test_opaque_rejected() {
        let err = qasm2("opaque magic q;").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_unknown_include_rejected() {
        let err = qasm2("include \"mylib.inc\";").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_gate_definition() {
        let program = qasm2("gate rot(theta) a, b { rz(theta) a; cx a, b; }").unwrap();
        let Statement::GateDef(def) = &program.statements[0] else {
            panic!("expected gate definition");
        };
        assert_eq!(def.name, "rot");
        assert_eq!(def.params, vec!["theta"]);
        assert_eq!(def.qubits, vec!["a", "b"]);
        assert_eq!(def.body.len(), 2);
        assert_eq!(def.body[0].params, vec![Expr::Ident("theta".into())]);
    }

    #[test]
    fn test_qasm3_if_block_is_split() {
        let program = qasm3("qubit q;\nbit[1] c;\nif (c == 1) { x q; h q; }").unwrap();
        assert_eq!(program.statements.len(), 4);
        assert!(matches!(&program.statements[2], Statement::If { register, value: 1, .. } if register == "c"));
    }

    #[test]
    fn test_bit_condition_rejected() {
        let err = qasm3("qubit q;\nbit[2] c;\nif (c[0] == 1) x q;").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFeature { .. }));
    }
}
