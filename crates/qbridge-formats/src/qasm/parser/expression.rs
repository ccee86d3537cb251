//! Parameter expression parsing.

use super::Parser;
use crate::error::FormatResult;
use crate::qasm::ast::{BinOp, Dialect, Expr, FUNCTIONS};
use crate::qasm::lexer::Token;

impl Parser {
    pub(super) fn parse_expression(&mut self) -> FormatResult<Expr> {
        self.parse_binary_expr(0)
    }

    /// Precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> FormatResult<Expr> {
        let mut lhs = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op()? {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();

            let next = if op.is_right_assoc() { prec } else { prec + 1 };
            let rhs = self.parse_binary_expr(next)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_unary_expr(&mut self) -> FormatResult<Expr> {
        if self.consume(&Token::Minus) {
            let inner = self.parse_unary_expr()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary_expr();
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> FormatResult<Expr> {
        let token = match self.advance() {
            Some(token) => token,
            None => return Err(self.error("expected expression, found end of input")),
        };

        match token {
            #[allow(clippy::cast_precision_loss)]
            Token::Int(v) => Ok(Expr::Number(v as f64)),
            Token::Float(v) => Ok(Expr::Number(v)),
            Token::Pi => Ok(Expr::Pi),
            Token::Identifier(name) => match name.as_str() {
                "pi" => Ok(Expr::Pi),
                "tau" if self.dialect == Dialect::Qasm3 => Ok(Expr::Tau),
                "euler" if self.dialect == Dialect::Qasm3 => Ok(Expr::Euler),
                func if FUNCTIONS.contains(&func) && self.check(&Token::LParen) => {
                    self.advance();
                    let arg = self.parse_expression()?;
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Call {
                        func: func.to_string(),
                        arg: Box::new(arg),
                    })
                }
                _ => Ok(Expr::Ident(name.clone())),
            },
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => {
                self.pos -= 1;
                Err(self.error(format!("expected expression, found '{other}'")))
            }
        }
    }

    /// Binary operator at the cursor. Power is `^` in OpenQASM 2 and `**`
    /// in OpenQASM 3; `^` is bitwise xor in OpenQASM 3.
    fn peek_binary_op(&self) -> FormatResult<Option<BinOp>> {
        Ok(match self.peek() {
            Some(Token::Plus) => Some(BinOp::Add),
            Some(Token::Minus) => Some(BinOp::Sub),
            Some(Token::Star) => Some(BinOp::Mul),
            Some(Token::Slash) => Some(BinOp::Div),
            Some(Token::Caret) if self.dialect == Dialect::Qasm2 => Some(BinOp::Pow),
            Some(Token::Power) if self.dialect == Dialect::Qasm3 => Some(BinOp::Pow),
            Some(Token::Caret) => return Err(self.unsupported("bitwise operators")),
            _ => None,
        })
    }

    pub(super) fn parse_expression_list(&mut self) -> FormatResult<Vec<Expr>> {
        if self.check(&Token::RParen) {
            return Ok(Vec::new());
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}
