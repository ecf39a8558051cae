//! Expression parsing implementation
//!
//! Expressions are parsed with a Pratt loop. A prefix form is parsed first
//! (literal, parenthesis or type cast, variable chain or call, unary operator),
//! then infix operators are folded in while their left binding power is at
//! least the caller's minimum.
//!
//! # Binding powers
//!
//! | operators                 | power |
//! |---------------------------|-------|
//! | `(type)` cast             | 100   |
//! | unary `- + ! ~`           | 21    |
//! | `% * /`                   | 20    |
//! | `+ -`                     | 16    |
//! | `<< >> >>>`               | 14    |
//! | `== < > <= >=`            | 13    |
//! | `!=`                      | 12    |
//! | `&`                       | 11    |
//! | `^`                       | 10    |
//! | `\|`                      | 9     |
//! | `&&`                      | 8     |
//! | `\|\|`                    | 7     |
//!
//! Powers are stored scaled by ten. The right power of an infix operator is
//! one above its left power, which folds equal-precedence chains to the left.

use crate::diagnostics::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

const PREFIX_BINDING_POWER: u16 = 211;
const CAST_BINDING_POWER: u16 = 1000;

/// (left, right) binding power of an infix operator.
pub fn infix_binding_power(op: BinOp) -> (u16, u16) {
    let base: u16 = match op {
        BinOp::Mod | BinOp::Mul | BinOp::Div => 20,
        BinOp::Add | BinOp::Sub => 16,
        BinOp::BitShl | BinOp::BitShr | BinOp::BitUShr => 14,
        BinOp::Eq | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 13,
        BinOp::Ne => 12,
        BinOp::BitAnd => 11,
        BinOp::BitXor => 10,
        BinOp::BitOr => 9,
        BinOp::And => 8,
        BinOp::Or => 7,
    };
    (base * 10, base * 10 + 1)
}

impl<'a> Parser<'a> {
    /// Parse an expression whose operators bind at least as tight as
    /// `min_power`.
    ///
    /// `in_call` makes `,` end the expression. `after_unary` is set for the
    /// operand of a unary operator, which may not start with another one.
    pub(crate) fn parse_expression(
        &mut self,
        min_power: u16,
        in_call: bool,
        after_unary: bool,
    ) -> Result<Expression, CompileError> {
        let mut lhs = self.parse_prefix(in_call, after_unary)?;

        loop {
            let Some(token) = self.peek() else {
                return Err(self.end_of_file("an operator or the end of the expression"));
            };

            if token.is_symbol("]")
                || token.is_symbol(";")
                || token.is_symbol(")")
                || (in_call && token.is_symbol(","))
            {
                break;
            }

            let op = match BinOp::from_symbol(&token.text) {
                Some(op) if token.kind == TokenKind::Operator => op,
                _ => {
                    return Err(self.error_at(
                        token.location,
                        format!("expected an infix operator, but got {}.", token),
                    ))
                }
            };

            let (left_power, right_power) = infix_binding_power(op);
            if left_power < min_power {
                break;
            }
            self.position += 1;

            let rhs = self.parse_expression(right_power, in_call, false)?;
            lhs = Expression::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                resolved_type: None,
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self, in_call: bool, after_unary: bool) -> Result<Expression, CompileError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.end_of_file("an expression"));
        };

        if let Some(kind) = token.literal {
            self.position += 1;
            return Ok(Expression::Literal(Literal::new(
                token.text,
                kind,
                token.location,
            )));
        }

        if token.is_symbol("(") {
            return if self.is_type_cast() {
                self.parse_type_cast(in_call)
            } else {
                self.parse_parenthesis()
            };
        }

        if token.is_identifier() {
            if self.check_symbol_at(1, "(") {
                return Ok(Expression::FunctionCall(self.parse_function_call()?));
            }
            return Ok(Expression::Variable(self.parse_variable()?));
        }

        if token.kind == TokenKind::Operator {
            if after_unary {
                return Err(self.error_at(
                    token.location,
                    "an unary operator can't precede another unary operator. Consider adding parenthesis.",
                ));
            }
            let Some(op) = UnOp::from_symbol(&token.text) else {
                return Err(self.error_at(
                    token.location,
                    format!("{} is not a unary operator.", token),
                ));
            };
            self.position += 1;

            let operand = self.parse_expression(PREFIX_BINDING_POWER, in_call, true)?;
            let location = token.location.to(operand.location());
            return Ok(Expression::UnaryOp {
                op,
                operand: Box::new(operand),
                resolved_type: None,
                location,
            });
        }

        Err(self.error_at(
            token.location,
            format!("unexpected {} at the start of an expression.", token),
        ))
    }

    /// `(` followed by one identifier or keyword and `)`.
    fn is_type_cast(&self) -> bool {
        self.check_symbol_at(0, "(")
            && (self.check_kind_at(1, TokenKind::Identifier) || self.check_kind_at(1, TokenKind::Keyword))
            && self.check_symbol_at(2, ")")
    }

    fn parse_type_cast(&mut self, in_call: bool) -> Result<Expression, CompileError> {
        let open = self.expect_symbol("(", "to open the type cast")?;
        let target = self.parse_type()?;
        self.expect_symbol(")", "to close the type cast")?;

        let inner = self.parse_expression(CAST_BINDING_POWER, in_call, false)?;
        let location = open.location.to(inner.location());
        Ok(Expression::TypeCast {
            target,
            inner: Box::new(inner),
            is_implicit: false,
            constant: None,
            resolved_type: None,
            location,
        })
    }

    fn parse_parenthesis(&mut self) -> Result<Expression, CompileError> {
        let open = self.expect_symbol("(", "to open the parenthesis")?;
        let inner = self.parse_expression(0, false, false)?;
        let close = self.expect_symbol(")", "to close the parenthesis")?;

        Ok(Expression::Parenthesis {
            inner: Box::new(inner),
            resolved_type: None,
            location: open.location.to(close.location),
        })
    }

    /// `name ([index])* (. variable)?`
    pub(crate) fn parse_variable(&mut self) -> Result<Variable, CompileError> {
        let name = self.expect_identifier("as variable name")?;
        let mut variable = Variable::new(name.text, name.location);

        while self.match_symbol("[") {
            variable.indices.push(self.parse_expression(0, false, false)?);
            self.expect_symbol("]", "after array index")?;
        }
        variable.location = name.location.to(self.previous_location());

        if self.match_symbol(".") {
            variable.child = Some(Box::new(self.parse_variable()?));
        }

        Ok(variable)
    }

    /// `name ( arguments )`
    pub(crate) fn parse_function_call(&mut self) -> Result<FunctionCall, CompileError> {
        let name = self.expect_identifier("as function name")?;
        self.expect_symbol("(", "to open the argument list")?;

        let mut arguments = Vec::new();
        if !self.check_symbol(")") {
            loop {
                arguments.push(self.parse_expression(0, true, false)?);
                if !self.match_symbol(",") {
                    break;
                }
            }
        }
        let close = self.expect_symbol(")", "to close the argument list")?;

        Ok(FunctionCall {
            name: name.text,
            arguments,
            resolved_type: None,
            location: name.location.to(close.location),
        })
    }
}
