//! Statement parsing implementation
//!
//! This module handles the statements allowed inside function bodies:
//!
//! - Declarations: `x: i32 = 42;`
//! - Definitions (assignments): `p.values[i] = new [10];`
//! - Control flow: `if`/`else`, `while`
//! - `return` and bare function calls
//!
//! # Grammar
//!
//! ```text
//! statement   ::= declaration | definition | return | call ";" | if | while
//! declaration ::= identifier ":" type ("=" assignment)? ";"
//! definition  ::= variable "=" assignment ";"
//! return      ::= "return" expression? ";"
//! if          ::= "if" "(" expression ")" block ("else" block)?
//! while       ::= "while" "(" expression ")" block
//! block       ::= "{" statement* "}"
//! assignment  ::= "new" ("[" expression "]")* | expression
//! ```
//!
//! Dispatch is decided by lookahead alone; nothing is parsed twice.

use crate::diagnostics::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl<'a> Parser<'a> {
    /// Parse statements up to, not including, the closing brace.
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Statement>, CompileError> {
        let mut statements = Vec::new();

        while !self.check_symbol("}") {
            if self.is_at_end() {
                return Err(self.end_of_file("\"}\" to close the block"));
            }
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Statement, CompileError> {
        if self.is_declaration() {
            return self.parse_declaration();
        }

        if self.is_definition() {
            return self.parse_definition();
        }

        if self.check_keyword("return") {
            return self.parse_return();
        }

        if self.check_kind_at(0, TokenKind::Identifier) && self.check_symbol_at(1, "(") {
            let call = self.parse_function_call()?;
            self.expect_symbol(";", "after function call")?;
            return Ok(Statement::Call(call));
        }

        if self.check_keyword("if") {
            return self.parse_if();
        }

        if self.check_keyword("while") {
            return self.parse_while();
        }

        let token = self.advance("a statement")?;
        Err(self.error_at(
            token.location,
            format!(
                "unexpected {} in a function body. Did you forget a \"}}\" before this token?",
                token
            ),
        ))
    }

    /// `name : type`
    fn is_declaration(&self) -> bool {
        self.check_kind_at(0, TokenKind::Identifier)
            && self.check_symbol_at(1, ":")
            && (self.check_kind_at(2, TokenKind::Identifier)
                || self.check_kind_at(2, TokenKind::Keyword)
                || self.check_symbol_at(2, "[")
                || self.check_symbol_at(2, ".."))
    }

    /// An identifier followed by `.field` and `[...]` accessors, then `=`.
    fn is_definition(&self) -> bool {
        if !self.check_kind_at(0, TokenKind::Identifier) {
            return false;
        }

        let mut offset = 1;
        loop {
            if self.check_symbol_at(offset, "=") {
                return true;
            }

            if self.check_symbol_at(offset, ".") && self.check_kind_at(offset + 1, TokenKind::Identifier) {
                offset += 2;
                continue;
            }

            if self.check_symbol_at(offset, "[") {
                let mut depth = 0usize;
                loop {
                    let Some(token) = self.peek_ahead(offset) else {
                        return false;
                    };
                    if token.is_symbol("[") {
                        depth += 1;
                    } else if token.is_symbol("]") {
                        depth -= 1;
                    }
                    offset += 1;
                    if depth == 0 {
                        break;
                    }
                }
                continue;
            }

            return false;
        }
    }

    fn parse_declaration(&mut self) -> Result<Statement, CompileError> {
        let name = self.expect_identifier("as variable name")?;
        self.expect_symbol(":", "after variable name")?;
        let var_type = self.parse_type()?;
        let location = name.location.to(self.previous_location());

        let init = if self.match_symbol("=") {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        self.expect_symbol(";", "after declaration")?;

        Ok(Statement::Declaration(Declaration {
            var_type,
            name: name.text,
            init,
            location,
        }))
    }

    fn parse_definition(&mut self) -> Result<Statement, CompileError> {
        let lhs = self.parse_variable()?;
        self.expect_symbol("=", "in assignment")?;
        let rhs = self.parse_assignment()?;
        self.expect_symbol(";", "after assignment")?;

        let location = lhs.full_location();
        Ok(Statement::Definition { lhs, rhs, location })
    }

    /// `new [size]*` or an expression.
    pub(crate) fn parse_assignment(&mut self) -> Result<Assignment, CompileError> {
        if !self.check_keyword("new") {
            return Ok(Assignment::Expression(self.parse_expression(0, false, false)?));
        }

        let new = self.advance("\"new\"")?;
        let mut array_sizes = Vec::new();
        while self.match_symbol("[") {
            array_sizes.push(self.parse_expression(0, false, false)?);
            self.expect_symbol("]", "after array size")?;
        }

        Ok(Assignment::New {
            array_sizes,
            location: new.location.to(self.previous_location()),
        })
    }

    fn parse_return(&mut self) -> Result<Statement, CompileError> {
        let keyword = self.expect_keyword("return", "")?;

        let expression = if self.check_symbol(";") {
            None
        } else {
            Some(self.parse_expression(0, false, false)?)
        };
        self.expect_symbol(";", "after return statement")?;

        let location = match &expression {
            Some(expression) => keyword.location.to(expression.location()),
            None => keyword.location,
        };
        Ok(Statement::Return {
            expression,
            location,
        })
    }

    fn parse_if(&mut self) -> Result<Statement, CompileError> {
        let keyword = self.expect_keyword("if", "")?;
        let condition = self.parse_condition("if")?;
        let location = keyword.location.to(self.previous_location());
        let then_body = self.parse_block("if")?;

        let else_body = if self.check_keyword("else") {
            self.position += 1;
            Some(self.parse_block("else")?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
            location,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, CompileError> {
        let keyword = self.expect_keyword("while", "")?;
        let condition = self.parse_condition("while")?;
        let location = keyword.location.to(self.previous_location());
        let body = self.parse_block("while")?;

        Ok(Statement::While {
            condition,
            body,
            location,
        })
    }

    /// `( expression )` after `if` or `while`.
    fn parse_condition(&mut self, ctx: &str) -> Result<Expression, CompileError> {
        self.expect_symbol("(", &format!("after \"{}\"", ctx))?;
        let condition = self.parse_expression(0, false, false)?;
        self.expect_symbol(")", &format!("to close the \"{}\" condition", ctx))?;
        Ok(condition)
    }

    fn parse_block(&mut self, ctx: &str) -> Result<Vec<Statement>, CompileError> {
        self.expect_symbol("{", &format!("to open the \"{}\" body", ctx))?;
        let statements = self.parse_block_statements()?;
        self.expect_symbol("}", &format!("to close the \"{}\" body", ctx))?;
        Ok(statements)
    }
}
