//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, its token helpers, and the
//! top-level loop that tells functions and structs apart.
//!
//! # Parser Architecture
//!
//! - This module: Parser struct, helper methods, and file scope
//! - `declarations`: types, function and struct declarations
//! - `statements`: statement dispatch and bodies
//! - `expressions`: Pratt expression parsing, variables and calls
//!
//! The token stream has no end marker. Running out of tokens where more are
//! required is a syntax error reported at the last token.

use crate::config::Settings;
use crate::diagnostics::{CompileError, ErrorKind, Reporter, SourceFile};
use crate::parser::ast::*;
use crate::parser::builtins;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use tracing::debug;

/// Recursive descent parser for ABC
pub struct Parser<'a> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) reporter: Reporter<'a>,
}

impl<'a> Parser<'a> {
    /// Lex `source` and prepare a parser over its tokens.
    pub fn new(source: &'a SourceFile, settings: &Settings) -> Result<Self, CompileError> {
        let tokens = Lexer::new(source, settings).tokenize()?;
        Ok(Self::from_tokens(tokens, source, settings))
    }

    pub fn from_tokens(tokens: Vec<Token>, source: &'a SourceFile, settings: &Settings) -> Self {
        Self {
            tokens,
            position: 0,
            reporter: Reporter::new(source, settings),
        }
    }

    /// Parse the whole token stream into a program seeded with the built-in
    /// library headers.
    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut program = Program::new();
        builtins::preload(&mut program);

        while let Some(token) = self.peek() {
            if self.is_function_start() {
                let function = self.parse_function()?;
                program.functions.push(function);
            } else if self.is_struct_start() {
                let struct_def = self.parse_struct()?;
                program.structs.push(struct_def);
            } else {
                return Err(self.error_at(
                    token.location,
                    format!("unexpected {} in file scope.", token),
                ));
            }
        }

        debug!(
            functions = program.user_functions().count(),
            structs = program.structs.len(),
            "parsed program"
        );
        Ok(program)
    }

    /// `name :: (`
    fn is_function_start(&self) -> bool {
        self.check_kind_at(0, TokenKind::Identifier)
            && self.check_symbol_at(1, "::")
            && self.check_symbol_at(2, "(")
    }

    /// `Name :: struct`
    fn is_struct_start(&self) -> bool {
        self.check_kind_at(0, TokenKind::Identifier)
            && self.check_symbol_at(1, "::")
            && self.peek_ahead(2).is_some_and(|t| t.is_keyword("struct"))
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub(crate) fn check_symbol(&self, text: &str) -> bool {
        self.check_symbol_at(0, text)
    }

    pub(crate) fn check_symbol_at(&self, n: usize, text: &str) -> bool {
        self.peek_ahead(n).is_some_and(|t| t.is_symbol(text))
    }

    pub(crate) fn check_keyword(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(text))
    }

    pub(crate) fn check_kind_at(&self, n: usize, kind: TokenKind) -> bool {
        self.peek_ahead(n).is_some_and(|t| t.kind == kind)
    }

    /// Consume the symbol if it is next.
    pub(crate) fn match_symbol(&mut self, text: &str) -> bool {
        if self.check_symbol(text) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Consume the next token, whatever it is. `expected` names the construct
    /// for the end-of-file error.
    pub(crate) fn advance(&mut self, expected: &str) -> Result<Token, CompileError> {
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                Ok(token.clone())
            }
            None => Err(self.end_of_file(expected)),
        }
    }

    pub(crate) fn expect_symbol(&mut self, text: &str, ctx: &str) -> Result<Token, CompileError> {
        let token = self.advance(&format!("\"{}\" {}", text, ctx))?;
        if token.is_symbol(text) {
            Ok(token)
        } else {
            Err(self.error_at(
                token.location,
                format!("expected \"{}\" {}, but got {}.", text, ctx, token),
            ))
        }
    }

    pub(crate) fn expect_keyword(&mut self, text: &str, ctx: &str) -> Result<Token, CompileError> {
        let token = self.advance(&format!("\"{}\" {}", text, ctx))?;
        if token.is_keyword(text) {
            Ok(token)
        } else {
            Err(self.error_at(
                token.location,
                format!("expected \"{}\" {}, but got {}.", text, ctx, token),
            ))
        }
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<Token, CompileError> {
        let token = self.advance(&format!("an identifier {}", ctx))?;
        if token.is_identifier() {
            Ok(token)
        } else {
            Err(self.error_at(
                token.location,
                format!("expected an identifier {}, but got {}.", ctx, token),
            ))
        }
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|t| t.location)
            .unwrap_or_default()
    }

    pub(crate) fn error_at(&self, location: SourceLocation, message: impl Into<String>) -> CompileError {
        self.reporter.report(ErrorKind::Syntax, location, message)
    }

    /// Premature end of input, reported at the last token.
    pub(crate) fn end_of_file(&self, expected: &str) -> CompileError {
        let location = self.tokens.last().map(|t| t.location).unwrap_or_default();
        self.error_at(
            location,
            format!("unexpected end of file, expected {}.", expected),
        )
    }
}
