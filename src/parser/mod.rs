//! ABC source code parser
//!
//! This module transforms ABC source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split across `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//! - [`builtins`]: library headers every program starts with
//!
//! # Language Summary
//!
//! - Types: `i8` to `i64`, `f32`, `f64`, `bool`, `char`, `string`, `any`,
//!   structs, arrays (`[]i32`) and trailing varargs parameters (`..any`)
//! - Statements: declarations, assignments, `if`/`else`, `while`, `return`,
//!   function calls
//! - Functions are overloadable and may be bound to an external library with
//!   `#lib "Name";` instead of a body
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent for declarations and statements, with a
//! Pratt loop for expressions. No external parser generator dependencies.

pub mod ast;
pub mod builtins;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use expressions::infix_binding_power;
