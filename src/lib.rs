//! # Introduction
//!
//! `abcc` is the front end of a compiler for ABC, a small statically typed
//! language with primitive types, flat structs, fixed-rank arrays, varargs
//! and function overloading. It turns source text into a fully annotated AST
//! that a code generator can lower without further analysis.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST → TypeChecker → annotated AST
//! ```
//!
//! 1. [`parser`]: tokenizes the source and builds the AST, preloaded with
//!    the built-in library headers.
//! 2. [`checker`]: resolves names and overloads, types every expression,
//!    inserts default initializers and implicit narrowing casts.
//! 3. [`diagnostics`]: renders source snippets for the first error found in
//!    any stage.
//! 4. [`config`]: the [`Settings`](config::Settings) value threaded through
//!    every stage.
//!
//! ```
//! use abcc::config::Settings;
//! use abcc::diagnostics::SourceFile;
//!
//! let source = SourceFile::new("hello.abc", "main :: () { print(\"hi\"); }");
//! let program = abcc::compile(&source, &Settings::default()).unwrap();
//! assert!(program.has_program_entry);
//! ```

pub mod checker;
pub mod config;
pub mod diagnostics;
pub mod parser;

use std::fs;
use std::io;
use std::path::Path;

use checker::TypeChecker;
use config::Settings;
use diagnostics::{CompileError, SourceFile};
use parser::ast::Program;
use parser::parse::Parser;
use tracing::info;

/// Lex, parse and type check `source`.
pub fn compile(source: &SourceFile, settings: &Settings) -> Result<Program, CompileError> {
    let mut program = Parser::new(source, settings)?.parse_program()?;
    TypeChecker::new(source, settings).check(&mut program)?;

    info!(
        file = %source.name,
        functions = program.user_functions().count(),
        structs = program.structs.len(),
        "compiled"
    );
    Ok(program)
}

/// Read a source file, naming it by its path in diagnostics.
pub fn read_source(path: &Path) -> io::Result<SourceFile> {
    let text = fs::read_to_string(path)?;
    Ok(SourceFile::new(path.display().to_string(), text))
}

/// [`read_source`] followed by [`compile`]. The outer error is I/O only.
pub fn compile_file(
    path: &Path,
    settings: &Settings,
) -> io::Result<Result<Program, CompileError>> {
    let source = read_source(path)?;
    Ok(compile(&source, settings))
}
