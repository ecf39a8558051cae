//! Diagnostic rendering and reporting
//!
//! Every stage reports user errors through [`Reporter::report`]. The
//! reporter renders the message together with the offending source lines:
//!
//! ```text
//! File "main.abc", line 3
//!   x: i16 = 65536;
//!            ^^^^^
//! Error: Expression 65536 is out of bounds [-32768, 32767] for type I16.
//! ```
//!
//! In [`ErrorMode::Catchable`] the rendered error is returned to the caller.
//! In [`ErrorMode::Fatal`] it is printed to stderr and the process exits.

use crate::config::{ErrorMode, Settings, FATAL_EXIT_CODE};
use crate::parser::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Source text together with the name used in diagnostics.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Lines `line_start..=line_end` (1-based).
    fn excerpt(&self, line_start: usize, line_end: usize) -> Vec<&str> {
        self.text
            .lines()
            .enumerate()
            .filter(|(index, _)| (line_start..=line_end).contains(&(index + 1)))
            .map(|(_, line)| line)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lexical error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Semantic => write!(f, "semantic error"),
        }
    }
}

/// A user error traced back to the source file.
#[derive(Debug, Clone, Error)]
#[error("{rendered}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    /// Full diagnostic: file/line header, snippet, caret line, message.
    pub rendered: String,
}

/// Render a diagnostic for `location` in `source`.
pub fn render(source: &SourceFile, location: SourceLocation, message: &str) -> String {
    let mut out = String::new();

    if location.line_end > location.line_start {
        out.push_str(&format!(
            "File \"{}\", lines {}-{}\n",
            source.name, location.line_start, location.line_end
        ));
    } else {
        out.push_str(&format!(
            "File \"{}\", line {}\n",
            source.name, location.line_start
        ));
    }

    for line in source.excerpt(location.line_start, location.line_end) {
        out.push_str("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let indent = location.char_start.saturating_sub(1) + 2;
    let width = location.char_end.saturating_sub(location.char_start).max(1);
    out.push_str(&" ".repeat(indent));
    out.push_str(&"^".repeat(width));
    out.push('\n');

    out.push_str("Error: ");
    out.push_str(message);
    out
}

/// The single funnel for user errors.
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    source: &'a SourceFile,
    mode: ErrorMode,
}

impl<'a> Reporter<'a> {
    pub fn new(source: &'a SourceFile, settings: &Settings) -> Self {
        Self {
            source,
            mode: settings.error_mode,
        }
    }

    pub fn source(&self) -> &'a SourceFile {
        self.source
    }

    /// Build the error for `message` at `location`.
    ///
    /// In fatal mode this prints the diagnostic and exits the process, so it
    /// only returns in catchable mode.
    pub fn report(
        &self,
        kind: ErrorKind,
        location: SourceLocation,
        message: impl Into<String>,
    ) -> CompileError {
        let message = message.into();
        let rendered = render(self.source, location, &message);

        if self.mode == ErrorMode::Fatal {
            eprintln!("{}", rendered);
            std::process::exit(FATAL_EXIT_CODE);
        }

        CompileError {
            kind,
            message,
            location,
            rendered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_line() {
        let source = SourceFile::new("main.abc", "main :: () {\n    x: i16 = 65536;   \n}\n");
        let rendered = render(
            &source,
            SourceLocation::new(2, 14, 2, 19),
            "out of range",
        );

        assert_eq!(
            rendered,
            "File \"main.abc\", line 2\n      x: i16 = 65536;\n               ^^^^^\nError: out of range"
        );
    }

    #[test]
    fn test_render_line_range() {
        let source = SourceFile::new("a.abc", "f :: () {\n  g(1,\n    2);\n}");
        let rendered = render(&source, SourceLocation::new(2, 3, 3, 6), "bad call");

        assert!(rendered.starts_with("File \"a.abc\", lines 2-3\n"));
        assert!(rendered.contains("    g(1,\n"));
        assert!(rendered.contains("      2);\n"));
        assert!(rendered.ends_with("Error: bad call"));
    }

    #[test]
    fn test_catchable_report_returns_error() {
        let source = SourceFile::new("t.abc", "x");
        let reporter = Reporter::new(&source, &Settings::catchable());
        let err = reporter.report(ErrorKind::Syntax, SourceLocation::point(1, 1), "boom");

        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "boom");
        assert_eq!(err.to_string(), err.rendered);
        assert!(err.rendered.ends_with("Error: boom"));
    }
}
