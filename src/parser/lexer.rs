//! Lexer (tokenizer) for ABC source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! At each position the recognizers run in a fixed order: comments, floating
//! literals, operators and separators (longest first), reserved words, integer
//! literals, string and character literals, booleans, and finally identifiers.
//!
//! Every multi-character recognizer starts from a checkpoint and rolls the
//! cursor back when it fails, so the next recognizer sees the same prefix.
//! Comments are tokenized and then dropped before the stream is returned.

use super::ast::{LiteralKind, SourceLocation};
use crate::config::Settings;
use crate::diagnostics::{CompileError, ErrorKind, Reporter, SourceFile};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    Separator,
    Literal,
    Comment,
}

/// A lexed token with its source text and span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Set only for [`TokenKind::Literal`].
    pub literal: Option<LiteralKind>,
    pub location: SourceLocation,
}

impl Token {
    /// Operator or separator with exactly this text.
    pub fn is_symbol(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Separator) && self.text == text
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier \"{}\"", self.text),
            TokenKind::Keyword => write!(f, "keyword \"{}\"", self.text),
            TokenKind::Operator => write!(f, "operator \"{}\"", self.text),
            TokenKind::Separator => write!(f, "separator \"{}\"", self.text),
            TokenKind::Literal => match self.literal {
                Some(kind) => write!(f, "{:?} literal {}", kind, self.text),
                None => write!(f, "literal {}", self.text),
            },
            TokenKind::Comment => write!(f, "comment"),
        }
    }
}

/// Fixed symbols, longest first so that `>>>` wins over `>>` and `>`.
const SYMBOLS: &[(&str, TokenKind)] = &[
    (">>>", TokenKind::Operator),
    ("::", TokenKind::Separator),
    ("..", TokenKind::Separator),
    ("->", TokenKind::Separator),
    ("<<", TokenKind::Operator),
    (">>", TokenKind::Operator),
    ("==", TokenKind::Operator),
    (">=", TokenKind::Operator),
    ("<=", TokenKind::Operator),
    ("!=", TokenKind::Operator),
    ("&&", TokenKind::Operator),
    ("||", TokenKind::Operator),
    (":", TokenKind::Separator),
    (".", TokenKind::Separator),
    (",", TokenKind::Separator),
    ("(", TokenKind::Separator),
    (")", TokenKind::Separator),
    ("{", TokenKind::Separator),
    ("}", TokenKind::Separator),
    (";", TokenKind::Separator),
    ("[", TokenKind::Operator),
    ("]", TokenKind::Operator),
    ("+", TokenKind::Operator),
    ("-", TokenKind::Operator),
    ("*", TokenKind::Operator),
    ("/", TokenKind::Operator),
    ("%", TokenKind::Operator),
    ("<", TokenKind::Operator),
    (">", TokenKind::Operator),
    ("!", TokenKind::Operator),
    ("~", TokenKind::Operator),
    ("&", TokenKind::Operator),
    ("^", TokenKind::Operator),
    ("|", TokenKind::Operator),
    ("=", TokenKind::Operator),
];

pub const RESERVED_WORDS: &[&str] = &[
    "new", "#lib", "return", "if", "else", "while", "struct", "string", "bool", "i8", "i16",
    "i32", "i64", "f32", "f64", "char", "any",
];

#[derive(Debug, Clone, Copy)]
struct Cursor {
    position: usize,
    line: usize,
    column: usize,
}

/// Lexer for ABC source code
pub struct Lexer<'a> {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    checkpoint: Cursor,
    reporter: Reporter<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a SourceFile, settings: &Settings) -> Self {
        Self {
            input: source.text.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            checkpoint: Cursor {
                position: 0,
                line: 1,
                column: 1,
            },
            reporter: Reporter::new(source, settings),
        }
    }

    /// Tokenize the entire input. Comments are not returned.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let token = self.next_token()?;
            if token.kind != TokenKind::Comment {
                tokens.push(token);
            }
        }

        debug!(tokens = tokens.len(), "lexed source");
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, CompileError> {
        self.mark();

        if let Some(token) = self.comment()? {
            return Ok(token);
        }
        if let Some(token) = self.floating_literal() {
            return Ok(token);
        }
        if let Some(token) = self.symbol() {
            return Ok(token);
        }
        if let Some(token) = self.reserved_word() {
            return Ok(token);
        }
        if let Some(token) = self.integer_literal() {
            return Ok(token);
        }
        if let Some(token) = self.string_literal()? {
            return Ok(token);
        }
        if let Some(token) = self.char_literal() {
            return Ok(token);
        }
        if let Some(token) = self.boolean_literal() {
            return Ok(token);
        }
        if let Some(token) = self.identifier() {
            return Ok(token);
        }

        let ch = self.peek().unwrap_or(' ');
        Err(self.reporter.report(
            ErrorKind::Lexical,
            SourceLocation::point(self.line, self.column),
            format!("invalid syntax \"{}\".", ch),
        ))
    }

    /// `//` to end of line, or `/* ... */` with nesting.
    fn comment(&mut self) -> Result<Option<Token>, CompileError> {
        if self.starts_with("//") {
            while let Some(ch) = self.peek() {
                if ch == '\n' || ch == '\r' {
                    break;
                }
                self.advance();
            }
            return Ok(Some(self.emit(TokenKind::Comment, None)));
        }

        if self.starts_with("/*") {
            let start = self.checkpoint;
            self.advance_by(2);
            let mut depth = 1usize;

            while depth > 0 {
                if self.is_at_end() {
                    return Err(self.reporter.report(
                        ErrorKind::Lexical,
                        SourceLocation::new(start.line, start.column, start.line, start.column + 2),
                        "unterminated block comment.",
                    ));
                }
                if self.starts_with("/*") {
                    self.advance_by(2);
                    depth += 1;
                } else if self.starts_with("*/") {
                    self.advance_by(2);
                    depth -= 1;
                } else {
                    self.advance();
                }
            }
            return Ok(Some(self.emit(TokenKind::Comment, None)));
        }

        Ok(None)
    }

    /// `12.5`, `.8f`, `3f`, `1.`. A plain integer is left to
    /// [`Self::integer_literal`].
    fn floating_literal(&mut self) -> Option<Token> {
        let first = self.peek()?;
        if first == '0' && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }

        let has_integer_part = self.eat_while(|c| c.is_ascii_digit());
        let mut has_dot = false;
        let mut has_decimal_part = false;
        if self.peek() == Some('.') {
            self.advance();
            has_dot = true;
            has_decimal_part = self.eat_while(|c| c.is_ascii_digit());
        }
        let has_suffix = if self.peek() == Some('f') {
            self.advance();
            true
        } else {
            false
        };

        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            self.rollback();
            return None;
        }

        let has_digits = has_integer_part || (has_dot && has_decimal_part);
        let kind = if has_suffix && has_digits {
            LiteralKind::F32
        } else if has_dot && has_digits {
            LiteralKind::F64
        } else {
            self.rollback();
            return None;
        };

        Some(self.emit(TokenKind::Literal, Some(kind)))
    }

    fn symbol(&mut self) -> Option<Token> {
        for (text, kind) in SYMBOLS {
            if self.starts_with(text) {
                self.advance_by(text.chars().count());
                return Some(self.emit(*kind, None));
            }
        }
        None
    }

    fn reserved_word(&mut self) -> Option<Token> {
        if self.eat_word("nil") {
            return Some(self.emit(TokenKind::Literal, Some(LiteralKind::Nil)));
        }
        for word in RESERVED_WORDS {
            if self.eat_word(word) {
                return Some(self.emit(TokenKind::Keyword, None));
            }
        }
        None
    }

    /// Decimal, `0b` binary or `0x` hex, with an optional `l` suffix.
    fn integer_literal(&mut self) -> Option<Token> {
        let first = self.peek()?;
        if !first.is_ascii_digit() {
            return None;
        }

        let digits_found = match (first, self.peek_ahead(1)) {
            ('0', Some('b')) => {
                self.advance_by(2);
                self.eat_while(|c| c == '0' || c == '1')
            }
            ('0', Some('x')) => {
                self.advance_by(2);
                self.eat_while(|c| c.is_ascii_hexdigit())
            }
            ('0', Some(c)) if c.is_ascii_digit() => false,
            _ => self.eat_while(|c| c.is_ascii_digit()),
        };
        if !digits_found {
            self.rollback();
            return None;
        }

        let kind = if self.peek() == Some('l') {
            self.advance();
            LiteralKind::I64
        } else {
            LiteralKind::I32
        };

        if self.peek().is_some_and(|c| is_word_continue(c) || c == '.') {
            self.rollback();
            return None;
        }

        Some(self.emit(TokenKind::Literal, Some(kind)))
    }

    /// `"..."`. A backslash skips the following character so an escaped
    /// quote does not end the literal.
    fn string_literal(&mut self) -> Result<Option<Token>, CompileError> {
        if self.peek() != Some('"') {
            return Ok(None);
        }
        self.advance();

        loop {
            match self.advance() {
                None => {
                    let start = self.checkpoint;
                    return Err(self.reporter.report(
                        ErrorKind::Lexical,
                        SourceLocation::point(start.line, start.column),
                        "unterminated string literal.",
                    ));
                }
                Some('\\') => {
                    self.advance();
                }
                Some('"') => break,
                Some(_) => {}
            }
        }

        Ok(Some(self.emit(TokenKind::Literal, Some(LiteralKind::String))))
    }

    /// `'x'` or `'\x'`. Escape validity is checked by the type checker.
    fn char_literal(&mut self) -> Option<Token> {
        if self.peek() != Some('\'') {
            return None;
        }
        self.advance();

        match self.advance() {
            Some('\\') => {
                self.advance();
            }
            Some('\'') | None => {
                self.rollback();
                return None;
            }
            Some(_) => {}
        }

        if self.peek() != Some('\'') {
            self.rollback();
            return None;
        }
        self.advance();

        Some(self.emit(TokenKind::Literal, Some(LiteralKind::Char)))
    }

    fn boolean_literal(&mut self) -> Option<Token> {
        if self.eat_word("true") || self.eat_word("false") {
            return Some(self.emit(TokenKind::Literal, Some(LiteralKind::Bool)));
        }
        None
    }

    fn identifier(&mut self) -> Option<Token> {
        let first = self.peek()?;
        if !(first.is_alphabetic() || first == '_') {
            return None;
        }
        self.eat_while(is_word_continue);
        Some(self.emit(TokenKind::Identifier, None))
    }

    // ===== Cursor helpers =====

    fn skip_whitespace(&mut self) {
        self.eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    }

    fn mark(&mut self) {
        self.checkpoint = Cursor {
            position: self.position,
            line: self.line,
            column: self.column,
        };
    }

    fn rollback(&mut self) {
        self.position = self.checkpoint.position;
        self.line = self.checkpoint.line;
        self.column = self.checkpoint.column;
    }

    /// Token spanning from the checkpoint to the cursor.
    fn emit(&self, kind: TokenKind, literal: Option<LiteralKind>) -> Token {
        let start = self.checkpoint;
        Token {
            kind,
            text: self.input[start.position..self.position].iter().collect(),
            literal,
            location: SourceLocation::new(start.line, start.column, self.line, self.column),
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, ch)| self.peek_ahead(offset) == Some(ch))
    }

    /// Consume `word` if it is not followed by an identifier character.
    fn eat_word(&mut self, word: &str) -> bool {
        let len = word.chars().count();
        if self.starts_with(word) && !self.peek_ahead(len).is_some_and(is_word_continue) {
            self.advance_by(len);
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds; true if any were consumed.
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let start = self.position;
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
        self.position > start
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

fn is_word_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<Token> {
        let source = SourceFile::new("test.abc", text);
        Lexer::new(&source, &Settings::default()).tokenize().unwrap()
    }

    fn lex_err(text: &str) -> CompileError {
        let source = SourceFile::new("test.abc", text);
        Lexer::new(&source, &Settings::default())
            .tokenize()
            .unwrap_err()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_function_header() {
        let tokens = lex("main :: () -> i32 { return 0; }");

        assert_eq!(
            texts(&tokens),
            vec!["main", "::", "(", ")", "->", "i32", "{", "return", "0", ";", "}"]
        );
        assert!(tokens[0].is_identifier());
        assert!(tokens[1].is_symbol("::"));
        assert_eq!(tokens[5].kind, TokenKind::Keyword);
        assert_eq!(tokens[8].literal, Some(LiteralKind::I32));
    }

    #[test]
    fn test_longest_operator_first() {
        let tokens = lex("a >>> b >> c > d");
        assert_eq!(texts(&tokens), vec!["a", ">>>", "b", ">>", "c", ">", "d"]);
    }

    #[test]
    fn test_floating_literals() {
        let tokens = lex(".8f 1.5 3f 2. 0.25");

        assert_eq!(tokens[0].literal, Some(LiteralKind::F32));
        assert_eq!(tokens[0].text, ".8f");
        assert_eq!(tokens[1].literal, Some(LiteralKind::F64));
        assert_eq!(tokens[2].literal, Some(LiteralKind::F32));
        assert_eq!(tokens[3].literal, Some(LiteralKind::F64));
        assert_eq!(tokens[4].literal, Some(LiteralKind::F64));
    }

    #[test]
    fn test_integer_bases_and_suffix() {
        let tokens = lex("42 0b101 0xFF 7l");

        assert_eq!(texts(&tokens), vec!["42", "0b101", "0xFF", "7l"]);
        assert_eq!(tokens[2].literal, Some(LiteralKind::I32));
        assert_eq!(tokens[3].literal, Some(LiteralKind::I64));
    }

    #[test]
    fn test_leading_zero_rejected() {
        let err = lex_err("x = 012;");
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.message, "invalid syntax \"0\".");
    }

    #[test]
    fn test_member_access_after_index_is_not_float() {
        let tokens = lex("a[1].length");
        assert_eq!(texts(&tokens), vec!["a", "[", "1", "]", ".", "length"]);
    }

    #[test]
    fn test_varargs_separator() {
        let tokens = lex("args: ..any");
        assert_eq!(texts(&tokens), vec!["args", ":", "..", "any"]);
    }

    #[test]
    fn test_reserved_word_boundary() {
        let tokens = lex("if iffy i32x truely nil nilly");

        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[4].literal, Some(LiteralKind::Nil));
        assert_eq!(tokens[5].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_library_binding_tokens() {
        let tokens = lex("#lib \"Preload\";");

        assert!(tokens[0].is_keyword("#lib"));
        assert_eq!(tokens[1].literal, Some(LiteralKind::String));
        assert_eq!(tokens[1].text, "\"Preload\"");
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let tokens = lex(r#""say \"hi\"" x"#);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, r#""say \"hi\"""#);
    }

    #[test]
    fn test_char_literals() {
        let tokens = lex(r"'a' '\n' '\''");

        assert_eq!(texts(&tokens), vec!["'a'", r"'\n'", r"'\''"]);
        assert!(tokens.iter().all(|t| t.literal == Some(LiteralKind::Char)));
    }

    #[test]
    fn test_booleans() {
        let tokens = lex("true false");
        assert!(tokens.iter().all(|t| t.literal == Some(LiteralKind::Bool)));
    }

    #[test]
    fn test_comments_dropped() {
        let tokens = lex("a // line\n/* outer /* inner */ still */ b");
        assert_eq!(texts(&tokens), vec!["a", "b"]);
    }

    #[test]
    fn test_unterminated_nested_comment() {
        let err = lex_err("a /* outer /* inner */ b");
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.message, "unterminated block comment.");
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex_err("s = \"abc");
        assert_eq!(err.message, "unterminated string literal.");
        assert_eq!(err.location, SourceLocation::point(1, 5));
    }

    #[test]
    fn test_invalid_character() {
        let err = lex_err("a $ b");
        assert_eq!(err.message, "invalid syntax \"$\".");
        assert_eq!(err.location, SourceLocation::point(1, 3));
    }

    #[test]
    fn test_locations() {
        let tokens = lex("x\n  foo >>> 1");

        assert_eq!(tokens[0].location, SourceLocation::new(1, 1, 1, 2));
        assert_eq!(tokens[1].location, SourceLocation::new(2, 3, 2, 6));
        assert_eq!(tokens[2].location, SourceLocation::new(2, 7, 2, 10));
    }
}
