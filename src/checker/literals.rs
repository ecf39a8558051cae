//! Literal text parsing
//!
//! The lexer only checks the shape of a literal. Its value, and whether that
//! value fits the literal's type, is decided here.

use crate::parser::ast::LiteralKind;

/// Code point of a character literal such as `'a'` or `'\n'`.
pub fn parse_char(raw: &str) -> Option<i64> {
    let inner = raw.strip_prefix('\'')?.strip_suffix('\'')?;
    let chars: Vec<char> = inner.chars().collect();

    let ch = match chars.as_slice() {
        [ch] => *ch,
        ['\\', escape] => match escape {
            't' => '\t',
            'b' => '\u{8}',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{c}',
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            _ => return None,
        },
        _ => return None,
    };

    let code = u32::from(ch);
    (code <= u32::from(u16::MAX)).then_some(i64::from(code))
}

/// Value of an `i32` or `i64` literal in decimal, `0b` binary or `0x` hex,
/// or `None` when it is outside the literal type's range.
pub fn parse_integer(raw: &str, kind: LiteralKind) -> Option<i64> {
    let digits = raw.strip_suffix('l').unwrap_or(raw);
    let (number, radix) = if let Some(hex) = digits.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(binary) = digits.strip_prefix("0b") {
        (binary, 2)
    } else {
        (digits, 10)
    };

    let value = i64::from_str_radix(number, radix).ok()?;
    match kind {
        LiteralKind::I32 => i32::try_from(value).ok().map(i64::from),
        LiteralKind::I64 => Some(value),
        _ => None,
    }
}

/// Value of an `f32` or `f64` literal; `None` unless finite.
pub fn parse_float(raw: &str, kind: LiteralKind) -> Option<f64> {
    let number = raw.strip_suffix('f').unwrap_or(raw);
    let value = match kind {
        LiteralKind::F32 => f64::from(number.parse::<f32>().ok()?),
        LiteralKind::F64 => number.parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
