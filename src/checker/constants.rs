//! Compile-time evaluation of constant expressions
//!
//! Used to decide whether an `i32`-typed expression may be narrowed
//! implicitly. Only literals, parentheses, explicit casts, unary `+ - ~` and
//! the arithmetic and bitwise binary operators are constant. Variables and
//! calls never are.
//!
//! Integer arithmetic is carried out on 64 bits with wrapping semantics and
//! shift amounts masked to 6 bits; `>>>` is a logical shift. A cast
//! truncates to the width of its target, with `char` read as unsigned 16-bit.

use crate::parser::ast::{BaseType, BinOp, ConstValue, Expression, SourceLocation, UnOp};

/// A constant divisor of zero in `/` or `%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionByZero {
    pub location: SourceLocation,
}

/// Fold `expression` to a value.
///
/// Returns `Ok(None)` for anything that is not a constant. Literal values
/// must already be resolved.
pub fn fold(expression: &Expression) -> Result<Option<ConstValue>, DivisionByZero> {
    match expression {
        Expression::Literal(literal) => Ok(literal.value),
        Expression::Parenthesis { inner, .. } => fold(inner),
        Expression::UnaryOp { op, operand, .. } => {
            let Some(value) = fold(operand)? else {
                return Ok(None);
            };
            Ok(fold_unary(*op, value))
        }
        Expression::BinaryOp { op, lhs, rhs, .. } => {
            let (Some(left), Some(right)) = (fold(lhs)?, fold(rhs)?) else {
                return Ok(None);
            };
            fold_binary(*op, left, right, rhs.location())
        }
        Expression::TypeCast { target, inner, .. } => {
            if !target.is_scalar() {
                return Ok(None);
            }
            let Some(value) = fold(inner)? else {
                return Ok(None);
            };
            Ok(cast(&target.base, value))
        }
        Expression::Variable(_) | Expression::FunctionCall(_) => Ok(None),
    }
}

fn fold_unary(op: UnOp, value: ConstValue) -> Option<ConstValue> {
    match (op, value) {
        (UnOp::Plus, value) => Some(value),
        (UnOp::Neg, ConstValue::Int(v)) => Some(ConstValue::Int(v.wrapping_neg())),
        (UnOp::Neg, ConstValue::Float(v)) => Some(ConstValue::Float(-v)),
        (UnOp::BitNot, ConstValue::Int(v)) => Some(ConstValue::Int(!v)),
        (UnOp::BitNot, ConstValue::Float(_)) | (UnOp::Not, _) => None,
    }
}

fn fold_binary(
    op: BinOp,
    left: ConstValue,
    right: ConstValue,
    divisor: SourceLocation,
) -> Result<Option<ConstValue>, DivisionByZero> {
    match (left, right) {
        (ConstValue::Int(a), ConstValue::Int(b)) => {
            if matches!(op, BinOp::Div | BinOp::Mod) && b == 0 {
                return Err(DivisionByZero { location: divisor });
            }
            let value = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mul => a.wrapping_mul(b),
                BinOp::Div => a.wrapping_div(b),
                BinOp::Mod => a.wrapping_rem(b),
                BinOp::BitAnd => a & b,
                BinOp::BitOr => a | b,
                BinOp::BitXor => a ^ b,
                // wrapping_sh* masks the amount to the low 6 bits
                BinOp::BitShl => a.wrapping_shl(b as u32),
                BinOp::BitShr => a.wrapping_shr(b as u32),
                BinOp::BitUShr => (a as u64).wrapping_shr(b as u32) as i64,
                _ => return Ok(None),
            };
            Ok(Some(ConstValue::Int(value)))
        }
        (a, b) => {
            let (a, b) = (as_float(a), as_float(b));
            let value = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
                _ => return Ok(None),
            };
            Ok(Some(ConstValue::Float(value)))
        }
    }
}

fn as_float(value: ConstValue) -> f64 {
    match value {
        ConstValue::Int(v) => v as f64,
        ConstValue::Float(v) => v,
    }
}

fn as_integer(value: ConstValue) -> i64 {
    match value {
        ConstValue::Int(v) => v,
        // saturating, NaN becomes 0
        ConstValue::Float(v) => v as i64,
    }
}

fn cast(target: &BaseType, value: ConstValue) -> Option<ConstValue> {
    let converted = match target {
        BaseType::I8 => ConstValue::Int(i64::from(as_integer(value) as i8)),
        BaseType::I16 => ConstValue::Int(i64::from(as_integer(value) as i16)),
        BaseType::I32 => ConstValue::Int(i64::from(as_integer(value) as i32)),
        BaseType::I64 => ConstValue::Int(as_integer(value)),
        BaseType::Char => ConstValue::Int(i64::from(as_integer(value) as u16)),
        BaseType::F32 => ConstValue::Float(f64::from(as_float(value) as f32)),
        BaseType::F64 => ConstValue::Float(as_float(value)),
        _ => return None,
    };
    Some(converted)
}
