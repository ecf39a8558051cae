//! Type compatibility and promotion
//!
//! "Does `from` fit where `to` is expected" is asymmetric. It is decided first
//! by the varargs flags of both sides, then by array rank, and finally by the
//! scalar rules:
//!
//! - `Any` accepts anything
//! - `Object` (the type of `nil`) fits struct and string targets, and arrays
//! - equal categories fit; structs also need the same name
//! - numbers widen along `I8 < I16 < I32 < I64 < F32 < F64`
//! - `Char` widens into `Char` and numbers of rank `I32` or more
//! - `Bool` fits only `Bool`

use crate::parser::ast::{BaseType, Type};

pub fn does_type_fit(from: &Type, to: &Type) -> bool {
    match (from.is_varargs, to.is_varargs) {
        (true, true) => varargs_fit_both(from, to),
        (false, true) => non_varargs_fit(from, to),
        (true, false) => varargs_fit_from(from, to),
        (false, false) => non_varargs_fit(from, to),
    }
}

/// Fit in either direction.
pub fn are_types_compatible(a: &Type, b: &Type) -> bool {
    does_type_fit(a, b) || does_type_fit(b, a)
}

/// Plain values, arrays and array elements of a varargs target.
fn non_varargs_fit(from: &Type, to: &Type) -> bool {
    match (from.array_dimension, to.array_dimension) {
        (0, 0) => {
            if to.base == BaseType::Any {
                return true;
            }
            if from.base == BaseType::Object {
                return matches!(to.base, BaseType::Struct(_) | BaseType::String);
            }
            simple_type_fit(&from.base, &to.base)
        }
        (0, _) => from.base == BaseType::Object,
        (_, 0) => to.base == BaseType::Any,
        (from_dim, to_dim) => from_dim == to_dim && simple_types_match(&from.base, &to.base),
    }
}

/// A varargs value forwarded to another varargs parameter.
fn varargs_fit_both(from: &Type, to: &Type) -> bool {
    match (from.array_dimension, to.array_dimension) {
        (0, 0) => {
            if to.base == BaseType::Any {
                return true;
            }
            if from.base == BaseType::Object {
                return matches!(to.base, BaseType::Struct(_) | BaseType::String);
            }
            simple_types_match(&from.base, &to.base)
        }
        (0, _) => from.base == BaseType::Object,
        (_, 0) => to.base == BaseType::Any,
        (from_dim, to_dim) => from_dim == to_dim && simple_types_match(&from.base, &to.base),
    }
}

/// A varargs value used as a plain array one rank higher.
fn varargs_fit_from(from: &Type, to: &Type) -> bool {
    match (from.array_dimension, to.array_dimension) {
        (_, 0) => false,
        (0, to_dim) => to_dim == 1 && simple_type_fit(&from.base, &to.base),
        (from_dim, to_dim) => to_dim == from_dim + 1 && simple_types_match(&from.base, &to.base),
    }
}

/// A single array argument passed whole to a varargs parameter.
pub fn is_varargs_spread(argument: &Type, varargs: &Type) -> bool {
    !argument.is_varargs
        && argument.array_dimension == varargs.array_dimension + 1
        && simple_types_match(&argument.base, &varargs.base)
}

pub fn simple_type_fit(from: &BaseType, to: &BaseType) -> bool {
    simple_types_match(from, to) || primitive_type_fit(from, to)
}

pub fn simple_types_match(from: &BaseType, to: &BaseType) -> bool {
    *to == BaseType::Any || from == to
}

fn primitive_type_fit(from: &BaseType, to: &BaseType) -> bool {
    match (from, to) {
        (BaseType::Char, BaseType::Char) | (BaseType::Bool, BaseType::Bool) => true,
        (BaseType::Char, to) => to.numeric_rank() >= BaseType::I32.numeric_rank(),
        (from, to) => match (from.numeric_rank(), to.numeric_rank()) {
            (Some(from_rank), Some(to_rank)) => to_rank >= from_rank,
            _ => false,
        },
    }
}

/// Does `arguments` satisfy `params`, allowing widening and a trailing
/// varargs parameter?
pub fn arguments_fit(arguments: &[Type], params: &[Type]) -> bool {
    let Some(last) = params.last().filter(|p| p.is_varargs) else {
        return arguments.len() == params.len()
            && arguments.iter().zip(params).all(|(a, p)| does_type_fit(a, p));
    };

    let fixed = params.len() - 1;
    if arguments.len() < fixed {
        return false;
    }
    let fixed_fit = arguments[..fixed]
        .iter()
        .zip(&params[..fixed])
        .all(|(a, p)| does_type_fit(a, p));
    if !fixed_fit {
        return false;
    }

    let rest = &arguments[fixed..];
    if let [single] = rest {
        if is_varargs_spread(single, last) {
            return true;
        }
    }
    rest.iter().all(|a| does_type_fit(a, last))
}

/// Operand promotion: `Char` and integers below `I32` become `I32`.
fn promote_operand(base: &BaseType) -> BaseType {
    match base {
        BaseType::Char | BaseType::I8 | BaseType::I16 => BaseType::I32,
        other => other.clone(),
    }
}

/// Result type of an arithmetic or bitwise operator on two number-or-char
/// scalars.
pub fn promote(lhs: &Type, rhs: &Type) -> Type {
    let lhs = promote_operand(&lhs.base);
    let rhs = promote_operand(&rhs.base);
    if lhs.numeric_rank() > rhs.numeric_rank() {
        Type::new(lhs)
    } else {
        Type::new(rhs)
    }
}

/// Inclusive value range of an integer category.
pub fn integer_bounds(base: &BaseType) -> Option<(i64, i64)> {
    match base {
        BaseType::I8 => Some((i8::MIN.into(), i8::MAX.into())),
        BaseType::I16 => Some((i16::MIN.into(), i16::MAX.into())),
        BaseType::I32 => Some((i32::MIN.into(), i32::MAX.into())),
        BaseType::I64 => Some((i64::MIN, i64::MAX)),
        BaseType::Char => Some((u16::MIN.into(), u16::MAX.into())),
        _ => None,
    }
}
