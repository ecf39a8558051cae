//! Expression type inference
//!
//! Every expression node gets its `resolved_type` filled in here. The rules:
//!
//! - literals take the type of their kind; their value is parsed and range
//!   checked
//! - arithmetic and bitwise operators promote both operands to at least
//!   `I32` and yield the wider one; comparisons yield `Bool`
//! - `&& || == != ^` on two booleans yield `Bool`
//! - `==` and `!=` accept struct, string, array and `nil` operands when one
//!   side fits the other
//! - a cast needs its source and target to fit one way or the other
//! - variable chains resolve one segment at a time, unpacking one array
//!   rank per index

use crate::checker::engine::TypeChecker;
use crate::checker::literals;
use crate::checker::type_system::{are_types_compatible, promote};
use crate::diagnostics::CompileError;
use crate::parser::ast::*;

/// Built-in read-only field of arrays and varargs values.
const LENGTH_FIELD: &str = "length";

impl<'a> TypeChecker<'a> {
    /// Infer and record the type of `expression`.
    pub(crate) fn infer_expression_type(
        &mut self,
        expression: &mut Expression,
    ) -> Result<Type, CompileError> {
        let location = expression.location();

        match expression {
            Expression::Literal(literal) => self.infer_literal(literal),

            Expression::BinaryOp {
                op,
                lhs,
                rhs,
                resolved_type,
            } => {
                let lhs_type = self.infer_expression_type(lhs)?;
                let rhs_type = self.infer_expression_type(rhs)?;
                let result = self.binary_result(*op, &lhs_type, &rhs_type, location)?;
                *resolved_type = Some(result.clone());
                Ok(result)
            }

            Expression::UnaryOp {
                op,
                operand,
                resolved_type,
                ..
            } => {
                let operand_type = self.infer_expression_type(operand)?;
                let result = self.unary_result(*op, &operand_type, location)?;
                *resolved_type = Some(result.clone());
                Ok(result)
            }

            Expression::Parenthesis {
                inner,
                resolved_type,
                ..
            } => {
                let result = self.infer_expression_type(inner)?;
                *resolved_type = Some(result.clone());
                Ok(result)
            }

            Expression::Variable(variable) => self.infer_variable(variable),

            Expression::FunctionCall(call) => self.resolve_call(call),

            Expression::TypeCast {
                target,
                inner,
                resolved_type,
                ..
            } => {
                if let Some(name) = target.struct_name() {
                    if !self.struct_exists(name) {
                        return Err(self.error(
                            location,
                            format!("undefined struct type \"{}\" in type cast.", name),
                        ));
                    }
                }

                let inner_type = self.infer_value_type(inner)?;
                if !are_types_compatible(&inner_type, target) {
                    return Err(self.error(
                        inner.location(),
                        format!("failed to cast {} to {}.", inner_type, target),
                    ));
                }
                *resolved_type = Some(target.clone());
                Ok(target.clone())
            }
        }
    }

    /// Infer the type of an expression whose value is used. A call to a
    /// void function has no value.
    pub(crate) fn infer_value_type(
        &mut self,
        expression: &mut Expression,
    ) -> Result<Type, CompileError> {
        let value_type = self.infer_expression_type(expression)?;
        if value_type.is_void() {
            return Err(self.error(
                expression.location(),
                "expression of type \"void\" can't be used as a value.",
            ));
        }
        Ok(value_type)
    }

    /// Parse the literal's value and check it against its type's range.
    fn infer_literal(&self, literal: &mut Literal) -> Result<Type, CompileError> {
        let value = match literal.kind {
            LiteralKind::Char => {
                let code = literals::parse_char(&literal.raw).ok_or_else(|| {
                    self.error(
                        literal.location,
                        format!("invalid character \"{}\".", literal.raw),
                    )
                })?;
                Some(ConstValue::Int(code))
            }
            LiteralKind::I32 => {
                let value = literals::parse_integer(&literal.raw, literal.kind).ok_or_else(|| {
                    self.error(
                        literal.location,
                        format!(
                            "i32 literal {} is outside range [{}, {}].",
                            literal.raw,
                            i32::MIN,
                            i32::MAX
                        ),
                    )
                })?;
                Some(ConstValue::Int(value))
            }
            LiteralKind::I64 => {
                let value = literals::parse_integer(&literal.raw, literal.kind).ok_or_else(|| {
                    self.error(
                        literal.location,
                        format!(
                            "i64 literal {} is outside range [{}, {}].",
                            literal.raw,
                            i64::MIN,
                            i64::MAX
                        ),
                    )
                })?;
                Some(ConstValue::Int(value))
            }
            LiteralKind::F32 => {
                let value = literals::parse_float(&literal.raw, literal.kind).ok_or_else(|| {
                    self.error(
                        literal.location,
                        format!(
                            "f32 literal {} is outside range [{:e}, {:e}].",
                            literal.raw,
                            f32::MIN,
                            f32::MAX
                        ),
                    )
                })?;
                Some(ConstValue::Float(value))
            }
            LiteralKind::F64 => {
                let value = literals::parse_float(&literal.raw, literal.kind).ok_or_else(|| {
                    self.error(
                        literal.location,
                        format!(
                            "f64 literal {} is outside range [{:e}, {:e}].",
                            literal.raw,
                            f64::MIN,
                            f64::MAX
                        ),
                    )
                })?;
                Some(ConstValue::Float(value))
            }
            LiteralKind::Bool | LiteralKind::String | LiteralKind::Nil => None,
        };

        let literal_type = Type::new(literal.kind.base_type());
        literal.value = value;
        literal.resolved_type = Some(literal_type.clone());
        Ok(literal_type)
    }

    fn binary_result(
        &self,
        op: BinOp,
        lhs: &Type,
        rhs: &Type,
        location: SourceLocation,
    ) -> Result<Type, CompileError> {
        let invalid_operator = || {
            self.error(
                location,
                format!(
                    "invalid binary operator \"{}\" for the types: {} {}.",
                    op.symbol(),
                    lhs,
                    rhs
                ),
            )
        };

        if lhs.is_scalar_number_or_char() && rhs.is_scalar_number_or_char() {
            if op.is_comparison() {
                return Ok(Type::new(BaseType::Bool));
            }
            if op.is_arithmetic() {
                return Ok(promote(lhs, rhs));
            }
            if op.is_bitwise() && lhs.base.is_integer() && rhs.base.is_integer() {
                return Ok(promote(lhs, rhs));
            }
            return Err(invalid_operator());
        }

        if lhs.is_scalar_bool() && rhs.is_scalar_bool() {
            if matches!(
                op,
                BinOp::And | BinOp::Or | BinOp::Eq | BinOp::Ne | BinOp::BitXor
            ) {
                return Ok(Type::new(BaseType::Bool));
            }
            return Err(invalid_operator());
        }

        let is_reference = |t: &Type| {
            !t.is_scalar()
                || matches!(
                    t.base,
                    BaseType::Struct(_) | BaseType::String | BaseType::Object
                )
        };
        if matches!(op, BinOp::Eq | BinOp::Ne)
            && (is_reference(lhs) || is_reference(rhs))
            && are_types_compatible(lhs, rhs)
        {
            return Ok(Type::new(BaseType::Bool));
        }

        Err(self.error(
            location,
            format!(
                "invalid types. failed to apply binary operator: {} {} {}.",
                lhs,
                op.symbol(),
                rhs
            ),
        ))
    }

    fn unary_result(
        &self,
        op: UnOp,
        operand: &Type,
        location: SourceLocation,
    ) -> Result<Type, CompileError> {
        let allowed = match op {
            UnOp::Neg | UnOp::Plus => operand.is_scalar_number_or_char(),
            UnOp::BitNot => operand.is_scalar_integer(),
            UnOp::Not => operand.is_scalar_bool(),
        };

        if allowed {
            return Ok(match op {
                UnOp::Not => operand.clone(),
                _ => promote(operand, operand),
            });
        }

        if operand.is_scalar_number_or_char() || operand.is_scalar_bool() {
            return Err(self.error(
                location,
                format!(
                    "invalid unary operator \"{}\" on type: {}.",
                    op.symbol(),
                    operand
                ),
            ));
        }
        Err(self.error(
            location,
            format!(
                "invalid type. failed to apply unary \"{}\" operator on type: {}.",
                op.symbol(),
                operand
            ),
        ))
    }

    /// Resolve a variable chain and return the type of its last segment.
    pub(crate) fn infer_variable(&mut self, variable: &mut Variable) -> Result<Type, CompileError> {
        let declared = self.scopes.lookup(&variable.name).cloned().ok_or_else(|| {
            self.error(
                variable.location,
                format!("undeclared variable \"{}\".", variable.name),
            )
        })?;
        self.resolve_segment(variable, &declared)
    }

    /// Type `segment` from its declared type and continue down the chain.
    fn resolve_segment(
        &mut self,
        segment: &mut Variable,
        declared: &Type,
    ) -> Result<Type, CompileError> {
        let segment_type = self.unpack_indices(segment, declared)?;
        segment.resolved_type = Some(segment_type.clone());

        match segment.child.as_deref_mut() {
            Some(child) => self.resolve_field(child, &segment_type),
            None => Ok(segment_type),
        }
    }

    fn resolve_field(&mut self, field: &mut Variable, parent: &Type) -> Result<Type, CompileError> {
        if !parent.is_scalar() {
            if field.name != LENGTH_FIELD {
                return Err(self.error(
                    field.location,
                    format!("arrays don't contain field \"{}\".", field.name),
                ));
            }
            if field.child.is_some() {
                return Err(self.error(
                    field.location,
                    format!(
                        "built in array field \"{}\" doesn't have any subfields.",
                        field.name
                    ),
                ));
            }

            field.read_only = true;
            let length_type = self.unpack_indices(field, &Type::new(BaseType::I32))?;
            field.resolved_type = Some(length_type.clone());
            return Ok(length_type);
        }

        if let Some(struct_name) = parent.struct_name() {
            let field_type = self
                .structs
                .get(struct_name)
                .and_then(|s| s.field(&field.name))
                .map(|f| f.field_type.clone());

            return match field_type {
                Some(field_type) => self.resolve_segment(field, &field_type),
                None => Err(self.error(
                    field.location,
                    format!(
                        "struct {} doesn't contain field \"{}\".",
                        struct_name, field.name
                    ),
                )),
            };
        }

        Err(self.error(
            field.location,
            format!("type {} doesn't have any subfields.", parent),
        ))
    }

    /// Remove one array rank per index expression. A varargs value unpacks
    /// like an array one rank higher.
    fn unpack_indices(&mut self, segment: &mut Variable, declared: &Type) -> Result<Type, CompileError> {
        if segment.indices.is_empty() {
            return Ok(declared.clone());
        }

        let mut unpacked = declared.clone();
        if unpacked.is_varargs {
            unpacked.is_varargs = false;
            unpacked.array_dimension += 1;
        }

        let count = segment.indices.len();
        if count > unpacked.array_dimension {
            return Err(self.error(
                segment.location,
                format!(
                    "too many array unpacking. Max: {}, Got: {}.",
                    unpacked.array_dimension, count
                ),
            ));
        }
        unpacked.array_dimension -= count;

        for index in &mut segment.indices {
            let index_type = self.infer_expression_type(index)?;
            if !index_type.is_scalar_integer() {
                return Err(self.error(
                    index.location(),
                    format!(
                        "expected an integer when indexing \"{}\", but got {}.",
                        segment.name, index_type
                    ),
                ));
            }
        }

        Ok(unpacked)
    }
}
