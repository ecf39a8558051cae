//! Statement checking
//!
//! Besides typing every statement this module owns three rewrites of the
//! tree: default initializers for declarations without one, implicit
//! narrowing casts around constant `i32` expressions, and the return
//! exhaustiveness flag of each block.
//!
//! A block returns on every path when its last statement does. That is a
//! `return`, or an `if` with an `else` where both branches return. A `while`
//! never counts since its body may run zero times.

use crate::checker::constants::{self, DivisionByZero};
use crate::checker::engine::TypeChecker;
use crate::checker::type_system::{does_type_fit, integer_bounds};
use crate::diagnostics::CompileError;
use crate::parser::ast::*;
use std::mem;

impl<'a> TypeChecker<'a> {
    /// Check `statements` in a fresh block scope. Returns whether the block
    /// returns on every path.
    pub(crate) fn check_block(&mut self, statements: &mut [Statement]) -> Result<bool, CompileError> {
        self.scopes.push_block();

        let count = statements.len();
        for (index, statement) in statements.iter_mut().enumerate() {
            let returns = self.check_statement(statement, index + 1 == count)?;
            self.scopes.current_block_mut().has_return = returns;
        }

        Ok(self.scopes.pop_block().has_return)
    }

    /// Check one statement; returns whether it returns on every path.
    fn check_statement(&mut self, statement: &mut Statement, is_last: bool) -> Result<bool, CompileError> {
        match statement {
            Statement::Declaration(declaration) => {
                self.check_declaration(declaration)?;
                Ok(false)
            }

            Statement::Definition { lhs, rhs, .. } => {
                let lhs_type = self.infer_variable(lhs)?;
                let leaf = lhs.leaf();
                if leaf.read_only {
                    return Err(self.error(leaf.location, "lhs is read-only."));
                }
                self.infer_assignment(&lhs_type, rhs)?;
                Ok(false)
            }

            Statement::Return {
                expression,
                location,
            } => {
                if !is_last {
                    return Err(self.error(*location, "return should be last statement in scope."));
                }
                self.check_return(expression, *location)?;
                Ok(true)
            }

            Statement::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                self.check_condition(condition)?;
                let then_returns = self.check_block(then_body)?;
                let else_returns = match else_body {
                    Some(body) => self.check_block(body)?,
                    None => false,
                };
                Ok(then_returns && else_returns)
            }

            Statement::While {
                condition, body, ..
            } => {
                self.check_condition(condition)?;
                self.check_block(body)?;
                Ok(false)
            }

            Statement::Call(call) => {
                self.resolve_call(call)?;
                Ok(false)
            }
        }
    }

    fn check_condition(&mut self, condition: &mut Expression) -> Result<(), CompileError> {
        let condition_type = self.infer_expression_type(condition)?;
        if !condition_type.is_scalar_bool() {
            return Err(self.error(
                condition.location(),
                format!(
                    "condition expression must yield a boolean, but it yields {}.",
                    condition_type
                ),
            ));
        }
        Ok(())
    }

    fn check_return(
        &mut self,
        expression: &mut Option<Expression>,
        location: SourceLocation,
    ) -> Result<(), CompileError> {
        let return_type = self.scopes.return_type().clone();

        match expression {
            None if !return_type.is_void() => Err(self.error(
                location,
                format!(
                    "got void return statement, expected return type of {}.",
                    return_type
                ),
            )),
            None => Ok(()),
            Some(value) if return_type.is_void() => Err(self.error(
                value.location(),
                "function has no return type, but a value is returned.",
            )),
            Some(value) => self.infer_narrowing(&return_type, value),
        }
    }

    /// Check the initializer before the name becomes visible, then declare it.
    fn check_declaration(&mut self, declaration: &mut Declaration) -> Result<(), CompileError> {
        self.validate_local(declaration)?;

        let init = declaration
            .init
            .get_or_insert_with(|| default_initializer(&declaration.var_type, declaration.location));
        self.infer_assignment(&declaration.var_type, init)?;

        self.scopes
            .declare_variable(&declaration.name, declaration.var_type.clone());
        Ok(())
    }

    fn validate_local(&self, declaration: &Declaration) -> Result<(), CompileError> {
        let var_type = &declaration.var_type;
        let name = &declaration.name;

        if var_type.is_void() {
            return Err(self.error(
                declaration.location,
                format!("variable \"{}\" can't be of type \"void\".", name),
            ));
        }
        if var_type.is_varargs {
            return Err(self.error(
                declaration.location,
                format!("variable \"{}\" can't be varargs.", name),
            ));
        }
        if let Some(struct_name) = var_type.struct_name() {
            if !self.struct_exists(struct_name) {
                return Err(self.error(
                    declaration.location,
                    format!(
                        "undefined struct type \"{}\" for variable \"{}\".",
                        struct_name, name
                    ),
                ));
            }
        }

        let collision = self.scopes.param(name).or_else(|| self.scopes.variable(name));
        if let Some(existing) = collision {
            return Err(self.error(
                declaration.location,
                format!(
                    "redeclaration of {}: {}.",
                    name,
                    existing.base.category_name()
                ),
            ));
        }
        Ok(())
    }

    /// Check `rhs` against a target of type `lhs`.
    pub(crate) fn infer_assignment(&mut self, lhs: &Type, rhs: &mut Assignment) -> Result<(), CompileError> {
        match rhs {
            Assignment::New {
                array_sizes,
                location,
            } => {
                if lhs.array_dimension > 0 {
                    if array_sizes.len() != lhs.array_dimension {
                        let at = array_sizes.last().map_or(*location, Expression::location);
                        return Err(self.error(
                            at,
                            format!(
                                "type mismatch between array sizes lhs dim={} and rhs dim={}.",
                                lhs.array_dimension,
                                array_sizes.len()
                            ),
                        ));
                    }
                    for size in array_sizes.iter_mut() {
                        let size_type = self.infer_expression_type(size)?;
                        if !size_type.is_scalar_integer() {
                            return Err(self.error(
                                size.location(),
                                format!(
                                    "expected array initialization value to be an integer, but is {}.",
                                    size_type
                                ),
                            ));
                        }
                    }
                    Ok(())
                } else if lhs.struct_name().is_some() {
                    if let Some(first) = array_sizes.first() {
                        return Err(self.error(
                            first.location(),
                            "struct allocation doesn't take array sizes.",
                        ));
                    }
                    Ok(())
                } else {
                    Err(self.error(
                        *location,
                        "variable has a primitive type. \"new\" is only possible with structs and arrays.",
                    ))
                }
            }

            Assignment::Expression(expression) => {
                if lhs.array_dimension > 0 || lhs.struct_name().is_some() {
                    let rhs_type = self.infer_value_type(expression)?;
                    if !does_type_fit(&rhs_type, lhs) {
                        return Err(self.error(
                            expression.location(),
                            format!(
                                "type mismatch between lhs \"{}\" and rhs \"{}\".",
                                lhs, rhs_type
                            ),
                        ));
                    }
                    return Ok(());
                }
                self.infer_narrowing(lhs, expression)
            }
        }
    }

    /// Check `expression` against a scalar target, wrapping it in an
    /// implicit cast when it is an in-range `i32` constant for a narrower
    /// integer target.
    pub(crate) fn infer_narrowing(&mut self, target: &Type, expression: &mut Expression) -> Result<(), CompileError> {
        let rhs_type = self.infer_value_type(expression)?;
        if does_type_fit(&rhs_type, target) {
            return Ok(());
        }

        let location = expression.location();
        let mismatch = |checker: &Self| {
            checker.error(
                location,
                format!(
                    "type mismatch. expected type \"{}\", got type: \"{}\".",
                    target, rhs_type
                ),
            )
        };

        let narrowable = rhs_type == Type::new(BaseType::I32) && target.is_scalar();
        let Some((min, max)) = integer_bounds(&target.base).filter(|_| narrowable) else {
            return Err(mismatch(self));
        };

        let value = match constants::fold(expression) {
            Ok(Some(ConstValue::Int(value))) => value,
            Ok(_) => return Err(mismatch(self)),
            Err(DivisionByZero { location }) => {
                return Err(self.error(location, "division by zero in constant expression."))
            }
        };

        if value < min || value > max {
            return Err(self.error(
                location,
                format!(
                    "Expression {} is out of bounds [{}, {}] for type {}.",
                    value,
                    min,
                    max,
                    target.base.category_name()
                ),
            ));
        }

        let inner = mem::replace(expression, placeholder(location));
        *expression = Expression::TypeCast {
            target: target.clone(),
            inner: Box::new(inner),
            is_implicit: true,
            constant: Some(ConstValue::Int(value)),
            resolved_type: Some(target.clone()),
            location,
        };
        Ok(())
    }
}

/// Temporary stand-in while an expression is moved into a cast.
fn placeholder(location: SourceLocation) -> Expression {
    Expression::Literal(Literal::new("nil", LiteralKind::Nil, location))
}

/// Literal a declaration without an initializer starts with.
fn default_initializer(var_type: &Type, location: SourceLocation) -> Assignment {
    let (raw, kind) = if var_type.array_dimension > 0 {
        ("nil", LiteralKind::Nil)
    } else {
        match var_type.base {
            BaseType::I8 | BaseType::I16 | BaseType::I32 | BaseType::Char => ("0", LiteralKind::I32),
            BaseType::I64 => ("0", LiteralKind::I64),
            BaseType::F32 => ("0", LiteralKind::F32),
            BaseType::F64 => ("0", LiteralKind::F64),
            BaseType::Bool => ("false", LiteralKind::Bool),
            BaseType::String | BaseType::Struct(_) | BaseType::Any | BaseType::Object => {
                ("nil", LiteralKind::Nil)
            }
            BaseType::Void => unreachable!("void declarations are rejected before defaults"),
        }
    };
    Assignment::Expression(Expression::Literal(Literal::new(raw, kind, location)))
}
