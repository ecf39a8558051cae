//! Overload resolution
//!
//! An overload whose parameter types equal the argument types wins outright.
//! Otherwise exactly one overload may accept the arguments through widening,
//! `any`, `nil` or a varargs tail; none is a mismatch and several is an
//! ambiguous call.

use crate::checker::engine::{Signature, TypeChecker};
use crate::checker::type_system::arguments_fit;
use crate::diagnostics::CompileError;
use crate::parser::ast::{FunctionCall, Type};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OverloadError {
    NoMatch,
    Ambiguous,
}

/// Pick the overload for `arguments`.
pub(crate) fn select_overload<'s>(
    overloads: &'s [Signature],
    arguments: &[Type],
) -> Result<&'s Signature, OverloadError> {
    if let Some(exact) = overloads.iter().find(|s| s.params == arguments) {
        return Ok(exact);
    }

    let mut loose = overloads.iter().filter(|s| arguments_fit(arguments, &s.params));
    match (loose.next(), loose.next()) {
        (Some(signature), None) => Ok(signature),
        (None, _) => Err(OverloadError::NoMatch),
        (Some(_), Some(_)) => Err(OverloadError::Ambiguous),
    }
}

impl<'a> TypeChecker<'a> {
    /// Type the arguments of `call`, select its overload and record the
    /// return type.
    pub(crate) fn resolve_call(&mut self, call: &mut FunctionCall) -> Result<Type, CompileError> {
        if !self.functions.contains_key(&call.name) {
            return Err(self.error(
                call.location,
                format!("trying to call an undeclared function: \"{}\".", call.name),
            ));
        }

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &mut call.arguments {
            arguments.push(self.infer_value_type(argument)?);
        }

        let overloads = self
            .functions
            .get(&call.name)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let return_type = match select_overload(overloads, &arguments) {
            Ok(signature) => signature.return_type.clone(),
            Err(OverloadError::NoMatch) => {
                return Err(self.error(
                    call.location,
                    format!(
                        "function \"{}\" parameter types do not match argument types.",
                        call.name
                    ),
                ))
            }
            Err(OverloadError::Ambiguous) => {
                return Err(self.error(
                    call.location,
                    "multiple functions are matching argument signature.",
                ))
            }
        };

        trace!(name = %call.name, return_type = %return_type, "resolved call");
        call.resolved_type = Some(return_type.clone());
        Ok(return_type)
    }
}
