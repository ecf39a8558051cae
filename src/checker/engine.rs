//! Type checker driver
//!
//! [`TypeChecker::check`] runs four passes over a parsed [`Program`]:
//!
//! 1. register struct names
//! 2. register function overloads and detect the `main` entry point
//! 3. validate struct bodies and library bindings
//! 4. check every function: return type, parameters, then the body
//!
//! The first error aborts checking. On success every expression in the
//! program carries its resolved type.

use crate::checker::scope::ScopeStack;
use crate::config::Settings;
use crate::diagnostics::{CompileError, ErrorKind, Reporter, SourceFile};
use crate::parser::ast::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Parameter types and return type of one overload.
#[derive(Debug, Clone)]
pub(crate) struct Signature {
    pub params: Vec<Type>,
    pub return_type: Type,
}

pub struct TypeChecker<'a> {
    pub(crate) reporter: Reporter<'a>,
    pub(crate) structs: FxHashMap<String, StructDef>,
    /// Overload sets in declaration order.
    pub(crate) functions: FxHashMap<String, Vec<Signature>>,
    pub(crate) scopes: ScopeStack,
    pub(crate) dependencies: BTreeSet<String>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(source: &'a SourceFile, settings: &Settings) -> Self {
        TypeChecker {
            reporter: Reporter::new(source, settings),
            structs: FxHashMap::default(),
            functions: FxHashMap::default(),
            scopes: ScopeStack::default(),
            dependencies: BTreeSet::new(),
        }
    }

    /// Check `program`, annotating it in place.
    pub fn check(&mut self, program: &mut Program) -> Result<(), CompileError> {
        self.register_structs(&program.structs)?;
        program.has_program_entry = self.register_functions(&program.functions)?;
        self.validate_structs(&program.structs)?;

        debug!(
            structs = self.structs.len(),
            overload_sets = self.functions.len(),
            entry = program.has_program_entry,
            "registered declarations"
        );

        for function in &mut program.functions {
            self.check_function(function)?;
        }

        program
            .library_dependencies
            .extend(std::mem::take(&mut self.dependencies));
        debug!(dependencies = ?program.library_dependencies, "type check finished");
        Ok(())
    }

    pub(crate) fn error(&self, location: SourceLocation, message: impl Into<String>) -> CompileError {
        self.reporter.report(ErrorKind::Semantic, location, message)
    }

    pub(crate) fn struct_exists(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    fn register_structs(&mut self, structs: &[StructDef]) -> Result<(), CompileError> {
        for struct_def in structs {
            if self.struct_exists(&struct_def.name) {
                return Err(self.error(
                    struct_def.location,
                    format!("redeclaration of struct \"{}\".", struct_def.name),
                ));
            }
            self.structs.insert(struct_def.name.clone(), struct_def.clone());
        }
        Ok(())
    }

    /// Returns whether a zero-parameter `main` was found.
    fn register_functions(&mut self, functions: &[Function]) -> Result<bool, CompileError> {
        let mut has_entry = false;

        for function in functions {
            let params = function.param_types();
            let collision = self
                .functions
                .get(&function.name)
                .is_some_and(|overloads| overloads.iter().any(|s| s.params == params));
            if collision {
                return Err(self.error(
                    function.location,
                    format!("redeclaration of function \"{}\".", function.name),
                ));
            }

            self.functions
                .entry(function.name.clone())
                .or_default()
                .push(Signature {
                    params,
                    return_type: function.return_type.clone(),
                });

            if function.name == "main" && function.params.is_empty() {
                has_entry = true;
            }
        }
        Ok(has_entry)
    }

    fn validate_structs(&mut self, structs: &[StructDef]) -> Result<(), CompileError> {
        for struct_def in structs {
            if let Some(library) = &struct_def.library {
                self.bind_library(library, struct_def.location)?;
                continue;
            }

            let mut seen = FxHashSet::default();
            for field in &struct_def.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(self.error(
                        field.location,
                        format!(
                            "redeclaration of struct member \"{}\" in struct \"{}\".",
                            field.name, struct_def.name
                        ),
                    ));
                }
                if field.field_type.is_varargs {
                    return Err(self.error(
                        field.location,
                        format!(
                            "struct member \"{}\" in struct \"{}\" can't be varargs.",
                            field.name, struct_def.name
                        ),
                    ));
                }
                if let Some(name) = field.field_type.struct_name() {
                    if !self.struct_exists(name) {
                        return Err(self.error(
                            field.location,
                            format!(
                                "undefined struct type \"{}\" for struct member \"{}\" in struct \"{}\".",
                                name, field.name, struct_def.name
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Record a `#lib` binding as a dependency of the program.
    fn bind_library(&mut self, library: &str, location: SourceLocation) -> Result<(), CompileError> {
        if !is_library_name_valid(library) {
            return Err(self.error(location, format!("invalid library name \"{}\".", library)));
        }
        self.dependencies.insert(library.to_string());
        Ok(())
    }

    fn check_function(&mut self, function: &mut Function) -> Result<(), CompileError> {
        trace!(name = %function.name, "checking function");

        if let Some(name) = function.return_type.struct_name() {
            if !self.struct_exists(name) {
                return Err(self.error(
                    function.location,
                    format!(
                        "undefined struct type \"{}\" for function \"{}\"'s return-type.",
                        name, function.name
                    ),
                ));
            }
        }

        self.scopes.enter_function(function.return_type.clone());
        for param in &function.params {
            self.declare_param(param)?;
        }

        if let Some(library) = &function.library {
            self.bind_library(library, function.location)?;
        } else {
            let returns = self.check_block(&mut function.body)?;
            if !function.return_type.is_void() && !returns {
                return Err(self.error(
                    function.location,
                    "function does not have exhaustive \"return\" statements.",
                ));
            }
        }

        self.scopes.exit_function();
        Ok(())
    }

    fn declare_param(&mut self, param: &Param) -> Result<(), CompileError> {
        if self.scopes.has_varargs() {
            return Err(self.error(
                param.location,
                "no parameter can follow after a varargs parameter.",
            ));
        }
        if param.param_type.is_void() {
            return Err(self.error(
                param.location,
                format!("parameter \"{}\" can't be of type \"void\".", param.name),
            ));
        }
        if let Some(name) = param.param_type.struct_name() {
            if !self.struct_exists(name) {
                return Err(self.error(
                    param.location,
                    format!(
                        "undefined struct type \"{}\" for parameter \"{}\".",
                        name, param.name
                    ),
                ));
            }
        }
        if let Some(existing) = self.scopes.param(&param.name) {
            return Err(self.error(
                param.location,
                format!(
                    "redeclaration of parameter {}: {}.",
                    param.name,
                    existing.base.category_name()
                ),
            ));
        }

        self.scopes.declare_param(&param.name, param.param_type.clone());
        Ok(())
    }
}

/// Letters, digits and `_`, not starting with a digit.
fn is_library_name_valid(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
