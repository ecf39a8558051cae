//! Lexical scopes for the type checker
//!
//! A function scope holds the parameters. Above it sits a stack of block
//! scopes, one per `{ ... }`, innermost last. Names resolve through the
//! blocks from the innermost outwards and then through the parameters.

use crate::parser::ast::Type;
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub(crate) struct FunctionScope {
    pub return_type: Type,
    pub params: FxHashMap<String, Type>,
    pub has_varargs: bool,
}

#[derive(Debug, Default)]
pub(crate) struct BlockScope {
    pub variables: FxHashMap<String, Type>,
    /// Every path through this block ends in a `return`.
    pub has_return: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    function: Option<FunctionScope>,
    blocks: Vec<BlockScope>,
}

impl ScopeStack {
    pub fn enter_function(&mut self, return_type: Type) {
        self.function = Some(FunctionScope {
            return_type,
            params: FxHashMap::default(),
            has_varargs: false,
        });
        self.blocks.clear();
    }

    pub fn exit_function(&mut self) {
        self.function = None;
        self.blocks.clear();
    }

    fn function(&self) -> &FunctionScope {
        self.function
            .as_ref()
            .unwrap_or_else(|| unreachable!("no function scope is active"))
    }

    fn function_mut(&mut self) -> &mut FunctionScope {
        self.function
            .as_mut()
            .unwrap_or_else(|| unreachable!("no function scope is active"))
    }

    pub fn return_type(&self) -> &Type {
        &self.function().return_type
    }

    pub fn has_varargs(&self) -> bool {
        self.function().has_varargs
    }

    pub fn param(&self, name: &str) -> Option<&Type> {
        self.function().params.get(name)
    }

    pub fn declare_param(&mut self, name: &str, param_type: Type) {
        let function = self.function_mut();
        function.has_varargs |= param_type.is_varargs;
        function.params.insert(name.to_string(), param_type);
    }

    pub fn push_block(&mut self) {
        self.blocks.push(BlockScope::default());
    }

    pub fn pop_block(&mut self) -> BlockScope {
        self.blocks
            .pop()
            .unwrap_or_else(|| unreachable!("block scope stack underflow"))
    }

    pub fn current_block_mut(&mut self) -> &mut BlockScope {
        self.blocks
            .last_mut()
            .unwrap_or_else(|| unreachable!("no block scope is active"))
    }

    /// A variable visible in any active block.
    pub fn variable(&self, name: &str) -> Option<&Type> {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| block.variables.get(name))
    }

    pub fn declare_variable(&mut self, name: &str, var_type: Type) {
        self.current_block_mut()
            .variables
            .insert(name.to_string(), var_type);
    }

    /// Resolve a name: blocks first, innermost outwards, then parameters.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.variable(name).or_else(|| self.param(name))
    }
}
