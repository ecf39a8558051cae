//! Built-in library headers
//!
//! Every program starts with these external function headers so user code can
//! call them without declaring them. Their implementations live in the
//! `Preload` runtime library, which itself depends on `RuntimeSupport`.

use crate::parser::ast::*;

pub const PRELOAD_LIBRARY: &str = "Preload";
pub const RUNTIME_SUPPORT_LIBRARY: &str = "RuntimeSupport";

fn param(name: &str, param_type: Type) -> Param {
    Param {
        name: name.to_string(),
        param_type,
        location: SourceLocation::default(),
    }
}

fn header(name: &str, params: Vec<Param>, return_type: Type) -> Function {
    Function {
        name: name.to_string(),
        params,
        return_type,
        body: Vec::new(),
        library: Some(PRELOAD_LIBRARY.to_string()),
        location: SourceLocation::default(),
    }
}

/// The preloaded headers, in declaration order.
pub fn builtin_functions() -> Vec<Function> {
    let string = || Type::new(BaseType::String);
    let any_varargs = || Type::new(BaseType::Any).with_varargs();

    vec![
        header(
            "print",
            vec![param("format", string()), param("args", any_varargs())],
            Type::void(),
        ),
        header(
            "ensure",
            vec![
                param("condition", Type::new(BaseType::Bool)),
                param("errorFormat", string()),
                param("errorArgs", any_varargs()),
            ],
            Type::void(),
        ),
        header("exit", vec![param("code", Type::new(BaseType::I32))], Type::void()),
        header(
            "length",
            vec![param("s", string())],
            Type::new(BaseType::I32),
        ),
        header(
            "char_at",
            vec![param("s", string()), param("index", Type::new(BaseType::I32))],
            Type::new(BaseType::Char),
        ),
    ]
}

/// Seed a fresh program with the built-in headers and their libraries.
pub fn preload(program: &mut Program) {
    let headers = builtin_functions();
    program.preloaded_functions += headers.len();
    program.functions.extend(headers);
    program
        .library_dependencies
        .insert(RUNTIME_SUPPORT_LIBRARY.to_string());
    program
        .library_dependencies
        .insert(PRELOAD_LIBRARY.to_string());
}
