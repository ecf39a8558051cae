//! Declaration parsing implementation
//!
//! This module handles the file-scope declarations of ABC programs:
//!
//! - Function declarations: `name :: (params) -> type { ... }`
//! - Struct declarations: `Name :: struct { field: type; ... }`
//! - Library bindings in place of a body: `#lib "Name";`
//! - Type syntax: varargs marker, array brackets, base type
//!
//! # Grammar
//!
//! ```text
//! function    ::= identifier "::" "(" params? ")" ("->" type)? body
//! params      ::= param ("," param)*
//! param       ::= identifier ":" type
//! struct_def  ::= identifier "::" "struct" (fields | library)
//! fields      ::= "{" (identifier ":" type ";")* "}"
//! body        ::= "{" statement* "}" | library
//! library     ::= "#lib" string ";"
//! type        ::= ".."? ("[" "]")* base_type
//! base_type   ::= "i8" | "i16" | "i32" | "i64" | "f32" | "f64"
//!               | "string" | "bool" | "char" | "any" | identifier
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_function(&mut self) -> Result<Function, CompileError> {
        let name = self.expect_identifier("as function name")?;
        self.expect_symbol("::", "after function name")?;
        self.expect_symbol("(", "to open the parameter list")?;

        let mut params = Vec::new();
        if !self.check_symbol(")") {
            loop {
                params.push(self.parse_param()?);
                if !self.match_symbol(",") {
                    break;
                }
            }
        }
        self.expect_symbol(")", "to close the parameter list")?;

        let return_type = if self.match_symbol("->") {
            self.parse_type()?
        } else {
            Type::void()
        };

        if self.check_keyword("#lib") {
            let library = self.parse_library_binding()?;
            return Ok(Function {
                name: name.text,
                params,
                return_type,
                body: Vec::new(),
                library: Some(library),
                location: name.location.to(self.previous_location()),
            });
        }

        let open = self.expect_symbol("{", "to open the function body")?;
        let body = self.parse_block_statements()?;
        self.expect_symbol("}", "to close the function body")?;

        Ok(Function {
            name: name.text,
            params,
            return_type,
            body,
            library: None,
            location: name.location.to(open.location),
        })
    }

    fn parse_param(&mut self) -> Result<Param, CompileError> {
        let name = self.expect_identifier("as parameter name")?;
        self.expect_symbol(":", "after parameter name")?;
        let param_type = self.parse_type()?;

        Ok(Param {
            name: name.text,
            param_type,
            location: name.location.to(self.previous_location()),
        })
    }

    pub(crate) fn parse_struct(&mut self) -> Result<StructDef, CompileError> {
        let name = self.expect_identifier("as struct name")?;
        self.expect_symbol("::", "after struct name")?;
        let keyword = self.expect_keyword("struct", "in struct declaration")?;

        if self.check_keyword("#lib") {
            let library = self.parse_library_binding()?;
            return Ok(StructDef {
                name: name.text,
                fields: Vec::new(),
                library: Some(library),
                location: name.location.to(keyword.location),
            });
        }

        self.expect_symbol("{", "to open the struct body")?;
        let mut fields = Vec::new();
        while !self.check_symbol("}") {
            if self.is_at_end() {
                return Err(self.end_of_file("\"}\" to close the struct body"));
            }
            let field_name = self.expect_identifier("as struct field name")?;
            self.expect_symbol(":", "after struct field name")?;
            let field_type = self.parse_type()?;
            self.expect_symbol(";", "after struct field")?;

            fields.push(Field {
                name: field_name.text,
                field_type,
                location: field_name.location.to(self.previous_location()),
            });
        }
        self.expect_symbol("}", "to close the struct body")?;

        Ok(StructDef {
            name: name.text,
            fields,
            library: None,
            location: name.location.to(keyword.location),
        })
    }

    /// `#lib "Name";` and returns `Name`.
    fn parse_library_binding(&mut self) -> Result<String, CompileError> {
        self.expect_keyword("#lib", "")?;
        let token = self.advance("a library name")?;
        if token.literal != Some(LiteralKind::String) {
            return Err(self.error_at(
                token.location,
                format!("expected a library name string, but got {}.", token),
            ));
        }
        self.expect_symbol(";", "after library binding")?;

        let text = token.text;
        Ok(text[1..text.len() - 1].to_string())
    }

    pub(crate) fn parse_type(&mut self) -> Result<Type, CompileError> {
        let is_varargs = self.match_symbol("..");

        let mut array_dimension = 0;
        while self.match_symbol("[") {
            self.expect_symbol("]", "in array type")?;
            array_dimension += 1;
        }

        let token = self.advance("a type")?;
        let base = match (token.kind, token.text.as_str()) {
            (TokenKind::Keyword, "i8") => BaseType::I8,
            (TokenKind::Keyword, "i16") => BaseType::I16,
            (TokenKind::Keyword, "i32") => BaseType::I32,
            (TokenKind::Keyword, "i64") => BaseType::I64,
            (TokenKind::Keyword, "f32") => BaseType::F32,
            (TokenKind::Keyword, "f64") => BaseType::F64,
            (TokenKind::Keyword, "string") => BaseType::String,
            (TokenKind::Keyword, "bool") => BaseType::Bool,
            (TokenKind::Keyword, "char") => BaseType::Char,
            (TokenKind::Keyword, "any") => BaseType::Any,
            (TokenKind::Identifier, name) => BaseType::Struct(name.to_string()),
            _ => {
                return Err(self.error_at(
                    token.location,
                    format!("expected a type, but got {}.", token),
                ))
            }
        };

        let mut ty = Type::new(base).with_array_dimension(array_dimension);
        if is_varargs {
            ty = ty.with_varargs();
        }
        Ok(ty)
    }
}
