//! Semantic analysis for ABC programs
//!
//! The checker walks the parsed [`Program`](crate::parser::ast::Program) once,
//! resolving names against the struct and function tables and annotating the
//! tree in place:
//!
//! - [`engine`]: the [`TypeChecker`] and its registration passes
//! - [`type_system`]: the type compatibility lattice and numeric promotion
//! - `scope`: parameter and block scopes
//! - `literals`: literal value parsing
//! - `constants`: constant folding for implicit narrowing
//! - `expressions`, `calls`, `statements`: inference per node family
//!
//! # Annotations
//!
//! After a successful check every expression has a resolved type, every
//! declaration has an initializer, and constant `i32` expressions assigned to
//! narrower integer targets are wrapped in implicit casts.

mod calls;
mod constants;
pub mod engine;
mod expressions;
mod literals;
mod scope;
mod statements;
pub mod type_system;

pub use engine::TypeChecker;
