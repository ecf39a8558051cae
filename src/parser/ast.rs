//! AST definitions for ABC programs
//!
//! The tree is built once by the parser and then annotated in place by the
//! type checker. Checker-owned fields are `Option`s that stay `None` until the
//! checker fills them: every `resolved_type`, literal values, declaration
//! defaults, and the implicit [`Expression::TypeCast`] wrappers it inserts.

use std::collections::BTreeSet;
use std::fmt;

/// Source span of a token or node.
///
/// Lines and columns are 1-based. `char_end` is exclusive, so a single
/// character at column 5 spans `5..6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line_start: usize,
    pub char_start: usize,
    pub line_end: usize,
    pub char_end: usize,
}

impl SourceLocation {
    pub fn new(line_start: usize, char_start: usize, line_end: usize, char_end: usize) -> Self {
        Self {
            line_start,
            char_start,
            line_end,
            char_end,
        }
    }

    /// A one-character span.
    pub fn point(line: usize, column: usize) -> Self {
        Self::new(line, column, line, column + 1)
    }

    /// Span from the start of `self` to the end of `end`.
    pub fn to(self, end: SourceLocation) -> Self {
        Self::new(self.line_start, self.char_start, end.line_end, end.char_end)
    }
}

/// Type category. Struct types carry their name, so a struct name exists
/// exactly when the category is `Struct`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Char,
    String,
    Struct(String),
    Void,
    Any,
    /// Type of the `nil` sentinel.
    Object,
}

impl BaseType {
    pub fn category_name(&self) -> &'static str {
        match self {
            BaseType::I8 => "I8",
            BaseType::I16 => "I16",
            BaseType::I32 => "I32",
            BaseType::I64 => "I64",
            BaseType::F32 => "F32",
            BaseType::F64 => "F64",
            BaseType::Bool => "Bool",
            BaseType::Char => "Char",
            BaseType::String => "String",
            BaseType::Struct(_) => "Struct",
            BaseType::Void => "Void",
            BaseType::Any => "Any",
            BaseType::Object => "Object",
        }
    }

    /// Position in the widening order `I8 < I16 < I32 < I64 < F32 < F64`.
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            BaseType::I8 => Some(1),
            BaseType::I16 => Some(2),
            BaseType::I32 => Some(3),
            BaseType::I64 => Some(4),
            BaseType::F32 => Some(5),
            BaseType::F64 => Some(6),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        self.numeric_rank().is_some()
    }

    pub fn is_number_or_char(&self) -> bool {
        self.is_number() || *self == BaseType::Char
    }

    /// Integer categories, `Char` included.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BaseType::I8 | BaseType::I16 | BaseType::I32 | BaseType::I64 | BaseType::Char
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, BaseType::F32 | BaseType::F64)
    }
}

/// Full type descriptor: category, varargs flag and array rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub base: BaseType,
    pub is_varargs: bool,
    pub array_dimension: usize,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            is_varargs: false,
            array_dimension: 0,
        }
    }

    pub fn with_varargs(mut self) -> Self {
        self.is_varargs = true;
        self
    }

    pub fn with_array_dimension(mut self, dimension: usize) -> Self {
        self.array_dimension = dimension;
        self
    }

    pub fn void() -> Self {
        Type::new(BaseType::Void)
    }

    /// Neither an array nor varargs.
    pub fn is_scalar(&self) -> bool {
        !self.is_varargs && self.array_dimension == 0
    }

    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void
    }

    pub fn is_scalar_number_or_char(&self) -> bool {
        self.is_scalar() && self.base.is_number_or_char()
    }

    pub fn is_scalar_integer(&self) -> bool {
        self.is_scalar() && self.base.is_integer()
    }

    pub fn is_scalar_bool(&self) -> bool {
        self.is_scalar() && self.base == BaseType::Bool
    }

    pub fn struct_name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    /// `[][] I32`, `[] Any` for varargs, `Struct Point`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_varargs {
            write!(f, "[]")?;
        }
        for _ in 0..self.array_dimension {
            write!(f, "[]")?;
        }
        if self.is_varargs || self.array_dimension > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", self.base.category_name())?;
        if let BaseType::Struct(name) = &self.base {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
    BitUShr,
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        let op = match symbol {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            "&" => BinOp::BitAnd,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "<<" => BinOp::BitShl,
            ">>" => BinOp::BitShr,
            ">>>" => BinOp::BitUShr,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitShl => "<<",
            BinOp::BitShr => ">>",
            BinOp::BitUShr => ">>>",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            BinOp::BitAnd
                | BinOp::BitOr
                | BinOp::BitXor
                | BinOp::BitShl
                | BinOp::BitShr
                | BinOp::BitUShr
        )
    }
}

/// Unary prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnOp {
    pub fn from_symbol(symbol: &str) -> Option<UnOp> {
        match symbol {
            "-" => Some(UnOp::Neg),
            "+" => Some(UnOp::Plus),
            "!" => Some(UnOp::Not),
            "~" => Some(UnOp::BitNot),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
        }
    }
}

/// Literal token subkinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    I32,
    I64,
    F32,
    F64,
    Char,
    Bool,
    String,
    Nil,
}

impl LiteralKind {
    pub fn base_type(&self) -> BaseType {
        match self {
            LiteralKind::I32 => BaseType::I32,
            LiteralKind::I64 => BaseType::I64,
            LiteralKind::F32 => BaseType::F32,
            LiteralKind::F64 => BaseType::F64,
            LiteralKind::Char => BaseType::Char,
            LiteralKind::Bool => BaseType::Bool,
            LiteralKind::String => BaseType::String,
            LiteralKind::Nil => BaseType::Object,
        }
    }
}

/// A value computed at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Source text, quotes and suffixes included.
    pub raw: String,
    pub kind: LiteralKind,
    pub value: Option<ConstValue>,
    pub resolved_type: Option<Type>,
    pub location: SourceLocation,
}

impl Literal {
    pub fn new(raw: impl Into<String>, kind: LiteralKind, location: SourceLocation) -> Self {
        Literal {
            raw: raw.into(),
            kind,
            value: None,
            resolved_type: None,
            location,
        }
    }
}

/// One segment of an access chain such as `a[i][j].b.c`.
///
/// Index expressions belong to the segment they follow; `.` links to the
/// next segment through `child`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub indices: Vec<Expression>,
    pub child: Option<Box<Variable>>,
    pub resolved_type: Option<Type>,
    /// Set by the checker for built-in fields such as `length`.
    pub read_only: bool,
    pub location: SourceLocation,
}

impl Variable {
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Variable {
            name: name.into(),
            indices: Vec::new(),
            child: None,
            resolved_type: None,
            read_only: false,
            location,
        }
    }

    /// Dot-joined names of the whole chain: `a.b.c`.
    pub fn chain_name(&self) -> String {
        let mut names = vec![self.name.as_str()];
        let mut current = self;
        while let Some(child) = &current.child {
            names.push(child.name.as_str());
            current = child.as_ref();
        }
        names.join(".")
    }

    /// Last segment of the chain, which determines the chain's type.
    pub fn leaf(&self) -> &Variable {
        let mut current = self;
        while let Some(child) = &current.child {
            current = child.as_ref();
        }
        current
    }

    /// Span from the root segment to the end of the last one.
    pub fn full_location(&self) -> SourceLocation {
        self.location.to(self.leaf().location)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Expression>,
    /// Return type of the selected overload.
    pub resolved_type: Option<Type>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    BinaryOp {
        op: BinOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
        resolved_type: Option<Type>,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<Expression>,
        resolved_type: Option<Type>,
        location: SourceLocation,
    },
    Parenthesis {
        inner: Box<Expression>,
        resolved_type: Option<Type>,
        location: SourceLocation,
    },
    Variable(Variable),
    FunctionCall(FunctionCall),
    TypeCast {
        target: Type,
        inner: Box<Expression>,
        /// Inserted by the checker for a narrowing constant.
        is_implicit: bool,
        /// Folded value of `inner` when the cast is implicit.
        constant: Option<ConstValue>,
        resolved_type: Option<Type>,
        location: SourceLocation,
    },
}

impl Expression {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expression::Literal(literal) => literal.location,
            Expression::BinaryOp { lhs, rhs, .. } => lhs.location().to(rhs.location()),
            Expression::UnaryOp { location, .. }
            | Expression::Parenthesis { location, .. }
            | Expression::TypeCast { location, .. } => *location,
            Expression::Variable(variable) => variable.full_location(),
            Expression::FunctionCall(call) => call.location,
        }
    }

    /// Type filled in by the checker. For a variable chain this is the type
    /// of its last segment.
    pub fn resolved_type(&self) -> Option<&Type> {
        match self {
            Expression::Literal(literal) => literal.resolved_type.as_ref(),
            Expression::BinaryOp { resolved_type, .. }
            | Expression::UnaryOp { resolved_type, .. }
            | Expression::Parenthesis { resolved_type, .. }
            | Expression::TypeCast { resolved_type, .. } => resolved_type.as_ref(),
            Expression::Variable(variable) => variable.leaf().resolved_type.as_ref(),
            Expression::FunctionCall(call) => call.resolved_type.as_ref(),
        }
    }
}

/// Right-hand side of a declaration or definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Expression(Expression),
    /// `new` followed by one `[size]` per array dimension, none for structs.
    New {
        array_sizes: Vec<Expression>,
        location: SourceLocation,
    },
}

impl Assignment {
    pub fn location(&self) -> SourceLocation {
        match self {
            Assignment::Expression(expression) => expression.location(),
            Assignment::New { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub var_type: Type,
    pub name: String,
    /// Filled with a default literal by the checker when absent in source.
    pub init: Option<Assignment>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    Definition {
        lhs: Variable,
        rhs: Assignment,
        location: SourceLocation,
    },
    Return {
        expression: Option<Expression>,
        location: SourceLocation,
    },
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
        location: SourceLocation,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Call(FunctionCall),
}

impl Statement {
    pub fn location(&self) -> SourceLocation {
        match self {
            Statement::Declaration(declaration) => declaration.location,
            Statement::Definition { location, .. }
            | Statement::Return { location, .. }
            | Statement::If { location, .. }
            | Statement::While { location, .. } => *location,
            Statement::Call(call) => call.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: Type,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<Statement>,
    /// `#lib "Name"` binding; such functions have no body.
    pub library: Option<String>,
    pub location: SourceLocation,
}

impl Function {
    pub fn is_external(&self) -> bool {
        self.library.is_some()
    }

    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.param_type.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: Type,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<Field>,
    /// `#lib "Name"` binding; such structs have no fields.
    pub library: Option<String>,
    pub location: SourceLocation,
}

impl StructDef {
    pub fn is_external(&self) -> bool {
        self.library.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single compilation unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub functions: Vec<Function>,
    pub structs: Vec<StructDef>,
    /// External libraries the generated code must link against.
    pub library_dependencies: BTreeSet<String>,
    /// Set when a zero-parameter `main` exists.
    pub has_program_entry: bool,
    /// Number of leading entries in `functions` that are preloaded headers.
    pub preloaded_functions: usize,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Functions written in the source file, without the preloaded headers.
    pub fn user_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().skip(self.preloaded_functions)
    }
}
