// Integration tests for the type checker

use abcc::config::Settings;
use abcc::diagnostics::{CompileError, ErrorKind, SourceFile};
use abcc::parser::ast::*;

const POINT: &str = "Point :: struct { x: i32; y: i32; }\n";

fn compile(text: &str) -> Result<Program, CompileError> {
    let source = SourceFile::new("check.abc", text);
    abcc::compile(&source, &Settings::default())
}

fn message(text: &str) -> String {
    let err = compile(text).expect_err("Type checking should fail");
    assert_eq!(err.kind, ErrorKind::Semantic, "unexpected error: {}", err);
    err.message
}

/// Error message for `body` placed inside `main`, after the `Point` struct.
fn main_error(body: &str) -> String {
    message(&format!("{}main :: () {{\n{}\n}}", POINT, body))
}

fn main_ok(body: &str) -> Program {
    let text = format!("{}main :: () {{\n{}\n}}", POINT, body);
    match compile(&text) {
        Ok(program) => program,
        Err(err) => panic!("Type checking failed:\n{}", err),
    }
}

fn main_body(program: &Program) -> &[Statement] {
    &program
        .user_functions()
        .find(|f| f.name == "main")
        .expect("main is missing")
        .body
}

fn declaration_init(statement: &Statement) -> &Expression {
    match statement {
        Statement::Declaration(Declaration {
            init: Some(Assignment::Expression(expression)),
            ..
        }) => expression,
        other => panic!("Expected an initialized declaration, got {:?}", other),
    }
}

// ===== Properties =====

#[test]
fn test_narrowing_out_of_range() {
    assert_eq!(
        main_error("x: i16 = 65536;"),
        "Expression 65536 is out of bounds [-32768, 32767] for type I16."
    );
    assert_eq!(
        main_error("c: char = -1;"),
        "Expression -1 is out of bounds [0, 65535] for type Char."
    );
}

#[test]
fn test_undeclared_function() {
    assert_eq!(
        main_error("nilo_the_magic_dragon();"),
        "trying to call an undeclared function: \"nilo_the_magic_dragon\"."
    );
}

#[test]
fn test_return_exhaustiveness() {
    assert_eq!(
        message("f :: (a: i32) -> i32 { if (a > 0) { return 1; } }"),
        "function does not have exhaustive \"return\" statements."
    );
    assert!(compile("f :: (a: i32) -> i32 { if (a > 0) { return 1; } else { return 0; } }").is_ok());
}

#[test]
fn test_while_never_guarantees_return() {
    assert_eq!(
        message("f :: () -> i32 { while (true) { return 1; } }"),
        "function does not have exhaustive \"return\" statements."
    );
}

#[test]
fn test_only_last_statement_counts() {
    assert_eq!(
        message("f :: (a: i32) -> i32 { if (a > 0) { return 1; } else { return 0; } print(\"x\"); }"),
        "function does not have exhaustive \"return\" statements."
    );
}

#[test]
fn test_undefined_struct_member_type() {
    assert_eq!(
        message("Line :: struct { from: Point; to: Point; }"),
        "undefined struct type \"Point\" for struct member \"from\" in struct \"Line\"."
    );
}

// ===== Narrowing and constants =====

#[test]
fn test_narrowing_inserts_implicit_cast() {
    let program = main_ok("x: i8 = 100 + 27;\ny: i32 = 5;");
    let body = main_body(&program);

    match declaration_init(&body[0]) {
        Expression::TypeCast {
            target,
            is_implicit,
            constant,
            resolved_type,
            ..
        } => {
            assert_eq!(*target, Type::new(BaseType::I8));
            assert!(*is_implicit);
            assert_eq!(*constant, Some(ConstValue::Int(127)));
            assert_eq!(resolved_type.as_ref(), Some(&Type::new(BaseType::I8)));
        }
        other => panic!("Expected an implicit cast, got {:?}", other),
    }

    assert!(matches!(declaration_init(&body[1]), Expression::Literal(_)));
}

#[test]
fn test_constant_precedence() {
    let program = main_ok("a: i8 = 2 + 3 * 4;\nb: i8 = (2 + 3) * 4;");
    let body = main_body(&program);

    let folded = |statement: &Statement| match declaration_init(statement) {
        Expression::TypeCast { constant, .. } => *constant,
        other => panic!("Expected an implicit cast, got {:?}", other),
    };
    assert_eq!(folded(&body[0]), Some(ConstValue::Int(14)));
    assert_eq!(folded(&body[1]), Some(ConstValue::Int(20)));
}

#[test]
fn test_narrowing_requires_constant() {
    assert_eq!(
        main_error("n: i32 = 5;\nx: i8 = n;"),
        "type mismatch. expected type \"I8\", got type: \"I32\"."
    );
    assert_eq!(
        main_error("x: i16 = 5l;"),
        "type mismatch. expected type \"I16\", got type: \"I64\"."
    );
}

#[test]
fn test_narrowing_through_casts_and_shifts() {
    main_ok("a: i8 = (i32) 300l - 200;\nb: char = 1 << 15;\nc: i16 = ~0;");
    assert_eq!(
        main_error("x: i8 = 1 << 8;"),
        "Expression 256 is out of bounds [-128, 127] for type I8."
    );
}

#[test]
fn test_division_by_zero_in_constant() {
    assert_eq!(
        main_error("x: i8 = 10 / (3 - 3);"),
        "division by zero in constant expression."
    );
}

#[test]
fn test_default_initializers() {
    let program = main_ok("a: i32;\nb: i8;\nc: bool;\nd: string;\ne: []i32;\np: Point;\nf: f32;");
    let body = main_body(&program);

    assert!(matches!(
        declaration_init(&body[0]),
        Expression::Literal(Literal { kind: LiteralKind::I32, .. })
    ));
    assert!(matches!(
        declaration_init(&body[1]),
        Expression::TypeCast { is_implicit: true, .. }
    ));
    assert!(matches!(
        declaration_init(&body[2]),
        Expression::Literal(Literal { kind: LiteralKind::Bool, .. })
    ));
    for statement in &body[3..6] {
        assert!(matches!(
            declaration_init(statement),
            Expression::Literal(Literal { kind: LiteralKind::Nil, .. })
        ));
    }
    assert!(matches!(
        declaration_init(&body[6]),
        Expression::Literal(Literal { kind: LiteralKind::F32, .. })
    ));
}

// ===== Literals =====

#[test]
fn test_literal_values() {
    let program = main_ok("a: i32 = 0x7fffffff;\nb: i64 = 0b1010l;\nc: char = '\\n';\nd: f64 = .5;");
    let body = main_body(&program);
    let value = |statement: &Statement| match declaration_init(statement) {
        Expression::Literal(literal) => literal.value,
        other => panic!("Expected a literal, got {:?}", other),
    };

    assert_eq!(value(&body[0]), Some(ConstValue::Int(i64::from(i32::MAX))));
    assert_eq!(value(&body[1]), Some(ConstValue::Int(10)));
    assert_eq!(value(&body[2]), Some(ConstValue::Int(10)));
    assert_eq!(value(&body[3]), Some(ConstValue::Float(0.5)));
}

#[test]
fn test_literal_range_errors() {
    assert_eq!(
        main_error("x: i32 = 2147483648;"),
        "i32 literal 2147483648 is outside range [-2147483648, 2147483647]."
    );
    assert_eq!(
        main_error("x: i64 = 9223372036854775808l;"),
        "i64 literal 9223372036854775808l is outside range [-9223372036854775808, 9223372036854775807]."
    );
    assert_eq!(main_error("c: char = '\\q';"), "invalid character \"'\\q'\".");
}

// ===== Operators =====

#[test]
fn test_promotion_of_small_integers() {
    let program = main_ok("a: i8 = 1;\nb: i16 = 2;\nc: i32 = a + b;\nd: i64 = c * 2l;\ne: f32 = d + 1.5f;");
    let body = main_body(&program);

    assert_eq!(
        declaration_init(&body[2]).resolved_type(),
        Some(&Type::new(BaseType::I32))
    );
    assert_eq!(
        declaration_init(&body[3]).resolved_type(),
        Some(&Type::new(BaseType::I64))
    );
    assert_eq!(
        declaration_init(&body[4]).resolved_type(),
        Some(&Type::new(BaseType::F32))
    );
}

#[test]
fn test_char_arithmetic_is_i32() {
    assert_eq!(
        main_error("c: char = 'a';\nd: char = c + 1;"),
        "type mismatch. expected type \"Char\", got type: \"I32\"."
    );
}

#[test]
fn test_invalid_binary_operators() {
    assert_eq!(
        main_error("x: f64 = 1.5 | 2;"),
        "invalid binary operator \"|\" for the types: F64 I32."
    );
    assert_eq!(
        main_error("x: bool = true < false;"),
        "invalid binary operator \"<\" for the types: Bool Bool."
    );
    assert_eq!(
        main_error("x: i32 = 1 + true;"),
        "invalid types. failed to apply binary operator: I32 + Bool."
    );
}

#[test]
fn test_reference_equality() {
    main_ok("s: string = \"a\";\nt: bool = s == nil;\np: Point = new;\nq: Point = p;\nu: bool = p != q;");
    assert_eq!(
        main_error("s: string = \"a\";\np: Point = new;\nt: bool = s == p;"),
        "invalid types. failed to apply binary operator: String == Struct Point."
    );
}

#[test]
fn test_unary_operators() {
    main_ok("a: bool = !false;\nb: i32 = -'a';\nc: i64 = ~5l;");
    assert_eq!(
        main_error("x: bool = -true;"),
        "invalid unary operator \"-\" on type: Bool."
    );
    assert_eq!(
        main_error("x: f32 = ~1.5f;"),
        "invalid unary operator \"~\" on type: F32."
    );
    assert_eq!(
        main_error("p: Point = new;\nx: bool = !p;"),
        "invalid type. failed to apply unary \"!\" operator on type: Struct Point."
    );
}

#[test]
fn test_casts() {
    main_ok("a: i8 = (i8) 300;\nb: f32 = (f32) 2.5;\nc: i32 = (i32) 'x';");
    assert_eq!(main_error("b: bool = (bool) 1;"), "failed to cast I32 to Bool.");
    assert_eq!(
        main_error("x: i32 = (Missing) 1;"),
        "undefined struct type \"Missing\" in type cast."
    );
}

// ===== Variables =====

#[test]
fn test_variable_resolution_errors() {
    assert_eq!(main_error("x: i32 = y;"), "undeclared variable \"y\".");
    assert_eq!(main_error("x: i32 = x;"), "undeclared variable \"x\".");
    assert_eq!(
        main_error("p: Point = new;\nq: i32 = p.z;"),
        "struct Point doesn't contain field \"z\"."
    );
    assert_eq!(
        main_error("n: i32 = 0;\nm: i32 = n.x;"),
        "type I32 doesn't have any subfields."
    );
    assert_eq!(
        main_error("a: []i32 = new [1];\nb: i32 = a.size;"),
        "arrays don't contain field \"size\"."
    );
}

#[test]
fn test_array_indexing() {
    main_ok("a: [][]i32 = new [2][3];\nrow: []i32 = a[1];\nx: i32 = a[0][2];\nn: i32 = a[0].length;");
    assert_eq!(
        main_error("a: []i32 = new [2];\nx: i32 = a[0][1];"),
        "too many array unpacking. Max: 1, Got: 2."
    );
    assert_eq!(
        main_error("a: []i32 = new [2];\nx: i32 = a[true];"),
        "expected an integer when indexing \"a\", but got Bool."
    );
}

#[test]
fn test_length_is_read_only() {
    assert_eq!(
        main_error("a: []i32 = new [2];\na.length = 3;"),
        "lhs is read-only."
    );
}

#[test]
fn test_redeclarations() {
    assert_eq!(main_error("x: i32;\nx: bool;"), "redeclaration of x: I32.");
    assert_eq!(
        main_error("x: i32;\nif (true) { x: i64; }"),
        "redeclaration of x: I32."
    );
    assert_eq!(
        message("f :: (a: i32) { a: string; }"),
        "redeclaration of a: I32."
    );
    main_ok("if (true) { x: i32; }\nif (true) { x: bool; }");
}

#[test]
fn test_local_type_rules() {
    assert_eq!(
        main_error("m: Missing;"),
        "undefined struct type \"Missing\" for variable \"m\"."
    );
    assert_eq!(main_error("v: ..i32;"), "variable \"v\" can't be varargs.");
}

// ===== Assignments =====

#[test]
fn test_new_rules() {
    assert_eq!(
        main_error("x: i32 = new;"),
        "variable has a primitive type. \"new\" is only possible with structs and arrays."
    );
    assert_eq!(
        main_error("a: [][]i32 = new [2];"),
        "type mismatch between array sizes lhs dim=2 and rhs dim=1."
    );
    assert_eq!(
        main_error("a: []i32 = new [true];"),
        "expected array initialization value to be an integer, but is Bool."
    );
    assert_eq!(
        main_error("p: Point = new [3];"),
        "struct allocation doesn't take array sizes."
    );
}

#[test]
fn test_reference_assignment_mismatch() {
    assert_eq!(
        main_error("a: []i32 = new [1];\nb: []i64 = a;"),
        "type mismatch between lhs \"[] I64\" and rhs \"[] I32\"."
    );
    main_ok("a: []i32 = nil;\np: Point = nil;\ns: string = nil;\nv: any = a;");
}

// ===== Statements =====

#[test]
fn test_conditions_must_be_bool() {
    assert_eq!(
        main_error("if (1) { }"),
        "condition expression must yield a boolean, but it yields I32."
    );
    assert_eq!(
        main_error("while (nil) { }"),
        "condition expression must yield a boolean, but it yields Object."
    );
}

#[test]
fn test_return_rules() {
    assert_eq!(
        main_error("return;\nprint(\"x\");"),
        "return should be last statement in scope."
    );
    assert_eq!(
        message("f :: () -> i32 { return; }"),
        "got void return statement, expected return type of I32."
    );
    assert_eq!(
        message("f :: () { return 1; }"),
        "function has no return type, but a value is returned."
    );
    assert_eq!(
        message("f :: () -> i8 { return 1000; }"),
        "Expression 1000 is out of bounds [-128, 127] for type I8."
    );
}

// ===== Calls =====

#[test]
fn test_overload_resolution() {
    let overloads = "f :: (a: i64) { }\nf :: (a: f64) { }\n";
    assert_eq!(
        message(&format!("{}main :: () {{ f(1); }}", overloads)),
        "multiple functions are matching argument signature."
    );
    assert!(compile(&format!("{}f :: (a: i32) {{ }}\nmain :: () {{ f(1); }}", overloads)).is_ok());
    assert!(compile(&format!("{}main :: () {{ f(1l); f(1.0); }}", overloads)).is_ok());
}

#[test]
fn test_overload_mismatch() {
    assert_eq!(
        message("f :: (a: bool) { }\nmain :: () { f(1); }"),
        "function \"f\" parameter types do not match argument types."
    );
    assert_eq!(
        message("f :: (a: i32, b: i32) { }\nmain :: () { f(1); }"),
        "function \"f\" parameter types do not match argument types."
    );
}

#[test]
fn test_call_return_type() {
    let program = compile("twice :: (n: i32) -> i64 { return n * 2; }\nmain :: () { x: i64 = twice(4); }")
        .expect("Type checking failed");
    let main = program
        .user_functions()
        .find(|f| f.name == "main")
        .expect("main is missing");
    assert_eq!(
        declaration_init(&main.body[0]).resolved_type(),
        Some(&Type::new(BaseType::I64))
    );
}

#[test]
fn test_varargs_calls() {
    let text = r#"
        sum :: (values: ..i32) -> i32 {
            total: i32 = 0;
            i: i32 = 0;
            while (i < values.length) {
                total = total + values[i];
                i = i + 1;
            }
            return total;
        }

        main :: () {
            a: []i32 = new [3];
            s: i32 = sum(a);
            t: i32 = sum(1, 2, 3);
            u: i32 = sum();
            print("%d %d %d\n", s, t, u);
        }
    "#;
    assert!(compile(text).is_ok(), "{:?}", compile(text).err());
}

#[test]
fn test_void_call_has_no_value() {
    let expected = "expression of type \"void\" can't be used as a value.";
    assert_eq!(main_error("x: any = print(\"a\");"), expected);
    assert_eq!(main_error("print(\"%d\", exit(0));"), expected);
    assert_eq!(main_error("x: any = (any) exit(1);"), expected);
    assert_eq!(
        message("nothing :: () { }\nmain :: () { p: Point = nothing(); }\nPoint :: struct { x: i32; }"),
        expected
    );
}

#[test]
fn test_builtins_are_callable() {
    main_ok("ensure(1 < 2, \"math is broken: %d\", 3);\nn: i32 = length(\"abc\");\nc: char = char_at(\"abc\", 1);\nexit(0);");
    assert_eq!(
        main_error("exit(\"now\");"),
        "function \"exit\" parameter types do not match argument types."
    );
}

#[test]
fn test_error_location_is_rendered() {
    let err = compile("main :: () {\n    x: i16 = 65536;\n}").unwrap_err();
    assert_eq!(
        err.rendered,
        "File \"check.abc\", line 2\n      x: i16 = 65536;\n               ^^^^^\nError: Expression 65536 is out of bounds [-32768, 32767] for type I16."
    );
}
