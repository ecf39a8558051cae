// Integration tests for the whole front end

use std::fs;

use abcc::config::{ErrorMode, Settings};
use abcc::diagnostics::{CompileError, ErrorKind, SourceFile};
use abcc::parser::ast::*;

fn compile(text: &str) -> Result<Program, CompileError> {
    let source = SourceFile::new("program.abc", text);
    abcc::compile(&source, &Settings::default())
}

fn compile_ok(text: &str) -> Program {
    match compile(text) {
        Ok(program) => program,
        Err(err) => panic!("Compilation failed:\n{}", err),
    }
}

/// Assert that the checker left no expression or variable segment untyped.
fn assert_fully_typed(program: &Program) {
    for function in program.user_functions() {
        assert_statements_typed(&function.body, &function.name);
    }
}

fn assert_statements_typed(statements: &[Statement], context: &str) {
    for statement in statements {
        match statement {
            Statement::Declaration(declaration) => {
                let init = declaration
                    .init
                    .as_ref()
                    .unwrap_or_else(|| panic!("{}: {} has no initializer", context, declaration.name));
                assert_assignment_typed(init, context);
            }
            Statement::Definition { lhs, rhs, .. } => {
                assert_variable_typed(lhs, context);
                assert_assignment_typed(rhs, context);
            }
            Statement::Return { expression, .. } => {
                if let Some(expression) = expression {
                    assert_expression_typed(expression, context);
                }
            }
            Statement::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                assert_expression_typed(condition, context);
                assert_statements_typed(then_body, context);
                if let Some(body) = else_body {
                    assert_statements_typed(body, context);
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                assert_expression_typed(condition, context);
                assert_statements_typed(body, context);
            }
            Statement::Call(call) => {
                call.arguments
                    .iter()
                    .for_each(|a| assert_expression_typed(a, context));
            }
        }
    }
}

fn assert_assignment_typed(assignment: &Assignment, context: &str) {
    match assignment {
        Assignment::Expression(expression) => assert_expression_typed(expression, context),
        Assignment::New { array_sizes, .. } => array_sizes
            .iter()
            .for_each(|size| assert_expression_typed(size, context)),
    }
}

fn assert_expression_typed(expression: &Expression, context: &str) {
    assert!(
        expression.resolved_type().is_some(),
        "{}: untyped expression {:?}",
        context,
        expression
    );

    match expression {
        Expression::Literal(_) => {}
        Expression::BinaryOp { lhs, rhs, .. } => {
            assert_expression_typed(lhs, context);
            assert_expression_typed(rhs, context);
        }
        Expression::UnaryOp { operand, .. } => assert_expression_typed(operand, context),
        Expression::Parenthesis { inner, .. } | Expression::TypeCast { inner, .. } => {
            assert_expression_typed(inner, context)
        }
        Expression::Variable(variable) => assert_variable_typed(variable, context),
        Expression::FunctionCall(call) => call
            .arguments
            .iter()
            .for_each(|a| assert_expression_typed(a, context)),
    }
}

fn assert_variable_typed(variable: &Variable, context: &str) {
    let mut segment = Some(variable);
    while let Some(current) = segment {
        assert!(
            current.resolved_type.is_some(),
            "{}: untyped segment \"{}\" of {}",
            context,
            current.name,
            variable.chain_name()
        );
        current
            .indices
            .iter()
            .for_each(|index| assert_expression_typed(index, context));
        segment = current.child.as_deref();
    }
}

#[test]
fn test_varargs_program() {
    let program = compile_ok(
        r#"
        // Sum any number of integers.
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
            a[0] = 1;
            a[1] = 2;
            a[2] = a[0] + a[1];
            print("%d %d %d\n", sum(a), sum(1, 2, 3), sum());
        }
        "#,
    );

    assert!(program.has_program_entry);
    assert_fully_typed(&program);
}

#[test]
fn test_struct_program() {
    let program = compile_ok(
        r#"
        Point :: struct {
            x: f64;
            y: f64;
        }

        Line :: struct {
            from: Point;
            to: Point;
        }

        length_squared :: (line: Line) -> f64 {
            dx: f64 = line.to.x - line.from.x;
            dy: f64 = line.to.y - line.from.y;
            return dx * dx + dy * dy;
        }

        main :: () {
            line: Line = new;
            line.from = new;
            line.to = new;
            line.to.x = 3.0;
            line.to.y = 4;
            if (line.from != nil && length_squared(line) == 25.0) {
                print("%f\n", length_squared(line));
            } else {
                exit(1);
            }
        }
        "#,
    );

    assert_fully_typed(&program);
    assert_eq!(program.structs.len(), 2);

    let length_squared = program
        .user_functions()
        .find(|f| f.name == "length_squared")
        .expect("length_squared is missing");
    let Statement::Declaration(Declaration {
        init: Some(Assignment::Expression(Expression::BinaryOp { lhs, .. })),
        ..
    }) = &length_squared.body[0]
    else {
        panic!("Expected a subtraction, got {:?}", length_squared.body[0]);
    };
    let Expression::Variable(chain) = lhs.as_ref() else {
        panic!("Expected a variable chain, got {:?}", lhs);
    };
    assert_eq!(chain.chain_name(), "line.to.x");
    assert_eq!(
        chain.resolved_type,
        Some(Type::new(BaseType::Struct("Line".to_string())))
    );
    assert_eq!(chain.leaf().resolved_type, Some(Type::new(BaseType::F64)));
}

#[test]
fn test_recursion_and_overloads() {
    let program = compile_ok(
        r#"
        fib :: (n: i32) -> i64 {
            if (n < 2) {
                return n;
            } else {
                return fib(n - 1) + fib(n - 2);
            }
        }

        show :: (value: i64) { print("%ld\n", value); }
        show :: (value: f64) { print("%f\n", value); }
        show :: (flag: bool) {
            if (flag) { print("yes\n"); } else { print("no\n"); }
        }

        main :: () {
            show(fib(20));
            show(1.5);
            show(true);
            small: i8 = (i8) fib(5);
            mask: i16 = 0xff & ~0x0f;
        }
        "#,
    );

    assert_fully_typed(&program);
    assert_eq!(program.user_functions().filter(|f| f.name == "show").count(), 3);
}

#[test]
fn test_library_bindings() {
    let program = compile_ok(
        r#"
        Window :: struct #lib "Graphics";
        open_window :: (title: string, width: i32, height: i32) -> Window #lib "Graphics";
        sleep :: (millis: i64) #lib "Timing";

        main :: () {
            w: Window = open_window("demo", 640, 480);
            sleep(16);
        }
        "#,
    );

    let dependencies: Vec<&str> = program
        .library_dependencies
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(
        dependencies,
        vec!["Graphics", "Preload", "RuntimeSupport", "Timing"]
    );
}

#[test]
fn test_program_without_entry() {
    let program = compile_ok("helper :: () -> i32 { return 1; }");
    assert!(!program.has_program_entry);
}

#[test]
fn test_error_kinds() {
    let lexical = compile("main :: () { x: i32 = 1 @ 2; }").unwrap_err();
    assert_eq!(lexical.kind, ErrorKind::Lexical);

    let syntax = compile("main :: () { x: i32 = ; }").unwrap_err();
    assert_eq!(syntax.kind, ErrorKind::Syntax);

    let semantic = compile("main :: () { x: i32 = true; }").unwrap_err();
    assert_eq!(semantic.kind, ErrorKind::Semantic);
    assert_eq!(
        semantic.message,
        "type mismatch. expected type \"I32\", got type: \"Bool\"."
    );
}

#[test]
fn test_first_error_wins() {
    let err = compile("main :: () {\n    a: i32 = y;\n    b: i32 = z;\n}").unwrap_err();
    assert_eq!(err.message, "undeclared variable \"y\".");
    assert_eq!(err.location.line_start, 2);
}

#[test]
fn test_multiline_rendering() {
    let err = compile("main :: () {\n    x: bool = 1 +\n        2;\n}").unwrap_err();
    assert!(err.rendered.starts_with("File \"program.abc\", lines 2-3\n"));
    assert!(err.rendered.ends_with("Error: type mismatch. expected type \"Bool\", got type: \"I32\"."));
}

#[test]
fn test_compile_file() {
    let path = std::env::temp_dir().join(format!("abcc-compile-{}.abc", std::process::id()));
    fs::write(&path, "main :: () { print(\"hello\\n\"); }").expect("Writing the source failed");

    let settings = Settings::new(ErrorMode::Catchable);
    let result = abcc::compile_file(&path, &settings).expect("Reading the source failed");
    let _ = fs::remove_file(&path);

    let program = result.expect("Compilation failed");
    assert!(program.has_program_entry);

    let missing = std::env::temp_dir().join("abcc-missing-file.abc");
    assert!(abcc::compile_file(&missing, &settings).is_err());
}

#[test]
fn test_diagnostic_names_file() {
    let dir = std::env::temp_dir().join(format!("abcc-named-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("Creating the directory failed");
    let path = dir.join("broken.abc");
    fs::write(&path, "main :: () { return 1; }").expect("Writing the source failed");

    let source = abcc::read_source(&path).expect("Reading the source failed");
    let _ = fs::remove_dir_all(&dir);

    let err = abcc::compile(&source, &Settings::default()).unwrap_err();
    assert!(err.rendered.contains("broken.abc"));
    assert_eq!(err.message, "function has no return type, but a value is returned.");
}
