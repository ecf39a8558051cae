// abcc: ABC compiler front end

use std::path::PathBuf;
use std::process::ExitCode;

use abcc::config::{ErrorMode, Settings};
use abcc::diagnostics::{CompileError, SourceFile};
use abcc::parser::ast::{Function, Program, StructDef};
use abcc::parser::lexer::Lexer;
use clap::{Parser, ValueEnum};
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

/// Lex, parse and type check an ABC source file.
#[derive(Parser, Debug)]
#[command(name = "abcc", version, about = "Front end for the ABC language")]
struct Args {
    /// Source file to compile.
    file: PathBuf,

    /// Return errors to the driver or exit straight from the reporter.
    #[arg(long, value_enum, default_value_t = ErrorModeArg::Catchable)]
    error_mode: ErrorModeArg,

    /// Print the token stream before compiling.
    #[arg(long)]
    tokens: bool,

    /// Print every struct and function header after checking.
    #[arg(long)]
    signatures: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ErrorModeArg {
    Catchable,
    Fatal,
}

impl From<ErrorModeArg> for ErrorMode {
    fn from(arg: ErrorModeArg) -> Self {
        match arg {
            ErrorModeArg::Catchable => ErrorMode::Catchable,
            ErrorModeArg::Fatal => ErrorMode::Fatal,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::new(args.error_mode.into());

    let source = match abcc::read_source(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}: can't read '{}': {}", "error".red().bold(), args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if args.tokens {
        if let Err(e) = print_tokens(&source, &settings) {
            return report(&e);
        }
    }

    let program = match abcc::compile(&source, &settings) {
        Ok(program) => program,
        Err(e) => return report(&e),
    };

    if args.signatures {
        print_signatures(&program);
    }
    print_summary(&source, &program);
    ExitCode::SUCCESS
}

/// Log to stderr; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(error: &CompileError) -> ExitCode {
    eprintln!("{}: {}", "error".red().bold(), error.kind);
    eprintln!("{}", error);
    ExitCode::FAILURE
}

fn print_tokens(source: &SourceFile, settings: &Settings) -> Result<(), CompileError> {
    let tokens = Lexer::new(source, settings).tokenize()?;
    for token in &tokens {
        let loc = token.location;
        println!("{:>4}:{:<4} {}", loc.line_start, loc.char_start, token);
    }
    Ok(())
}

fn print_signatures(program: &Program) {
    for struct_def in &program.structs {
        println!("{}", struct_signature(struct_def));
    }
    for function in program.user_functions() {
        println!("{}", function_signature(function));
    }
}

fn struct_signature(struct_def: &StructDef) -> String {
    if let Some(library) = &struct_def.library {
        return format!("{} :: struct #lib \"{}\"", struct_def.name, library);
    }
    let fields: Vec<String> = struct_def
        .fields
        .iter()
        .map(|f| format!("{}: {}", f.name, f.field_type))
        .collect();
    format!("{} :: struct {{ {} }}", struct_def.name, fields.join("; "))
}

fn function_signature(function: &Function) -> String {
    let params: Vec<String> = function
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.param_type))
        .collect();
    let mut signature = format!(
        "{} :: ({}) -> {}",
        function.name,
        params.join(", "),
        function.return_type
    );
    if let Some(library) = &function.library {
        signature.push_str(&format!(" #lib \"{}\"", library));
    }
    signature
}

fn print_summary(source: &SourceFile, program: &Program) {
    let dependencies: Vec<&str> = program
        .library_dependencies
        .iter()
        .map(String::as_str)
        .collect();

    println!(
        "{} {}: {} functions, {} structs, entry point: {}, libraries: [{}]",
        "ok".green().bold(),
        source.name,
        program.user_functions().count(),
        program.structs.len(),
        if program.has_program_entry { "main" } else { "none" },
        dependencies.join(", ")
    );
}
