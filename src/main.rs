use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use garuda::ast::printer;
use garuda::error::GarudaError;
use garuda::interpreter::Interpreter;
use garuda::parser::Parser as GarudaParser;
use garuda::scanner;

#[derive(Parser, Debug)]
#[command(
    name = "garuda",
    about = "Interpreter for a small scripting language with Devanagari keywords"
)]
struct Cli {
    /// Source file to run
    file: Option<PathBuf>,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,

    /// Start an interactive session
    #[arg(long)]
    repl: bool,
}

fn read_source(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("read source file '{}'", path.display()))
}

/// Print a failed run's diagnostics to stderr.
fn report(failure: GarudaError, name: &str, source: &str) {
    match failure {
        GarudaError::Lex(errors) | GarudaError::Parse(errors) => {
            for e in errors {
                let report = miette::Report::new(e.with_source_code(name, source.to_string()));
                eprintln!("{report:?}");
            }
        }
        GarudaError::Runtime(e) => eprintln!("{}", e.display_with_line(source)),
    }
}

fn run_file(cli: &Cli, source: &str) -> Result<(), GarudaError> {
    let tokens = scanner::scan(source).map_err(GarudaError::Lex)?;

    if cli.dump_tokens {
        for token in &tokens {
            println!("{token}");
        }
        return Ok(());
    }

    let program = GarudaParser::new(tokens)
        .parse()
        .map_err(GarudaError::Parse)?;

    if cli.dump_ast {
        match cli.ast_format.as_str() {
            "json" => println!("{}", printer::to_json(&program)),
            _ => print!("{}", printer::to_sexp(&program)),
        }
        return Ok(());
    }

    Interpreter::new().interpret(&program)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if cli.repl {
        return match garuda::repl::run_repl() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("repl: {e}");
                ExitCode::from(GarudaError::EXIT_IO)
            }
        };
    }

    let Some(path) = cli.file.clone() else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    let source = match read_source(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(GarudaError::EXIT_IO);
        }
    };

    match run_file(&cli, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            let code = failure.exit_code();
            tracing::debug!(code, "run failed");
            report(failure, &path.display().to_string(), &source);
            ExitCode::from(code)
        }
    }
}
