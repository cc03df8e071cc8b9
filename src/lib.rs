pub mod ast;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod scanner;

// Re-export error types for convenience
pub use error::{CompileError, GarudaError, RuntimeError};

use interpreter::Interpreter;
use parser::Parser;

/// Lex, parse and run `source` on a fresh interpreter that prints to stdout,
/// returning the printed lines.
pub fn run_source(source: &str) -> Result<Vec<String>, GarudaError> {
    run_with(Interpreter::new(), source)
}

/// Like [`run_source`], but on a caller-supplied interpreter.
pub fn run_with(mut interpreter: Interpreter, source: &str) -> Result<Vec<String>, GarudaError> {
    let tokens = scanner::scan(source).map_err(GarudaError::Lex)?;
    let program = Parser::new(tokens).parse().map_err(GarudaError::Parse)?;
    interpreter.interpret(&program)?;
    Ok(interpreter.output().to_vec())
}
