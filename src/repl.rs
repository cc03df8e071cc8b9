use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::scanner;
use crate::scanner::token::Keyword;

const PROMPT: &str = "> ";

/// Run the interactive REPL. Environment persists across lines.
pub fn run_repl() -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut interpreter = Interpreter::new();

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(e) => return Err(e),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        // Echo bare expressions by wrapping them in a print statement.
        let source = if is_bare_expression(trimmed) {
            format!("{}({trimmed})", Keyword::Print)
        } else {
            trimmed.to_string()
        };

        let tokens = match scanner::scan(&source) {
            Ok(t) => t,
            Err(errors) => {
                for e in &errors {
                    eprintln!("{}", e.display_with_line(&source));
                }
                continue;
            }
        };

        let program = match Parser::new(tokens).parse() {
            Ok(p) => p,
            Err(errors) => {
                for e in &errors {
                    eprintln!("{}", e.display_with_line(&source));
                }
                continue;
            }
        };

        if let Err(e) = interpreter.interpret(&program) {
            eprintln!("{}", e.display_with_line(&source));
        }
    }
    Ok(())
}

/// Heuristic: treat the line as a bare expression if it doesn't end with
/// ';' and doesn't start with a keyword that begins a statement.
fn is_bare_expression(line: &str) -> bool {
    if line.ends_with(';') {
        return false;
    }
    let first_word = line
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("");
    match scanner::unicode::normalize_name(first_word).parse::<Keyword>() {
        Ok(keyword) => !keyword.starts_statement(),
        Err(_) => true,
    }
}
