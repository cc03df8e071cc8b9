use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::scanner::token::Span;

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("lex error: {message}")]
    #[diagnostic(code(garuda::lex))]
    Lex {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("parse error: {message}")]
    #[diagnostic(code(garuda::parse))]
    Parse {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn lex(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Lex {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn parse(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Parse {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Self::Lex { span, .. } | Self::Parse { span, .. } => span.offset(),
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let src = miette::NamedSource::new(name.into(), source.into());
        match self {
            Self::Lex { message, span, .. } => Self::Lex { message, span, src },
            Self::Parse { message, span, .. } => Self::Parse { message, span, src },
        }
    }

    /// One-line rendering with the 1-based line and column of the error.
    pub fn display_with_line(&self, source: &str) -> String {
        let (line, column) = line_col(source, self.offset());
        format!("line {line}, column {column}: {self}")
    }
}

// ============= Runtime errors (simple, no miette) =============

#[derive(Error, Debug)]
#[error("Error: {message}")]
pub struct RuntimeError {
    pub message: String,
    pub span: Option<Span>,
}

impl RuntimeError {
    /// Create a simple runtime error without source location
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    /// Create a runtime error pointing at the node that failed
    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }

    /// Format error with line and column (requires source code)
    pub fn display_with_line(&self, source: &str) -> String {
        match self.span {
            Some(span) => {
                let (line, column) = line_col(source, span.offset);
                format!("Error: line {line}, column {column}: {}", self.message)
            }
            None => format!("Error: {}", self.message),
        }
    }
}

// ============= Whole-pipeline failures =============

/// A failure from any phase of a run, mapped to the process exit code the
/// command line reports for it.
#[derive(Error, Debug)]
pub enum GarudaError {
    #[error("{} lex error(s)", .0.len())]
    Lex(Vec<CompileError>),

    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<CompileError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl GarudaError {
    pub const EXIT_IO: u8 = 1;
    pub const EXIT_LEX: u8 = 2;
    pub const EXIT_PARSE: u8 = 3;
    pub const EXIT_RUNTIME: u8 = 4;

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Lex(_) => Self::EXIT_LEX,
            Self::Parse(_) => Self::EXIT_PARSE,
            Self::Runtime(_) => Self::EXIT_RUNTIME,
        }
    }
}

/// 1-based line and column (in characters) of a byte offset in source.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.chars().filter(|&c| c == '\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

// ============= Tests =============
