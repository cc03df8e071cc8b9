use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::scanner::token::Keyword;

/// Something a call expression can invoke.
#[derive(Debug, Clone)]
pub enum Callable {
    Builtin(Builtin),
    User(UserFunction),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(b) => b.name(),
            Self::User(u) => &u.declaration.name,
        }
    }

    /// Number of arguments expected, or `None` for variadic built-ins.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Builtin(_) => None,
            Self::User(u) => Some(u.declaration.params.len()),
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(_) => write!(f, "<builtin {}>", self.name()),
            Self::User(_) => write!(f, "<fn {}>", self.name()),
        }
    }
}

/// A user-defined function. It does not capture an environment: each call
/// runs against a copy of the caller's environment.
#[derive(Debug, Clone)]
pub struct UserFunction {
    pub declaration: Rc<FunctionDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Print => Keyword::Print.into(),
        }
    }
}
