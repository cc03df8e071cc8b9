use std::fmt;

use crate::interpreter::callable::Callable;

/// A runtime value. There is no boolean or null: conditions test numbers
/// against zero, and "no value" is represented by `Option::None` at the
/// evaluator level rather than by a variant here.
#[derive(Clone, Debug)]
pub enum Value {
    Number(f64),
    Str(String),
    Function(Callable),
}

impl Value {
    /// Truthiness of a condition: a number is true when non-zero, a string
    /// always. Functions have no truth value.
    pub fn is_truthy(&self) -> Option<bool> {
        match self {
            Self::Number(n) => Some(*n != 0.0),
            Self::Str(_) => Some(true),
            Self::Function(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Function(_) => "function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64's Display already drops the fraction of whole numbers.
            Self::Number(n) if *n == 0.0 => write!(f, "0"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Function(func) => write!(f, "{func}"),
        }
    }
}
