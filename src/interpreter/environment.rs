use std::collections::HashMap;

use crate::interpreter::value::Value;
use crate::scanner::unicode::normalize_name;

/// The single flat name table of an interpreter. Names are stored and looked
/// up in NFC form, so canonically equivalent spellings share one slot.
///
/// `Clone` is the snapshot half of a user function call; the interpreter
/// swaps the clone back in when the call ends.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite `name`.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(normalize_name(name).into_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(normalize_name(name).as_ref()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(normalize_name(name).as_ref())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
