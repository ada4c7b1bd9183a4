use std::fmt;

use serde::{Deserialize, Serialize};

/// Animal emoji the default alphabet is drawn from.
pub const DEFAULT_EMOJI: [&str; 22] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐙", "🐵",
    "🦄", "🐞", "🦀", "🐟", "🐊", "🐓", "🦃",
];

/// Opaque face value of a card. Only equality matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub fn default_alphabet() -> Vec<Symbol> {
    DEFAULT_EMOJI.iter().copied().map(Symbol::from).collect()
}

/// Drops repeated symbols, keeping first occurrences in order.
pub fn distinct(alphabet: &[Symbol]) -> Vec<Symbol> {
    let mut out: Vec<Symbol> = Vec::with_capacity(alphabet.len());
    for symbol in alphabet {
        if !out.contains(symbol) {
            out.push(symbol.clone());
        }
    }
    out
}
