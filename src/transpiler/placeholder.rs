//! Placeholder tokens and the values they stand in for.

use serde::{Deserialize, Serialize};

use crate::ast::{AttrType, Value};

/// Temporary identifier for a bind value inside one translation.
///
/// Replaced by the dialect's positional marker when the translator is
/// finalized, so its spelling never reaches the executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Hands out tokens from two independent counters, one for constants and
/// one for variable references. Both start at zero for every translator.
#[derive(Debug, Default)]
pub struct TokenAllocator {
    constants: usize,
    variables: usize,
}

impl TokenAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_constant(&mut self) -> Token {
        let token = Token(format!("const{}", self.constants));
        self.constants += 1;
        token
    }

    pub fn next_variable(&mut self) -> Token {
        let token = Token(format!("strVar{}", self.variables));
        self.variables += 1;
        token
    }

    /// Number of constant tokens allocated so far.
    pub fn constants(&self) -> usize {
        self.constants
    }

    /// Number of variable tokens allocated so far.
    pub fn variables(&self) -> usize {
        self.variables
    }
}

/// Where a variable bind value comes from at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarSource {
    /// Attribute of the matching stream event, by attribute id.
    Stream(String),
    /// Positional parameter of the enclosing query.
    Parameter(usize),
}

impl std::fmt::Display for VarSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarSource::Stream(id) => write!(f, "{}", id),
            VarSource::Parameter(index) => write!(f, "${}", index),
        }
    }
}

/// A value to bind at a positional marker.
///
/// The declared type is carried as-is; the translator never converts values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundValue {
    Constant { value: Value, ty: AttrType },
    Variable { source: VarSource, ty: AttrType },
}

impl BoundValue {
    pub fn ty(&self) -> AttrType {
        match self {
            BoundValue::Constant { ty, .. } | BoundValue::Variable { ty, .. } => *ty,
        }
    }
}

impl std::fmt::Display for BoundValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundValue::Constant { value, ty } => write!(f, "{} ({})", value, ty),
            BoundValue::Variable { source, ty } => write!(f, "{} ({})", source, ty),
        }
    }
}

/// One piece of the working buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder(Token),
}
