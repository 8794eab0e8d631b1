//! Post-traversal pass that fixes bind-value ordinals.
//!
//! Tokens are allocated in visitation order, but the executor binds values
//! in the order their markers appear in the text. Ordinals are therefore
//! assigned here, by walking the finished buffer left to right.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{CondError, CondResult};
use crate::transpiler::dialect::Dialect;
use crate::transpiler::placeholder::{BoundValue, Segment, Token};

/// Bind values indexed by ordinal. Ordinal `n` belongs to the `n`-th
/// positional marker in the fragment text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters(Vec<BoundValue>);

impl Parameters {
    pub fn get(&self, ordinal: usize) -> Option<&BoundValue> {
        self.0.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(ordinal, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BoundValue)> {
        self.0.iter().enumerate()
    }

    pub fn values(&self) -> &[BoundValue] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<BoundValue> {
        self.0
    }
}

/// A translated condition: fragment text plus ordered bind values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    sql: String,
    parameters: Parameters,
}

impl Fragment {
    pub fn text(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn into_parts(self) -> (String, Parameters) {
        (self.sql, self.parameters)
    }
}

/// Resolve placeholders in `buffer` to `dialect` markers.
///
/// Fails if the buffer and `pending` disagree about which tokens exist.
pub fn reconcile(
    buffer: &[Segment],
    pending: &HashMap<Token, BoundValue>,
    dialect: Dialect,
) -> CondResult<Fragment> {
    let mut sql = String::new();
    let mut params = Vec::with_capacity(pending.len());
    let mut seen: HashSet<&Token> = HashSet::with_capacity(pending.len());

    for segment in buffer {
        match segment {
            Segment::Literal(text) => sql.push_str(text),
            Segment::Placeholder(token) => {
                let Some(value) = pending.get(token) else {
                    tracing::error!("Placeholder {} has no bound value", token);
                    return Err(CondError::internal(format!(
                        "placeholder {} appears in the fragment but has no bound value",
                        token
                    )));
                };
                if !seen.insert(token) {
                    tracing::error!("Placeholder {} emitted twice", token);
                    return Err(CondError::internal(format!(
                        "placeholder {} appears more than once in the fragment",
                        token
                    )));
                }
                sql.push_str(&dialect.marker(params.len()));
                params.push(value.clone());
            }
        }
    }

    if seen.len() != pending.len() {
        let mut missing: Vec<&Token> = pending.keys().filter(|t| !seen.contains(t)).collect();
        missing.sort();
        let names: Vec<String> = missing.iter().map(|t| t.to_string()).collect();
        tracing::error!("Bound values never emitted: {}", names.join(", "));
        return Err(CondError::internal(format!(
            "bound values without a placeholder in the fragment: {}",
            names.join(", ")
        )));
    }

    Ok(Fragment {
        sql: sql.trim().to_string(),
        parameters: Parameters(params),
    })
}
