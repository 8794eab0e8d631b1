use serde::{Deserialize, Serialize};

use crate::ast::{AttrType, CompareOp, MathOp, Value};

/// A node of a filter expression tree.
///
/// Trees are produced by the condition parser (or deserialized from JSON)
/// and are only ever read by the translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Conjunction (left AND right)
    And { left: Box<Expr>, right: Box<Expr> },
    /// Disjunction (left OR right)
    Or { left: Box<Expr>, right: Box<Expr> },
    /// Negation (NOT operand)
    Not { operand: Box<Expr> },
    /// Comparison (left op right)
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    /// Null check. Without an operand it checks a whole stream event.
    IsNull {
        #[serde(default)]
        operand: Option<Box<Expr>>,
        #[serde(default)]
        stream_id: Option<String>,
    },
    /// Membership test against another store
    In { operand: Box<Expr>, store_id: String },
    /// Arithmetic (left op right)
    Math {
        left: Box<Expr>,
        op: MathOp,
        right: Box<Expr>,
    },
    /// Literal constant with its declared type
    Constant { value: Value, ty: AttrType },
    /// Function call, optionally namespaced (`ns:name(...)`)
    Function {
        #[serde(default)]
        namespace: Option<String>,
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// Positional parameter of the enclosing query
    Parameter { index: usize, ty: AttrType },
    /// Attribute of the matching stream event
    StreamVariable {
        id: String,
        #[serde(default)]
        stream_id: Option<String>,
        attribute: String,
        ty: AttrType,
    },
    /// Column of the store being queried
    StoreVariable {
        #[serde(default)]
        store_id: Option<String>,
        attribute: String,
        ty: AttrType,
    },
}

impl Expr {
    /// Number of leaves that become bind values (constants, stream variables
    /// and parameters).
    pub fn bind_leaf_count(&self) -> usize {
        match self {
            Expr::And { left, right }
            | Expr::Or { left, right }
            | Expr::Compare { left, right, .. }
            | Expr::Math { left, right, .. } => left.bind_leaf_count() + right.bind_leaf_count(),
            Expr::Not { operand } | Expr::In { operand, .. } => operand.bind_leaf_count(),
            Expr::IsNull { operand, .. } => operand.as_ref().map_or(0, |e| e.bind_leaf_count()),
            Expr::Function { args, .. } => args.iter().map(Expr::bind_leaf_count).sum(),
            Expr::Constant { .. } | Expr::Parameter { .. } | Expr::StreamVariable { .. } => 1,
            Expr::StoreVariable { .. } => 0,
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::And { left, right } => write!(f, "({} and {})", left, right),
            Expr::Or { left, right } => write!(f, "({} or {})", left, right),
            Expr::Not { operand } => write!(f, "not {}", operand),
            Expr::Compare { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::IsNull { operand, stream_id } => match (operand, stream_id) {
                (Some(e), _) => write!(f, "{} is null", e),
                (None, Some(s)) => write!(f, "{} is null", s),
                (None, None) => write!(f, "is null"),
            },
            Expr::In { operand, store_id } => write!(f, "{} in {}", operand, store_id),
            Expr::Math { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Constant { value, .. } => write!(f, "{}", value),
            Expr::Function {
                namespace,
                name,
                args,
            } => {
                if let Some(ns) = namespace {
                    write!(f, "{}:", ns)?;
                }
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Parameter { index, ty } => write!(f, "${}:{}", index, ty),
            Expr::StreamVariable {
                stream_id,
                attribute,
                id,
                ..
            } => match stream_id {
                Some(s) => write!(f, "{}.{}", s, attribute),
                None => write!(f, "{}", id),
            },
            Expr::StoreVariable { attribute, .. } => write!(f, "{}", attribute),
        }
    }
}
