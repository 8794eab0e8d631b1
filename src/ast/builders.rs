//! Builder functions for expression trees.
//!
//! Shorthand for constructing [`Expr`] nodes without spelling out boxes and
//! struct variants.
//!
//! # Example
//! ```
//! use condsql::ast::builders::*;
//!
//! // price > 100 and symbol = 'IBM'
//! let cond = and(gt(column("price"), constant(100)), eq(column("symbol"), constant("IBM")));
//! assert_eq!(cond.bind_leaf_count(), 2);
//! ```

use crate::ast::{AttrType, CompareOp, Expr, MathOp, Value};

/// Store column reference with an untyped (`OBJECT`) declaration.
pub fn column(name: &str) -> Expr {
    typed_column(name, AttrType::Object)
}

/// Store column reference with a declared type.
pub fn typed_column(name: &str, ty: AttrType) -> Expr {
    Expr::StoreVariable {
        store_id: None,
        attribute: name.to_string(),
        ty,
    }
}

/// Constant typed by the shape of the value.
pub fn constant(value: impl Into<Value>) -> Expr {
    let value = value.into();
    let ty = value.natural_type();
    Expr::Constant { value, ty }
}

/// Constant with an explicit declared type.
pub fn typed_constant(value: impl Into<Value>, ty: AttrType) -> Expr {
    Expr::Constant {
        value: value.into(),
        ty,
    }
}

/// Stream attribute reference (`Stream.attr`).
pub fn stream_var(stream: &str, attribute: &str, ty: AttrType) -> Expr {
    Expr::StreamVariable {
        id: format!("{}.{}", stream, attribute),
        stream_id: Some(stream.to_string()),
        attribute: attribute.to_string(),
        ty,
    }
}

/// Positional query parameter reference.
pub fn param(index: usize, ty: AttrType) -> Expr {
    Expr::Parameter { index, ty }
}

pub fn and(left: Expr, right: Expr) -> Expr {
    Expr::And {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn or(left: Expr, right: Expr) -> Expr {
    Expr::Or {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn not(operand: Expr) -> Expr {
    Expr::Not {
        operand: Box::new(operand),
    }
}

/// Comparison with an arbitrary operator.
pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Expr {
    Expr::Compare {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    compare(left, CompareOp::Eq, right)
}

pub fn ne(left: Expr, right: Expr) -> Expr {
    compare(left, CompareOp::Ne, right)
}

pub fn gt(left: Expr, right: Expr) -> Expr {
    compare(left, CompareOp::Gt, right)
}

pub fn gte(left: Expr, right: Expr) -> Expr {
    compare(left, CompareOp::Gte, right)
}

pub fn lt(left: Expr, right: Expr) -> Expr {
    compare(left, CompareOp::Lt, right)
}

pub fn lte(left: Expr, right: Expr) -> Expr {
    compare(left, CompareOp::Lte, right)
}

/// Arithmetic with an arbitrary operator.
pub fn math(left: Expr, op: MathOp, right: Expr) -> Expr {
    Expr::Math {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn is_null(operand: Expr) -> Expr {
    Expr::IsNull {
        operand: Some(Box::new(operand)),
        stream_id: None,
    }
}

/// Membership test of `operand` against the rows of `store`.
pub fn is_in(operand: Expr, store: &str) -> Expr {
    Expr::In {
        operand: Box::new(operand),
        store_id: store.to_string(),
    }
}

/// Plain function call.
pub fn call(name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Function {
        namespace: None,
        name: name.to_string(),
        args: args.into_iter().collect(),
    }
}

/// Namespaced function call (`ns:name(...)`).
pub fn ns_call(namespace: &str, name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Function {
        namespace: Some(namespace.to_string()),
        name: name.to_string(),
        args: args.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_natural_type() {
        assert_eq!(
            constant(5),
            Expr::Constant {
                value: Value::Int(5),
                ty: AttrType::Int
            }
        );
        assert_eq!(
            constant("x"),
            Expr::Constant {
                value: Value::String("x".to_string()),
                ty: AttrType::String
            }
        );
    }

    #[test]
    fn test_bind_leaf_count() {
        let e = or(
            and(eq(column("a"), constant(5)), eq(column("b"), constant("x"))),
            eq(stream_var("S", "c", AttrType::Int), param(0, AttrType::Int)),
        );
        assert_eq!(e.bind_leaf_count(), 4);
        assert_eq!(is_null(column("a")).bind_leaf_count(), 0);
    }

    #[test]
    fn test_display() {
        let e = and(gt(column("price"), constant(100)), not(is_null(column("sym"))));
        assert_eq!(e.to_string(), "((price > 100) and not sym is null)");
    }
}
