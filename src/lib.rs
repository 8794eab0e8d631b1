//! # condsql — Condition Pushdown
//!
//! > **Filter trees in, parametrized SQL out.**
//!
//! condsql translates a boolean/arithmetic filter expression into a SQL
//! condition fragment with positional markers, plus the values to bind at
//! those markers in order.
//!
//! ## Quick Example
//!
//! ```rust
//! use condsql::prelude::*;
//!
//! let cond = condsql::parse("price > 100 and symbol == StockStream.symbol").unwrap();
//! let fragment = translate(&cond, &QueryConfig::for_dialect(Dialect::Postgres)).unwrap();
//!
//! assert_eq!(fragment.text(), "((t.price > $1 )AND (t.symbol = $2 ))");
//! assert_eq!(fragment.parameters().len(), 2);
//! ```
//!
//! ## Emission
//!
//! | Node          | Fragment                  |
//! |---------------|---------------------------|
//! | `a and b`     | `(a AND b)`               |
//! | `a or b`      | `(a OR b)`                |
//! | `not a`       | `NOT a`                   |
//! | `a > b`       | `(a > b)`                 |
//! | `a + b`       | `(a + b)`                 |
//! | `a is null`   | `a IS NULL`               |
//! | `a in Store`  | `IN a`                    |
//! | constant      | positional marker         |
//! | `S.attr`      | positional marker         |
//! | `$n`          | positional marker         |
//! | column        | `<alias>.<column>`        |
//! | `f(x)`        | `f (x)`                   |
//! | `ns:f(x)`     | rejected                  |

pub mod ast;
pub mod config;
pub mod error;
pub mod parser;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::QueryConfig;
    pub use crate::error::*;
    pub use crate::parser::parse;
    pub use crate::transpiler::{
        BoundValue, Dialect, Fragment, Parameters, Translator, VarSource, translate,
    };
}

pub use crate::config::QueryConfig;
pub use crate::transpiler::{Dialect, Fragment, translate};

/// Parse a condition string into an expression tree.
///
/// # Example
///
/// ```
/// use condsql::parse;
///
/// let expr = parse("volume >= 1000 or symbol is null").unwrap();
/// assert_eq!(expr.bind_leaf_count(), 1);
/// ```
pub fn parse(input: &str) -> Result<ast::Expr, error::CondError> {
    parser::parse(input)
}
