//! Condition translator.
//!
//! Walks an expression tree and emits a parametrized SQL condition fragment.
//! Every binary construct is wrapped in parentheses, so the fragment keeps the
//! grouping of the tree regardless of SQL operator precedence.
//!
//! Leaf values become placeholder tokens while walking. [`Translator::finalize`]
//! swaps them for the dialect's positional markers, numbering them in the
//! order they appear in the text.

pub mod dialect;
pub mod placeholder;
pub mod reconcile;


use std::collections::HashMap;

use crate::ast::Expr;
use crate::config::QueryConfig;
use crate::error::{CondError, CondResult};

pub use self::dialect::Dialect;
pub use self::placeholder::{BoundValue, Segment, Token, TokenAllocator, VarSource};
pub use self::reconcile::{Fragment, Parameters};

const SQL_AND: &str = "AND";
const SQL_OR: &str = "OR";
const SQL_NOT: &str = "NOT";
const SQL_IN: &str = "IN";
const SQL_IS_NULL: &str = "IS NULL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Failed,
    Finalized,
}

/// Stateful translator for a single condition.
///
/// Create one per condition, feed it the tree with [`visit`](Self::visit),
/// then call [`finalize`](Self::finalize) exactly once.
#[derive(Debug)]
pub struct Translator<'a> {
    config: &'a QueryConfig,
    buffer: Vec<Segment>,
    pending: HashMap<Token, BoundValue>,
    tokens: TokenAllocator,
    state: State,
}

impl<'a> Translator<'a> {
    pub fn new(config: &'a QueryConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            pending: HashMap::new(),
            tokens: TokenAllocator::new(),
            state: State::Open,
        }
    }

    /// Append the translation of `expr` to the fragment.
    ///
    /// A failure poisons the translator: no fragment can be produced from it
    /// afterwards.
    pub fn visit(&mut self, expr: &Expr) -> CondResult<()> {
        self.ensure_open("visit")?;
        let result = self.walk(expr);
        if result.is_err() {
            self.state = State::Failed;
        }
        result
    }

    /// Resolve placeholders and return the finished fragment.
    ///
    /// Must be called once. Later calls fail with
    /// [`CondError::InternalConsistency`] instead of renumbering markers that
    /// were already substituted.
    pub fn finalize(&mut self) -> CondResult<Fragment> {
        self.ensure_open("finalize")?;
        self.state = State::Finalized;
        let fragment = reconcile::reconcile(&self.buffer, &self.pending, self.config.dialect)?;
        tracing::debug!(
            "Translated condition ({}): {} constants, {} variables, {} parameters",
            self.config.dialect,
            self.tokens.constants(),
            self.tokens.variables(),
            fragment.parameters().len()
        );
        Ok(fragment)
    }

    /// Placeholder tokens allocated so far, constants and variables combined.
    pub fn placeholder_count(&self) -> usize {
        self.pending.len()
    }

    fn ensure_open(&self, op: &str) -> CondResult<()> {
        match self.state {
            State::Open => Ok(()),
            State::Finalized => {
                tracing::error!("{} called on a finalized translator", op);
                Err(CondError::internal(format!(
                    "{} called on a translator that was already finalized",
                    op
                )))
            }
            State::Failed => {
                tracing::error!("{} called on a failed translator", op);
                Err(CondError::internal(format!(
                    "{} called on a translator whose translation was aborted",
                    op
                )))
            }
        }
    }

    fn walk(&mut self, expr: &Expr) -> CondResult<()> {
        match expr {
            Expr::And { left, right } => self.binary(left, SQL_AND, right, false),
            Expr::Or { left, right } => self.binary(left, SQL_OR, right, false),
            Expr::Not { operand } => {
                self.keyword(SQL_NOT);
                self.walk(operand)
            }
            Expr::Compare { left, op, right } => {
                let config = self.config;
                self.binary(left, config.compare_symbol(*op), right, true)
            }
            Expr::IsNull { operand, .. } => {
                if let Some(operand) = operand {
                    self.operand(operand, true)?;
                }
                self.keyword(SQL_IS_NULL);
                Ok(())
            }
            Expr::In { operand, .. } => {
                self.keyword(SQL_IN);
                self.walk(operand)
            }
            Expr::Math { left, op, right } => self.binary(left, op.symbol(), right, true),
            Expr::Constant { value, ty } => {
                let token = self.tokens.next_constant();
                self.bind(
                    token,
                    BoundValue::Constant {
                        value: value.clone(),
                        ty: *ty,
                    },
                );
                Ok(())
            }
            Expr::Parameter { index, ty } => {
                let token = self.tokens.next_variable();
                self.bind(
                    token,
                    BoundValue::Variable {
                        source: VarSource::Parameter(*index),
                        ty: *ty,
                    },
                );
                Ok(())
            }
            Expr::StreamVariable { id, ty, .. } => {
                let token = self.tokens.next_variable();
                self.bind(
                    token,
                    BoundValue::Variable {
                        source: VarSource::Stream(id.clone()),
                        ty: *ty,
                    },
                );
                Ok(())
            }
            Expr::StoreVariable { attribute, .. } => {
                let column = format!("{}.{}", self.config.table_alias, attribute);
                self.keyword(&column);
                Ok(())
            }
            Expr::Function {
                namespace,
                name,
                args,
            } => {
                if let Some(ns) = namespace.as_deref().filter(|ns| !ns.is_empty()) {
                    tracing::warn!("Rejecting namespaced function {}:{}", ns, name);
                    return Err(CondError::unsupported_namespace(ns, name));
                }
                self.keyword(name);
                self.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.walk(arg)?;
                }
                self.push(") ");
                Ok(())
            }
        }
    }

    /// `(` left `op ` right `)`. The operator lands after the left operand's
    /// text and before anything from the right operand.
    fn binary(&mut self, left: &Expr, op: &str, right: &Expr, group: bool) -> CondResult<()> {
        self.push("(");
        self.operand(left, group)?;
        self.keyword(op);
        self.operand(right, group)?;
        self.push(")");
        Ok(())
    }

    /// Walk `expr`, wrapping it in parentheses when `group` is set and it
    /// renders without its own (`NOT`, `IS NULL` and `IN`). SQL binds those
    /// looser than comparison and arithmetic.
    fn operand(&mut self, expr: &Expr, group: bool) -> CondResult<()> {
        let bare = matches!(expr, Expr::Not { .. } | Expr::IsNull { .. } | Expr::In { .. });
        if group && bare {
            self.push("(");
            self.walk(expr)?;
            self.push(")");
            Ok(())
        } else {
            self.walk(expr)
        }
    }

    fn keyword(&mut self, word: &str) {
        self.push(word);
        self.push(" ");
    }

    fn push(&mut self, text: &str) {
        if let Some(Segment::Literal(last)) = self.buffer.last_mut() {
            last.push_str(text);
        } else {
            self.buffer.push(Segment::Literal(text.to_string()));
        }
    }

    fn bind(&mut self, token: Token, value: BoundValue) {
        tracing::trace!("Allocated placeholder {} for {}", token, value);
        self.buffer.push(Segment::Placeholder(token.clone()));
        self.pending.insert(token, value);
        self.push(" ");
    }
}

/// Translate a condition tree into a fragment and its ordered bind values.
///
/// # Example
///
/// ```
/// use condsql::ast::builders::*;
/// use condsql::{translate, QueryConfig};
///
/// let cond = gt(column("price"), constant(100));
/// let fragment = translate(&cond, &QueryConfig::default()).unwrap();
/// assert_eq!(fragment.text(), "(t.price > ? )");
/// assert_eq!(fragment.parameters().len(), 1);
/// ```
pub fn translate(root: &Expr, config: &QueryConfig) -> CondResult<Fragment> {
    tracing::debug!("Translating condition for {}: {}", config.dialect, root);
    let mut translator = Translator::new(config);
    translator.visit(root)?;
    translator.finalize()
}
