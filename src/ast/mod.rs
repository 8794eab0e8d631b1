pub mod builders;
pub mod expr;
pub mod operators;
pub mod values;

pub use self::expr::Expr;
pub use self::operators::{CompareOp, MathOp};
pub use self::values::{AttrType, Value};
