use serde::{Deserialize, Serialize};

/// Declared type of an attribute or constant.
///
/// The translator never inspects it; it travels with the bound value so the
/// executor can pick a type-correct setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    String,
    Int,
    Long,
    Float,
    Double,
    Bool,
    #[default]
    Object,
}

impl AttrType {
    /// Parse a type name as written in conditions (`int`, `double`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(AttrType::String),
            "int" => Some(AttrType::Int),
            "long" => Some(AttrType::Long),
            "float" => Some(AttrType::Float),
            "double" => Some(AttrType::Double),
            "bool" => Some(AttrType::Bool),
            "object" => Some(AttrType::Object),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrType::String => write!(f, "STRING"),
            AttrType::Int => write!(f, "INT"),
            AttrType::Long => write!(f, "LONG"),
            AttrType::Float => write!(f, "FLOAT"),
            AttrType::Double => write!(f, "DOUBLE"),
            AttrType::Bool => write!(f, "BOOL"),
            AttrType::Object => write!(f, "OBJECT"),
        }
    }
}

/// A constant literal in a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String
    String(String),
}

impl Value {
    /// The type a constant of this shape is declared with when no type is given.
    pub fn natural_type(&self) -> AttrType {
        match self {
            Value::Null => AttrType::Object,
            Value::Bool(_) => AttrType::Bool,
            Value::Int(_) => AttrType::Int,
            Value::Long(_) => AttrType::Long,
            Value::Float(_) => AttrType::Float,
            Value::Double(_) => AttrType::Double,
            Value::String(_) => AttrType::String,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}L", n),
            Value::Float(n) => write!(f, "{}f", with_decimal_point(n.to_string())),
            Value::Double(n) => write!(f, "{}", with_decimal_point(n.to_string())),
            Value::String(s) => write!(f, "'{}'", s),
        }
    }
}

/// `2` becomes `2.0` so a floating-point value never reads back as an integer.
fn with_decimal_point(mut text: String) -> String {
    if !text.contains(['.', 'e', 'E']) && text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        text.push_str(".0");
    }
    text
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_numeric_type() {
        assert_eq!(Value::Int(2).to_string(), "2");
        assert_eq!(Value::Long(2).to_string(), "2L");
        assert_eq!(Value::Float(2.0).to_string(), "2.0f");
        assert_eq!(Value::Float(2.5).to_string(), "2.5f");
        assert_eq!(Value::Double(2.0).to_string(), "2.0");
        assert_eq!(Value::Double(-0.25).to_string(), "-0.25");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
    }
}
