//! Error types for condsql.

use thiserror::Error;

/// The main error type for condition translation.
#[derive(Debug, Error)]
pub enum CondError {
    /// The target dialect cannot express the requested construct.
    #[error(
        "Unsupported feature: function namespaces are not supported, but namespace '{namespace}' was specified for '{function}'"
    )]
    UnsupportedFeature { namespace: String, function: String },

    /// Translator state is inconsistent. Indicates a bug, not bad input.
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    /// Failed to parse the condition string.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON expression tree.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CondError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an internal consistency error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalConsistency(message.into())
    }

    /// Create an unsupported namespaced-function error.
    pub fn unsupported_namespace(namespace: &str, function: &str) -> Self {
        Self::UnsupportedFeature {
            namespace: namespace.to_string(),
            function: function.to_string(),
        }
    }
}

/// Result type alias for condsql operations.
pub type CondResult<T> = Result<T, CondError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CondError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_unsupported_display() {
        let err = CondError::unsupported_namespace("str", "concat");
        assert_eq!(
            err.to_string(),
            "Unsupported feature: function namespaces are not supported, but namespace 'str' was specified for 'concat'"
        );
    }
}
