//! Query configuration for condition translation.
//!
//! Configuration is a small TOML document:
//!
//! ```toml
//! dialect = "postgres"
//! table_alias = "t"
//! not_equal = "<>"
//! ```
//!
//! Every key is optional. Missing keys fall back to the dialect defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ast::CompareOp;
use crate::error::{CondError, CondResult};
use crate::transpiler::dialect::Dialect;

/// Alias used for store column references when none is configured.
pub const DEFAULT_TABLE_ALIAS: &str = "t";

/// Per-request translation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Target dialect.
    pub dialect: Dialect,
    /// Alias prefixed to every store column (`<alias>.<column>`).
    pub table_alias: String,
    /// Overrides the dialect's not-equal spelling (`!=` or `<>`).
    pub not_equal: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::for_dialect(Dialect::default())
    }
}

impl QueryConfig {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            table_alias: DEFAULT_TABLE_ALIAS.to_string(),
            not_equal: None,
        }
    }

    pub fn with_table_alias(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = alias.into();
        self
    }

    pub fn with_not_equal(mut self, op: impl Into<String>) -> Self {
        self.not_equal = Some(op.into());
        self
    }

    /// Operator text for a comparison.
    pub fn compare_symbol(&self, op: CompareOp) -> &str {
        match op {
            CompareOp::Eq => "=",
            CompareOp::Ne => self
                .not_equal
                .as_deref()
                .unwrap_or_else(|| self.dialect.not_equal()),
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// Check the settings that would otherwise produce broken fragments.
    pub fn validate(&self) -> CondResult<()> {
        if self.table_alias.is_empty()
            || !self
                .table_alias
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(CondError::Config(format!(
                "Invalid table alias: '{}'",
                self.table_alias
            )));
        }
        if let Some(op) = &self.not_equal
            && op != "!="
            && op != "<>"
        {
            return Err(CondError::Config(format!(
                "Invalid not_equal operator: '{}'. Expected '!=' or '<>'",
                op
            )));
        }
        Ok(())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> CondResult<Self> {
        let config: QueryConfig =
            toml::from_str(content).map_err(|e| CondError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> CondResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded query config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// `<config dir>/condsql/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("condsql").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.dialect, Dialect::Generic);
        assert_eq!(config.table_alias, "t");
        assert_eq!(config.compare_symbol(CompareOp::Ne), "!=");
    }

    #[test]
    fn test_from_toml() {
        let config = QueryConfig::from_toml_str(
            r#"
            dialect = "postgres"
            table_alias = "orders"
            not_equal = "<>"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.table_alias, "orders");
        assert_eq!(config.compare_symbol(CompareOp::Ne), "<>");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = QueryConfig::from_toml_str(r#"dialect = "sqlserver""#).unwrap();
        assert_eq!(config.table_alias, DEFAULT_TABLE_ALIAS);
        assert_eq!(config.compare_symbol(CompareOp::Ne), "<>");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            QueryConfig::from_toml_str(r#"dialect = "db2""#),
            Err(CondError::Config(_))
        ));
        assert!(matches!(
            QueryConfig::from_toml_str(r#"not_equal = "=/=""#),
            Err(CondError::Config(_))
        ));
        assert!(matches!(
            QueryConfig::from_toml_str(r#"table_alias = "a b""#),
            Err(CondError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = QueryConfig::load("/nonexistent/condsql.toml").unwrap_err();
        assert!(matches!(err, CondError::Io(_)));
    }
}
