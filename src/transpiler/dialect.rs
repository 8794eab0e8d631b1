use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CondError;

/// Supported SQL dialects.
///
/// A dialect decides how positional markers look and how the not-equal
/// comparison is spelled. Everything else in a condition fragment is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `?` markers, `!=`
    #[default]
    Generic,
    MySql,
    Postgres,
    Oracle,
    SqlServer,
    Sqlite,
    H2,
}

impl Dialect {
    pub const ALL: [Dialect; 7] = [
        Dialect::Generic,
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::Oracle,
        Dialect::SqlServer,
        Dialect::Sqlite,
        Dialect::H2,
    ];

    /// Positional marker for the bind value at `ordinal` (zero-based).
    pub fn marker(&self, ordinal: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", ordinal + 1),
            Dialect::Oracle => format!(":{}", ordinal + 1),
            Dialect::SqlServer => format!("@p{}", ordinal + 1),
            Dialect::Generic | Dialect::MySql | Dialect::Sqlite | Dialect::H2 => "?".to_string(),
        }
    }

    /// Default spelling of the not-equal comparison.
    pub fn not_equal(&self) -> &'static str {
        match self {
            Dialect::Oracle | Dialect::SqlServer => "<>",
            _ => "!=",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Oracle => "oracle",
            Dialect::SqlServer => "sqlserver",
            Dialect::Sqlite => "sqlite",
            Dialect::H2 => "h2",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = CondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Dialect::Generic),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "oracle" => Ok(Dialect::Oracle),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "sqlite" => Ok(Dialect::Sqlite),
            "h2" => Ok(Dialect::H2),
            other => Err(CondError::Config(format!("Unknown dialect: '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(Dialect::Generic.marker(0), "?");
        assert_eq!(Dialect::MySql.marker(3), "?");
        assert_eq!(Dialect::Postgres.marker(0), "$1");
        assert_eq!(Dialect::Oracle.marker(1), ":2");
        assert_eq!(Dialect::SqlServer.marker(2), "@p3");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mssql".parse::<Dialect>().unwrap(), Dialect::SqlServer);
        assert!("db2".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_name_round_trip() {
        for d in Dialect::ALL {
            assert_eq!(d.name().parse::<Dialect>().unwrap(), d);
        }
    }
}
