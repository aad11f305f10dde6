//! Target database dialects.
//!
//! The dialect decides how generated insert code retrieves the new primary
//! key and how generated SQL spells parameters, pagination and existence
//! checks.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Database dialect selected per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL / MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// Oracle Database.
    Oracle,
}

/// How generated insert code obtains the generated primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRetrieval {
    /// The insert statement returns the key as its scalar result.
    ScalarResult,
    /// The key is bound as an output parameter before execution.
    OutputParameter,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Self::MySql, Self::Postgres, Self::Oracle];

    /// Canonical document token.
    pub fn token(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Oracle => "oracle",
        }
    }

    /// Insert key retrieval strategy.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudgen_core::{Dialect, KeyRetrieval};
    ///
    /// assert_eq!(Dialect::MySql.key_retrieval(), KeyRetrieval::ScalarResult);
    /// assert_eq!(Dialect::Oracle.key_retrieval(), KeyRetrieval::OutputParameter);
    /// ```
    pub fn key_retrieval(self) -> KeyRetrieval {
        match self {
            Self::MySql | Self::Postgres => KeyRetrieval::ScalarResult,
            Self::Oracle => KeyRetrieval::OutputParameter,
        }
    }

    /// Bind-parameter prefix in SQL text.
    pub fn parameter_prefix(self) -> char {
        match self {
            Self::MySql | Self::Postgres => '@',
            Self::Oracle => ':',
        }
    }

    /// Renders a bound parameter reference (`@EMAIL`, `:EMAIL`).
    pub fn parameter(self, name: &str) -> String {
        format!("{}{name}", self.parameter_prefix())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "oracle" => Ok(Self::Oracle),
            _ => Err(ConfigError::UnsupportedDialect(token.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
