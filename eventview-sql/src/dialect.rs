use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fmt_args;

/// SQL dialect used both to parse queries and to display them again.
///
/// Dialect controls the quoting character used for delimited identifiers and which `sqlparser`
/// grammar is used for parsing.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, ValueEnum)]
#[value(rename_all = "lower")]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// The dialect spoken by Trino/Presto, which is what the event views are queried with.
    ///
    /// Identifiers are escaped with double quotes (`"`) and strings use single quotes (`'`)
    #[default]
    #[value(alias("presto"))]
    Trino,

    /// The SQL dialect used by PostgreSQL.
    ///
    /// Identifiers are escaped with double quotes (`"`) and strings use single quotes (`'`)
    #[value(alias("postgres"))]
    PostgreSQL,

    /// The SQL dialect used by MySQL.
    ///
    /// Identifiers are escaped with backticks (`` ` ``)
    MySQL,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("Unknown dialect `{0}`, expected one of trino, postgresql or mysql")]
pub struct UnknownDialect(String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trino" | "presto" => Ok(Dialect::Trino),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSQL),
            "mysql" => Ok(Dialect::MySQL),
            _ => Err(UnknownDialect(s.to_owned())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Trino => write!(f, "trino"),
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
        }
    }
}

impl Dialect {
    /// All SQL dialects.
    pub const ALL: &'static [Self] = &[Self::Trino, Self::PostgreSQL, Self::MySQL];

    /// Returns the table/column identifier quoting character for this dialect.
    pub fn quote_identifier_char(self) -> char {
        match self {
            Self::Trino | Self::PostgreSQL => '"',
            Self::MySQL => '`',
        }
    }

    /// Quotes the table/column identifier appropriately for this dialect.
    pub fn quote_identifier(self, ident: impl fmt::Display) -> impl fmt::Display {
        let quote = self.quote_identifier_char();
        fmt_args!(
            "{quote}{}{quote}",
            ident.to_string().replace(quote, &format!("{quote}{quote}"))
        )
    }

    /// The `sqlparser` grammar used to parse queries in this dialect.
    pub fn sqlparser_dialect(self) -> Box<dyn sqlparser::dialect::Dialect> {
        match self {
            Self::Trino => Box::new(sqlparser::dialect::GenericDialect {}),
            Self::PostgreSQL => Box::new(sqlparser::dialect::PostgreSqlDialect {}),
            Self::MySQL => Box::new(sqlparser::dialect::MySqlDialect {}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dialect_names() {
        assert_eq!("Trino".parse::<Dialect>(), Ok(Dialect::Trino));
        assert_eq!("postgres".parse::<Dialect>(), Ok(Dialect::PostgreSQL));
        assert_eq!("MYSQL".parse::<Dialect>(), Ok(Dialect::MySQL));
        assert!("sqlite".parse::<Dialect>().is_err());
    }

    #[test]
    fn quote_identifier_escapes_quote_char() {
        assert_eq!(
            Dialect::Trino.quote_identifier("we\"ird").to_string(),
            "\"we\"\"ird\""
        );
        assert_eq!(Dialect::MySQL.quote_identifier("t").to_string(), "`t`");
    }
}
