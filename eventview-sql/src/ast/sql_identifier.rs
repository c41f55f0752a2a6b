use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Dialect, DialectDisplay, FromDialect, fmt::fmt_with};

/// A single SQL identifier, such as a table name, an alias or a column name.
///
/// The identifier keeps its text exactly as written, and remembers whether it was delimited so
/// that it is displayed the same way it was parsed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SqlIdentifier {
    pub value: String,
    pub quoted: bool,
}

impl SqlIdentifier {
    /// Construct an identifier that is displayed without delimiters
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    /// Construct an identifier that is always displayed delimited
    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Compare against a name the way the database resolves identifiers: delimited identifiers
    /// match exactly, bare ones match case-insensitively.
    pub fn matches(&self, name: &str) -> bool {
        if self.quoted {
            self.value == name
        } else {
            self.value.eq_ignore_ascii_case(name)
        }
    }
}

impl From<&str> for SqlIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SqlIdentifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl FromDialect<sqlparser::ast::Ident> for SqlIdentifier {
    fn from_dialect(value: sqlparser::ast::Ident, _dialect: Dialect) -> Self {
        Self {
            value: value.value,
            quoted: value.quote_style.is_some(),
        }
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl DialectDisplay for SqlIdentifier {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            if self.quoted {
                write!(f, "{}", dialect.quote_identifier(&self.value))
            } else {
                f.write_str(&self.value)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifiers_match_case_insensitively() {
        assert!(SqlIdentifier::new("Events").matches("events"));
        assert!(!SqlIdentifier::quoted("Events").matches("events"));
        assert!(SqlIdentifier::quoted("events").matches("events"));
    }

    #[test]
    fn display_keeps_delimiters() {
        assert_eq!(
            SqlIdentifier::quoted("my table")
                .display(Dialect::MySQL)
                .to_string(),
            "`my table`"
        );
        assert_eq!(
            SqlIdentifier::new("e").display(Dialect::Trino).to_string(),
            "e"
        );
    }
}
