use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AstConversionError, Dialect, DialectDisplay, fmt::fmt_with};

#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    /// Numeric literals which fit in an `i64`
    Integer(i64),
    /// Any other numeric literal, kept as written
    Number(String),
    String(String),
    /// A query parameter, such as `?` or `$1`
    Placeholder(String),
    /// A literal prefixed by its type, such as `DATE '2021-01-01'`
    Typed { data_type: String, value: String },
}

impl Literal {
    /// Returns the contents of a string literal
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl TryFrom<sqlparser::ast::Value> for Literal {
    type Error = AstConversionError;

    fn try_from(value: sqlparser::ast::Value) -> Result<Self, Self::Error> {
        use sqlparser::ast::Value;
        match value {
            Value::Null => Ok(Self::Null),
            Value::Boolean(b) => Ok(Self::Boolean(b)),
            Value::Number(s, _long) => match s.parse::<i64>() {
                Ok(i) => Ok(Self::Integer(i)),
                Err(_) => Ok(Self::Number(s)),
            },
            Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => Ok(Self::String(s)),
            Value::Placeholder(p) => Ok(Self::Placeholder(p)),
            _ => unsupported!("literal {value}"),
        }
    }
}

impl TryFrom<sqlparser::ast::ValueWithSpan> for Literal {
    type Error = AstConversionError;

    fn try_from(value: sqlparser::ast::ValueWithSpan) -> Result<Self, Self::Error> {
        value.value.try_into()
    }
}

/// Quotes `s` as a single-quoted string literal in `dialect`
pub(crate) fn quote_string(s: &str, dialect: Dialect) -> String {
    let escaped = s.replace('\'', "''");
    match dialect {
        // MySQL treats backslashes in string literals as escapes
        Dialect::MySQL => format!("'{}'", escaped.replace('\\', "\\\\")),
        Dialect::Trino | Dialect::PostgreSQL => format!("'{escaped}'"),
    }
}

impl DialectDisplay for Literal {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(true) => write!(f, "TRUE"),
            Literal::Boolean(false) => write!(f, "FALSE"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write!(f, "{}", quote_string(s, dialect)),
            Literal::Placeholder(p) => write!(f, "{p}"),
            Literal::Typed { data_type, value } => {
                write!(f, "{data_type} {}", quote_string(value, dialect))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_escapes_quotes() {
        assert_eq!(
            Literal::from("it's").display(Dialect::Trino).to_string(),
            "'it''s'"
        );
    }

    #[test]
    fn typed_literals_escape_backslashes_for_mysql() {
        let literal = Literal::Typed {
            data_type: "DATE".into(),
            value: "a\\b".into(),
        };
        assert_eq!(
            literal.display(Dialect::MySQL).to_string(),
            "DATE 'a\\\\b'"
        );
        assert_eq!(
            literal.display(Dialect::PostgreSQL).to_string(),
            "DATE 'a\\b'"
        );
    }

    #[test]
    fn numbers_that_overflow_stay_textual() {
        let literal = Literal::try_from(sqlparser::ast::Value::Number(
            "99999999999999999999".into(),
            false,
        ))
        .unwrap();
        assert_eq!(literal, Literal::Number("99999999999999999999".into()));
    }
}
