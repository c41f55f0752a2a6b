//! The SQL syntax tree consumed by the event view rewrite, along with its conversion from
//! `sqlparser` and its dialect-aware display.

/// Errors that can occur when converting a sqlparser-rs AST to an [`ast::SqlQuery`]
#[derive(Debug, thiserror::Error)]
pub enum AstConversionError {
    /// A conversion failed because an internal invariant was broken, or the sqlparser AST didn't
    /// look how we expected
    #[error("Conversion unexpectedly failed: {0}")]
    Failed(String),
    /// A conversion was not supported because the syntax tree cannot represent this construct
    #[error("Conversion not supported: {0}")]
    Unsupported(String),
}

macro_rules! ast_conversion_err {
    ($kind:ident, $e:expr) => {
        $crate::AstConversionError::$kind(format!(
            "at {}:{}:{}: {}",
            std::file!(),
            std::line!(),
            std::column!(),
            $e
        ))
    };
}

macro_rules! failed_err {
    ($($format_args:tt)*) => {
        ast_conversion_err!(Failed, format!($($format_args)*))
    };
}

macro_rules! failed {
    ($($format_args:tt)*) => {
        Err(failed_err!($($format_args)*))
    };
}

macro_rules! unsupported_err {
    ($($format_args:tt)*) => {
        ast_conversion_err!(Unsupported, format!($($format_args)*))
    };
}

macro_rules! unsupported {
    ($($format_args:tt)*) => {
        Err(unsupported_err!($($format_args)*))
    };
}

pub mod analysis;
pub mod ast;
pub mod dialect;
pub mod dialect_display;
pub mod fmt;

pub use dialect::Dialect;
pub use dialect_display::DialectDisplay;

pub trait TryFromDialect<T>: Sized {
    fn try_from_dialect(value: T, dialect: Dialect) -> Result<Self, AstConversionError>;
}

pub trait TryIntoDialect<T>: Sized {
    fn try_into_dialect(self, dialect: Dialect) -> Result<T, AstConversionError>;
}

impl<T, U> TryIntoDialect<U> for T
where
    U: TryFromDialect<T>,
{
    #[inline]
    fn try_into_dialect(self, dialect: Dialect) -> Result<U, AstConversionError> {
        U::try_from_dialect(self, dialect)
    }
}

pub trait FromDialect<T> {
    fn from_dialect(value: T, dialect: Dialect) -> Self;
}

pub trait IntoDialect<T>: Sized {
    #[must_use]
    fn into_dialect(self, dialect: Dialect) -> T;
}

impl<T, U> IntoDialect<U> for T
where
    U: FromDialect<T>,
{
    #[inline]
    fn into_dialect(self, dialect: Dialect) -> U {
        U::from_dialect(self, dialect)
    }
}

impl<T, U> TryFromDialect<Vec<T>> for Vec<U>
where
    U: TryFromDialect<T>,
{
    fn try_from_dialect(value: Vec<T>, dialect: Dialect) -> Result<Self, AstConversionError> {
        value
            .into_iter()
            .map(|v| v.try_into_dialect(dialect))
            .collect()
    }
}

impl<T, U> TryFromDialect<Option<T>> for Option<U>
where
    U: TryFromDialect<T>,
{
    fn try_from_dialect(value: Option<T>, dialect: Dialect) -> Result<Self, AstConversionError> {
        value.map(|v| v.try_into_dialect(dialect)).transpose()
    }
}

impl<T, U> TryFromDialect<Box<T>> for Box<U>
where
    U: TryFromDialect<T>,
{
    fn try_from_dialect(value: Box<T>, dialect: Dialect) -> Result<Self, AstConversionError> {
        Ok(Box::new((*value).try_into_dialect(dialect)?))
    }
}
