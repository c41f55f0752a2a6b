use std::fmt;

use itertools::Itertools;

use crate::Dialect;
use crate::fmt::fmt_with;

/// Display a syntax tree node as SQL text in a given [`Dialect`].
///
/// Implementations must produce text that the same dialect parses back into an equal node.
pub trait DialectDisplay {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_;
}

/// Displays each element of a slice separated by `, `
#[derive(Debug)]
pub struct CommaSeparatedList<'a, T: DialectDisplay>(&'a [T]);

impl<'a, T> From<&'a [T]> for CommaSeparatedList<'a, T>
where
    T: DialectDisplay,
{
    fn from(value: &'a [T]) -> Self {
        CommaSeparatedList(value)
    }
}

impl<'a, T> From<&'a Vec<T>> for CommaSeparatedList<'a, T>
where
    T: DialectDisplay,
{
    fn from(value: &'a Vec<T>) -> Self {
        CommaSeparatedList(value.as_slice())
    }
}

impl<T> DialectDisplay for CommaSeparatedList<'_, T>
where
    T: DialectDisplay,
{
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(
                f,
                "{}",
                self.0.iter().map(|i| i.display(dialect)).join(", ")
            )
        })
    }
}

impl<T> DialectDisplay for Vec<T>
where
    T: DialectDisplay,
{
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        CommaSeparatedList::from(self).display(dialect).to_string()
    }
}

impl<T> DialectDisplay for Box<T>
where
    T: DialectDisplay,
{
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        self.as_ref().display(dialect)
    }
}
