use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    AstConversionError, Dialect, DialectDisplay, TryFromDialect, TryIntoDialect, ast::*,
    fmt::fmt_with,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderType {
    OrderAscending,
    OrderDescending,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            OrderType::OrderAscending => write!(f, "ASC"),
            OrderType::OrderDescending => write!(f, "DESC"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NullOrder {
    NullsFirst,
    NullsLast,
}

impl fmt::Display for NullOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NullOrder::NullsFirst => write!(f, "NULLS FIRST"),
            NullOrder::NullsLast => write!(f, "NULLS LAST"),
        }
    }
}

/// One sort key of an `ORDER BY`.
///
/// Direction and null ordering stay `None` unless they were written out, so that the clause
/// displays the way it was parsed.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: Expr,
    pub order_type: Option<OrderType>,
    pub null_order: Option<NullOrder>,
}

impl TryFromDialect<sqlparser::ast::OrderByExpr> for OrderBy {
    fn try_from_dialect(
        value: sqlparser::ast::OrderByExpr,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        let sqlparser::ast::OrderByExpr {
            expr,
            options,
            with_fill,
        } = value;
        if with_fill.is_some() {
            return unsupported!("ORDER BY ... WITH FILL");
        }

        Ok(Self {
            field: expr.try_into_dialect(dialect)?,
            order_type: options.asc.map(|asc| {
                if asc {
                    OrderType::OrderAscending
                } else {
                    OrderType::OrderDescending
                }
            }),
            null_order: options.nulls_first.map(|first| {
                if first {
                    NullOrder::NullsFirst
                } else {
                    NullOrder::NullsLast
                }
            }),
        })
    }
}

impl DialectDisplay for OrderBy {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(f, "{}", self.field.display(dialect))?;
            if let Some(ot) = self.order_type {
                write!(f, " {ot}")?;
            }
            if let Some(no) = self.null_order {
                write!(f, " {no}")?;
            }
            Ok(())
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderClause {
    pub order_by: Vec<OrderBy>,
}

impl TryFromDialect<sqlparser::ast::OrderBy> for OrderClause {
    fn try_from_dialect(
        value: sqlparser::ast::OrderBy,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        if value.interpolate.is_some() {
            return unsupported!("ORDER BY ... INTERPOLATE");
        }
        match value.kind {
            sqlparser::ast::OrderByKind::All(_) => unsupported!("ORDER BY ALL"),
            sqlparser::ast::OrderByKind::Expressions(exprs) => Ok(OrderClause {
                order_by: exprs.try_into_dialect(dialect)?,
            }),
        }
    }
}

impl DialectDisplay for OrderClause {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| write!(f, "ORDER BY {}", self.order_by.display(dialect)))
    }
}
