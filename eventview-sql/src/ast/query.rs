use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    AstConversionError, Dialect, DialectDisplay, IntoDialect, TryFromDialect, TryIntoDialect,
    ast::*, fmt::fmt_with,
};

/// A complete statement, as accepted by the rewrite
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SqlQuery {
    Query(Query),
    Explain {
        analyze: bool,
        statement: Box<SqlQuery>,
    },
}

impl TryFromDialect<sqlparser::ast::Statement> for SqlQuery {
    fn try_from_dialect(
        value: sqlparser::ast::Statement,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::Statement;
        match value {
            Statement::Query(query) => Ok(Self::Query((*query).try_into_dialect(dialect)?)),
            Statement::Explain {
                analyze,
                verbose,
                statement,
                ..
            } => {
                if verbose {
                    return unsupported!("EXPLAIN VERBOSE");
                }
                Ok(Self::Explain {
                    analyze,
                    statement: statement.try_into_dialect(dialect)?,
                })
            }
            _ => unsupported!("statement {value}"),
        }
    }
}

impl DialectDisplay for SqlQuery {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            SqlQuery::Query(query) => write!(f, "{}", query.display(dialect)),
            SqlQuery::Explain { analyze, statement } => {
                write!(f, "EXPLAIN ")?;
                if *analyze {
                    write!(f, "ANALYZE ")?;
                }
                write!(f, "{}", statement.display(dialect))
            }
        })
    }
}

/// A single common table expression: `name [(columns)] AS (query)`
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WithQuery {
    pub name: SqlIdentifier,
    pub column_names: Vec<SqlIdentifier>,
    pub query: Box<Query>,
}

impl TryFromDialect<sqlparser::ast::Cte> for WithQuery {
    fn try_from_dialect(
        value: sqlparser::ast::Cte,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        if value.from.is_some() || value.materialized.is_some() {
            return unsupported!("CTE modifiers on {}", value.alias);
        }
        let column_names = value
            .alias
            .columns
            .into_iter()
            .map(|column| {
                if column.data_type.is_some() {
                    unsupported!("typed column in CTE")
                } else {
                    Ok(column.name.into_dialect(dialect))
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: value.alias.name.into_dialect(dialect),
            column_names,
            query: value.query.try_into_dialect(dialect)?,
        })
    }
}

impl DialectDisplay for WithQuery {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(f, "{}", self.name.display(dialect))?;
            if !self.column_names.is_empty() {
                write!(f, " ({})", self.column_names.display(dialect))?;
            }
            write!(f, " AS ({})", self.query.display(dialect))
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct With {
    pub recursive: bool,
    pub queries: Vec<WithQuery>,
}

impl TryFromDialect<sqlparser::ast::With> for With {
    fn try_from_dialect(
        value: sqlparser::ast::With,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        Ok(Self {
            recursive: value.recursive,
            queries: value.cte_tables.try_into_dialect(dialect)?,
        })
    }
}

impl DialectDisplay for With {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(f, "WITH ")?;
            if self.recursive {
                write!(f, "RECURSIVE ")?;
            }
            write!(f, "{}", self.queries.display(dialect))
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOperator::Union => write!(f, "UNION"),
            SetOperator::Intersect => write!(f, "INTERSECT"),
            SetOperator::Except => write!(f, "EXCEPT"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SetQuantifier {
    /// Neither `ALL` nor `DISTINCT` was written
    None,
    All,
    Distinct,
}

fn set_operation(
    op: sqlparser::ast::SetOperator,
    quantifier: sqlparser::ast::SetQuantifier,
) -> Result<(SetOperator, SetQuantifier), AstConversionError> {
    let op = match op {
        sqlparser::ast::SetOperator::Union => SetOperator::Union,
        sqlparser::ast::SetOperator::Intersect => SetOperator::Intersect,
        sqlparser::ast::SetOperator::Except => SetOperator::Except,
        _ => return unsupported!("set operator {op}"),
    };
    let quantifier = match quantifier {
        sqlparser::ast::SetQuantifier::None => SetQuantifier::None,
        sqlparser::ast::SetQuantifier::All => SetQuantifier::All,
        sqlparser::ast::SetQuantifier::Distinct => SetQuantifier::Distinct,
        _ => return unsupported!("set quantifier {quantifier}"),
    };
    Ok((op, quantifier))
}

/// The part of a query which produces rows, before ordering and limiting
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QueryBody {
    Specification(QuerySpecification),
    SetOperation {
        op: SetOperator,
        quantifier: SetQuantifier,
        left: Box<QueryBody>,
        right: Box<QueryBody>,
    },
    /// A parenthesized query, which may carry its own `WITH`, `ORDER BY` and `LIMIT`
    Subquery(Box<Query>),
    Values(Vec<Vec<Expr>>),
}

impl TryFromDialect<sqlparser::ast::SetExpr> for QueryBody {
    fn try_from_dialect(
        value: sqlparser::ast::SetExpr,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::SetExpr;
        match value {
            SetExpr::Select(select) => Ok(Self::Specification((*select).try_into_dialect(dialect)?)),
            SetExpr::Query(query) => Ok(Self::Subquery(query.try_into_dialect(dialect)?)),
            SetExpr::SetOperation {
                op,
                set_quantifier,
                left,
                right,
            } => {
                let (op, quantifier) = set_operation(op, set_quantifier)?;
                Ok(Self::SetOperation {
                    op,
                    quantifier,
                    left: left.try_into_dialect(dialect)?,
                    right: right.try_into_dialect(dialect)?,
                })
            }
            SetExpr::Values(values) => {
                if values.explicit_row {
                    return unsupported!("VALUES ROW(...)");
                }
                Ok(Self::Values(
                    values
                        .rows
                        .into_iter()
                        .map(|row| row.try_into_dialect(dialect))
                        .collect::<Result<_, _>>()?,
                ))
            }
            _ => unsupported!("query body {value}"),
        }
    }
}

impl DialectDisplay for QueryBody {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            QueryBody::Specification(spec) => write!(f, "{}", spec.display(dialect)),
            QueryBody::SetOperation {
                op,
                quantifier,
                left,
                right,
            } => {
                write!(f, "{} {op} ", left.display(dialect))?;
                match quantifier {
                    SetQuantifier::None => {}
                    SetQuantifier::All => write!(f, "ALL ")?,
                    SetQuantifier::Distinct => write!(f, "DISTINCT ")?,
                }
                write!(f, "{}", right.display(dialect))
            }
            QueryBody::Subquery(query) => write!(f, "({})", query.display(dialect)),
            QueryBody::Values(rows) => write!(
                f,
                "VALUES {}",
                rows.iter()
                    .map(|row| format!("({})", row.display(dialect)))
                    .join(", ")
            ),
        })
    }
}

/// A full query expression: optional `WITH`, a body, and optional `ORDER BY`/`LIMIT`/`OFFSET`
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Query {
    pub with: Option<With>,
    pub body: QueryBody,
    pub order: Option<OrderClause>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

impl From<QuerySpecification> for Query {
    fn from(spec: QuerySpecification) -> Self {
        QueryBody::Specification(spec).into()
    }
}

impl From<QueryBody> for Query {
    fn from(body: QueryBody) -> Self {
        Self {
            with: None,
            body,
            order: None,
            limit: None,
            offset: None,
        }
    }
}

impl TryFromDialect<sqlparser::ast::Query> for Query {
    fn try_from_dialect(
        value: sqlparser::ast::Query,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        let sqlparser::ast::Query {
            with,
            body,
            order_by,
            limit_clause,
            fetch,
            locks,
            ..
        } = value;
        if fetch.is_some() {
            return unsupported!("FETCH clause");
        }
        if !locks.is_empty() {
            return unsupported!("locking clause");
        }
        let (limit, offset) = match limit_clause {
            None => (None, None),
            Some(sqlparser::ast::LimitClause::LimitOffset {
                limit,
                offset,
                limit_by,
            }) => {
                if !limit_by.is_empty() {
                    return unsupported!("LIMIT BY");
                }
                (
                    limit.try_into_dialect(dialect)?,
                    offset.map(|o| o.value).try_into_dialect(dialect)?,
                )
            }
            Some(sqlparser::ast::LimitClause::OffsetCommaLimit { offset, limit }) => (
                Some(limit.try_into_dialect(dialect)?),
                Some(offset.try_into_dialect(dialect)?),
            ),
        };
        Ok(Self {
            with: with.try_into_dialect(dialect)?,
            body: (*body).try_into_dialect(dialect)?,
            order: order_by.try_into_dialect(dialect)?,
            limit,
            offset,
        })
    }
}

impl TryFromDialect<sqlparser::ast::SetExpr> for Query {
    fn try_from_dialect(
        value: sqlparser::ast::SetExpr,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        match value {
            sqlparser::ast::SetExpr::Query(query) => (*query).try_into_dialect(dialect),
            body => Ok(QueryBody::try_from_dialect(body, dialect)?.into()),
        }
    }
}

impl DialectDisplay for Query {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            if let Some(with) = &self.with {
                write!(f, "{} ", with.display(dialect))?;
            }
            write!(f, "{}", self.body.display(dialect))?;
            if let Some(order) = &self.order {
                write!(f, " {}", order.display(dialect))?;
            }
            if let Some(limit) = &self.limit {
                write!(f, " LIMIT {}", limit.display(dialect))?;
            }
            if let Some(offset) = &self.offset {
                write!(f, " OFFSET {}", offset.display(dialect))?;
            }
            Ok(())
        })
    }
}
