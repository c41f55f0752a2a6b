use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    AstConversionError, Dialect, DialectDisplay, TryFromDialect, TryIntoDialect, ast::*,
    fmt::fmt_with,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JoinOperator {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    /// Two relations separated by a comma in a `FROM` list
    Implicit,
}

impl TryFrom<&sqlparser::ast::JoinOperator> for JoinOperator {
    type Error = AstConversionError;
    fn try_from(value: &sqlparser::ast::JoinOperator) -> Result<Self, Self::Error> {
        use sqlparser::ast::JoinOperator as JoinOp;
        match value {
            JoinOp::Join(..) | JoinOp::Inner(..) => Ok(Self::Inner),
            JoinOp::Left(..) | JoinOp::LeftOuter(..) => Ok(Self::Left),
            JoinOp::Right(..) | JoinOp::RightOuter(..) => Ok(Self::Right),
            JoinOp::FullOuter(..) => Ok(Self::Full),
            JoinOp::CrossJoin { .. } => Ok(Self::Cross),
            _ => unsupported!("Unsupported join operator: {value:?}"),
        }
    }
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            JoinOperator::Inner => write!(f, "JOIN"),
            JoinOperator::Left => write!(f, "LEFT JOIN"),
            JoinOperator::Right => write!(f, "RIGHT JOIN"),
            JoinOperator::Full => write!(f, "FULL JOIN"),
            JoinOperator::Cross => write!(f, "CROSS JOIN"),
            JoinOperator::Implicit => write!(f, ","),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<SqlIdentifier>),
    Empty,
}

impl TryFromDialect<sqlparser::ast::JoinConstraint> for JoinConstraint {
    fn try_from_dialect(
        value: sqlparser::ast::JoinConstraint,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::JoinConstraint::*;
        match value {
            On(expr) => Ok(Self::On(expr.try_into_dialect(dialect)?)),
            Using(names) => Ok(Self::Using(
                names
                    .into_iter()
                    .map(|name| {
                        let name: QualifiedName = name.try_into_dialect(dialect)?;
                        if name.parts().len() > 1 {
                            unsupported!("qualified column in USING")
                        } else {
                            Ok(name.suffix().clone())
                        }
                    })
                    .collect::<Result<_, _>>()?,
            )),
            None => Ok(Self::Empty),
            Natural => unsupported!("NATURAL join"),
        }
    }
}

impl DialectDisplay for JoinConstraint {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            Self::On(expr) => write!(f, " ON {}", expr.display(dialect)),
            Self::Using(columns) => write!(f, " USING ({})", columns.display(dialect)),
            Self::Empty => Ok(()),
        })
    }
}

/// Two relations joined together.
///
/// Joins nest: `a JOIN b JOIN c` is a join whose left side is the join of `a` and `b`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinClause {
    pub operator: JoinOperator,
    pub left: Box<Relation>,
    pub right: Box<Relation>,
    pub constraint: JoinConstraint,
}

impl JoinClause {
    pub(crate) fn from_sqlparser_join(
        left: Relation,
        join: sqlparser::ast::Join,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::JoinOperator as JoinOp;
        let operator = (&join.join_operator).try_into()?;
        let constraint = match join.join_operator {
            JoinOp::Join(constraint)
            | JoinOp::Inner(constraint)
            | JoinOp::Left(constraint)
            | JoinOp::LeftOuter(constraint)
            | JoinOp::Right(constraint)
            | JoinOp::RightOuter(constraint)
            | JoinOp::FullOuter(constraint) => constraint.try_into_dialect(dialect)?,
            _ => JoinConstraint::Empty,
        };
        Ok(Self {
            operator,
            left: Box::new(left),
            right: Box::new(join.relation.try_into_dialect(dialect)?),
            constraint,
        })
    }
}

impl From<JoinClause> for Relation {
    fn from(join: JoinClause) -> Self {
        Relation::Join(join)
    }
}

impl DialectDisplay for JoinClause {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(f, "{}", self.left.display(dialect))?;
            match self.operator {
                JoinOperator::Implicit => write!(f, ", ")?,
                op => write!(f, " {op} ")?,
            }
            // A join on the right needs parentheses to keep its grouping
            if let Relation::Join(right) = self.right.as_ref() {
                write!(f, "({})", right.display(dialect))?;
            } else {
                write!(f, "{}", self.right.display(dialect))?;
            }
            write!(f, "{}", self.constraint.display(dialect))
        })
    }
}
