use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    AstConversionError, Dialect, DialectDisplay, IntoDialect, TryFromDialect, TryIntoDialect,
    ast::*, fmt::fmt_with,
};

/// A single entry in the projection list of a `SELECT`
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldDefinitionExpr {
    /// `*`
    All,
    /// `t.*`
    AllInTable(QualifiedName),
    Expr {
        expr: Expr,
        alias: Option<SqlIdentifier>,
    },
}

impl From<Expr> for FieldDefinitionExpr {
    fn from(expr: Expr) -> Self {
        FieldDefinitionExpr::Expr { expr, alias: None }
    }
}

fn check_wildcard_options(
    options: &sqlparser::ast::WildcardAdditionalOptions,
) -> Result<(), AstConversionError> {
    if options.opt_ilike.is_some()
        || options.opt_exclude.is_some()
        || options.opt_except.is_some()
        || options.opt_replace.is_some()
        || options.opt_rename.is_some()
    {
        unsupported!("wildcard modifiers {options}")
    } else {
        Ok(())
    }
}

impl TryFromDialect<sqlparser::ast::SelectItem> for FieldDefinitionExpr {
    fn try_from_dialect(
        value: sqlparser::ast::SelectItem,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::{SelectItem, SelectItemQualifiedWildcardKind};
        match value {
            SelectItem::UnnamedExpr(expr) => Ok(Self::Expr {
                expr: expr.try_into_dialect(dialect)?,
                alias: None,
            }),
            SelectItem::ExprWithAlias { expr, alias } => Ok(Self::Expr {
                expr: expr.try_into_dialect(dialect)?,
                alias: Some(alias.into_dialect(dialect)),
            }),
            SelectItem::Wildcard(options) => {
                check_wildcard_options(&options)?;
                Ok(Self::All)
            }
            SelectItem::QualifiedWildcard(kind, options) => {
                check_wildcard_options(&options)?;
                match kind {
                    SelectItemQualifiedWildcardKind::ObjectName(name) => {
                        Ok(Self::AllInTable(name.try_into_dialect(dialect)?))
                    }
                    SelectItemQualifiedWildcardKind::Expr(expr) => {
                        unsupported!("wildcard on expression {expr}")
                    }
                }
            }
        }
    }
}

impl DialectDisplay for FieldDefinitionExpr {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            Self::All => write!(f, "*"),
            Self::AllInTable(table) => write!(f, "{}.*", table.display(dialect)),
            Self::Expr { expr, alias } => {
                write!(f, "{}", expr.display(dialect))?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias.display(dialect))?;
                }
                Ok(())
            }
        })
    }
}

/// A single `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ...` block.
///
/// This is the unit that filter facts are scoped to: its `where_clause` only speaks about the
/// relations in its own `from`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuerySpecification {
    pub distinct: bool,
    pub fields: Vec<FieldDefinitionExpr>,
    pub from: Option<Relation>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
}

impl TryFromDialect<sqlparser::ast::Select> for QuerySpecification {
    fn try_from_dialect(
        value: sqlparser::ast::Select,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::{Distinct, GroupByExpr};
        if value.top.is_some() {
            return unsupported!("TOP");
        }
        if value.into.is_some() {
            return unsupported!("SELECT INTO");
        }
        if value.prewhere.is_some() || value.qualify.is_some() {
            return unsupported!("PREWHERE or QUALIFY");
        }
        if !value.named_window.is_empty() || !value.lateral_views.is_empty() {
            return unsupported!("named windows or lateral views");
        }
        let distinct = match value.distinct {
            None => false,
            Some(Distinct::Distinct) => true,
            Some(Distinct::On(_)) => return unsupported!("DISTINCT ON"),
        };
        let group_by = match value.group_by {
            GroupByExpr::Expressions(exprs, modifiers) => {
                if !modifiers.is_empty() {
                    return unsupported!("GROUP BY modifiers");
                }
                exprs.try_into_dialect(dialect)?
            }
            GroupByExpr::All(_) => return unsupported!("GROUP BY ALL"),
        };
        Ok(QuerySpecification {
            distinct,
            fields: value.projection.try_into_dialect(dialect)?,
            from: from_clause(value.from, dialect)?,
            where_clause: value.selection.try_into_dialect(dialect)?,
            group_by,
            having: value.having.try_into_dialect(dialect)?,
        })
    }
}

impl DialectDisplay for QuerySpecification {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(f, "SELECT ")?;
            if self.distinct {
                write!(f, "DISTINCT ")?;
            }
            write!(f, "{}", self.fields.display(dialect))?;
            if let Some(from) = &self.from {
                write!(f, " FROM {}", from.display(dialect))?;
            }
            if let Some(where_clause) = &self.where_clause {
                write!(f, " WHERE {}", where_clause.display(dialect))?;
            }
            if !self.group_by.is_empty() {
                write!(f, " GROUP BY {}", self.group_by.display(dialect))?;
            }
            if let Some(having) = &self.having {
                write!(f, " HAVING {}", having.display(dialect))?;
            }
            Ok(())
        })
    }
}
