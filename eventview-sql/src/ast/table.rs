use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    AstConversionError, Dialect, DialectDisplay, IntoDialect, TryFromDialect, TryIntoDialect,
    ast::*, fmt::fmt_with,
};

/// A dotted name such as `catalog.schema.events`.
///
/// Always holds at least one segment; the last one is the name of the object itself and any
/// leading segments are namespaces.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "QualifiedNameParts")]
pub struct QualifiedName {
    parts: Vec<SqlIdentifier>,
}

/// The serialized form of a [`QualifiedName`], checked for emptiness before it is accepted
#[derive(Deserialize)]
struct QualifiedNameParts {
    parts: Vec<SqlIdentifier>,
}

#[derive(Debug, thiserror::Error)]
#[error("a qualified name needs at least one identifier")]
pub struct EmptyQualifiedName;

impl TryFrom<QualifiedNameParts> for QualifiedName {
    type Error = EmptyQualifiedName;

    fn try_from(value: QualifiedNameParts) -> Result<Self, Self::Error> {
        Self::new(value.parts).ok_or(EmptyQualifiedName)
    }
}

impl QualifiedName {
    /// Builds a name out of its segments, returning `None` if there are none
    pub fn new(parts: Vec<SqlIdentifier>) -> Option<Self> {
        (!parts.is_empty()).then_some(Self { parts })
    }

    pub fn parts(&self) -> &[SqlIdentifier] {
        &self.parts
    }

    /// The last (unqualified) segment of the name
    pub fn suffix(&self) -> &SqlIdentifier {
        // `parts` is never empty; see `new`
        &self.parts[self.parts.len() - 1]
    }

    /// Returns a copy of this name with the last segment replaced, keeping every leading segment
    /// verbatim
    #[must_use]
    pub fn with_suffix(&self, suffix: SqlIdentifier) -> Self {
        let mut parts = self.parts[..self.parts.len() - 1].to_vec();
        parts.push(suffix);
        Self { parts }
    }
}

impl From<SqlIdentifier> for QualifiedName {
    fn from(name: SqlIdentifier) -> Self {
        Self { parts: vec![name] }
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self {
            parts: name.split('.').map(SqlIdentifier::from).collect(),
        }
    }
}

impl TryFromDialect<sqlparser::ast::ObjectName> for QualifiedName {
    fn try_from_dialect(
        value: sqlparser::ast::ObjectName,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        #[allow(unreachable_patterns)]
        let parts = value
            .0
            .into_iter()
            .map(|part| match part {
                sqlparser::ast::ObjectNamePart::Identifier(ident) => Ok(ident.into_dialect(dialect)),
                _ => unsupported!("identifier constructor in qualified name"),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parts).ok_or_else(|| failed_err!("Expected at least one identifier in name"))
    }
}

impl DialectDisplay for QualifiedName {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            write!(
                f,
                "{}",
                self.parts.iter().map(|p| p.display(dialect)).join(".")
            )
        })
    }
}

/// A reference to a table (or view) by name
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Table {
    pub name: QualifiedName,
}

impl From<QualifiedName> for Table {
    fn from(name: QualifiedName) -> Self {
        Self { name }
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Self { name: name.into() }
    }
}

impl DialectDisplay for Table {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        self.name.display(dialect)
    }
}

/// A relation bound to an alias, as in `events AS e` or `(SELECT ...) AS s (a, b)`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AliasedRelation {
    pub relation: Box<Relation>,
    pub alias: SqlIdentifier,
    pub column_names: Vec<SqlIdentifier>,
}

impl DialectDisplay for AliasedRelation {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| {
            if let Relation::Join(join) = self.relation.as_ref() {
                write!(f, "({})", join.display(dialect))?;
            } else {
                write!(f, "{}", self.relation.display(dialect))?;
            }
            write!(f, " AS {}", self.alias.display(dialect))?;
            if !self.column_names.is_empty() {
                write!(f, " ({})", self.column_names.display(dialect))?;
            }
            Ok(())
        })
    }
}

/// Anything that can appear in a `FROM` clause
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    Table(Table),
    Aliased(AliasedRelation),
    Join(JoinClause),
    Subquery {
        lateral: bool,
        query: Box<Query>,
    },
    Unnest {
        exprs: Vec<Expr>,
        with_ordinality: bool,
    },
}

impl Relation {
    /// Binds this relation to `alias`
    pub fn aliased(self, alias: impl Into<SqlIdentifier>) -> Self {
        Relation::Aliased(AliasedRelation {
            relation: Box::new(self),
            alias: alias.into(),
            column_names: vec![],
        })
    }
}

impl From<Table> for Relation {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl DialectDisplay for Relation {
    fn display(&self, dialect: Dialect) -> impl fmt::Display + '_ {
        fmt_with(move |f| match self {
            Self::Table(table) => write!(f, "{}", table.display(dialect)),
            Self::Aliased(aliased) => write!(f, "{}", aliased.display(dialect)),
            Self::Join(join) => write!(f, "{}", join.display(dialect)),
            Self::Subquery { lateral, query } => {
                if *lateral {
                    write!(f, "LATERAL ")?;
                }
                write!(f, "({})", query.display(dialect))
            }
            Self::Unnest {
                exprs,
                with_ordinality,
            } => {
                write!(f, "UNNEST({})", exprs.display(dialect))?;
                if *with_ordinality {
                    write!(f, " WITH ORDINALITY")?;
                }
                Ok(())
            }
        })
    }
}

fn wrap_alias(
    relation: Relation,
    alias: Option<sqlparser::ast::TableAlias>,
    dialect: Dialect,
) -> Result<Relation, AstConversionError> {
    let Some(alias) = alias else {
        return Ok(relation);
    };
    let column_names = alias
        .columns
        .into_iter()
        .map(|column| {
            if column.data_type.is_some() {
                unsupported!("typed column in table alias")
            } else {
                Ok(column.name.into_dialect(dialect))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Relation::Aliased(AliasedRelation {
        relation: Box::new(relation),
        alias: alias.name.into_dialect(dialect),
        column_names,
    }))
}

impl TryFromDialect<sqlparser::ast::TableFactor> for Relation {
    fn try_from_dialect(
        value: sqlparser::ast::TableFactor,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        use sqlparser::ast::TableFactor;
        match value {
            TableFactor::Table {
                name,
                alias,
                args,
                sample,
                with_ordinality,
                partitions,
                ..
            } => {
                if args.is_some() {
                    return unsupported!("table function {name}");
                }
                if sample.is_some() {
                    return unsupported!("TABLESAMPLE clause");
                }
                if with_ordinality {
                    return unsupported!("WITH ORDINALITY on a table");
                }
                if !partitions.is_empty() {
                    return unsupported!("PARTITION clause");
                }
                let table = Relation::Table(Table {
                    name: name.try_into_dialect(dialect)?,
                });
                wrap_alias(table, alias, dialect)
            }
            TableFactor::Derived {
                lateral,
                subquery,
                alias,
                ..
            } => {
                let subquery = Relation::Subquery {
                    lateral,
                    query: subquery.try_into_dialect(dialect)?,
                };
                wrap_alias(subquery, alias, dialect)
            }
            TableFactor::NestedJoin {
                table_with_joins,
                alias,
                ..
            } => {
                let join = (*table_with_joins).try_into_dialect(dialect)?;
                wrap_alias(join, alias, dialect)
            }
            TableFactor::UNNEST {
                alias,
                array_exprs,
                with_offset,
                with_ordinality,
                ..
            } => {
                if with_offset {
                    return unsupported!("UNNEST WITH OFFSET");
                }
                let unnest = Relation::Unnest {
                    exprs: array_exprs.try_into_dialect(dialect)?,
                    with_ordinality,
                };
                wrap_alias(unnest, alias, dialect)
            }
            _ => unsupported!("table expression {value}"),
        }
    }
}

impl TryFromDialect<sqlparser::ast::TableWithJoins> for Relation {
    fn try_from_dialect(
        value: sqlparser::ast::TableWithJoins,
        dialect: Dialect,
    ) -> Result<Self, AstConversionError> {
        let sqlparser::ast::TableWithJoins { relation, joins } = value;
        let mut relation: Relation = relation.try_into_dialect(dialect)?;
        for join in joins {
            relation = JoinClause::from_sqlparser_join(relation, join, dialect)?.into();
        }
        Ok(relation)
    }
}

/// Folds the comma-separated list of a `FROM` clause into a left-deep tree of implicit joins
pub(crate) fn from_clause(
    from: Vec<sqlparser::ast::TableWithJoins>,
    dialect: Dialect,
) -> Result<Option<Relation>, AstConversionError> {
    let mut relations = from
        .into_iter()
        .map(|table_with_joins| table_with_joins.try_into_dialect(dialect));
    let Some(first) = relations.next() else {
        return Ok(None);
    };
    relations
        .try_fold(first?, |left, right| -> Result<_, AstConversionError> {
            Ok(Relation::Join(JoinClause {
                operator: JoinOperator::Implicit,
                left: Box::new(left),
                right: Box::new(right?),
                constraint: JoinConstraint::Empty,
            }))
        })
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_suffix_keeps_namespaces() {
        let name = QualifiedName::from("hive.analytics.events");
        let replaced = name.with_suffix("events_by_id".into());
        assert_eq!(
            replaced.display(Dialect::Trino).to_string(),
            "hive.analytics.events_by_id"
        );
        assert_eq!(replaced.suffix().as_str(), "events_by_id");
    }

    #[test]
    fn empty_qualified_name() {
        assert_eq!(QualifiedName::new(vec![]), None);
    }

    #[test]
    fn deserializing_an_empty_name_fails() {
        assert!(serde_json::from_str::<QualifiedName>(r#"{"parts":[]}"#).is_err());

        let name = QualifiedName::from("analytics.events");
        let json = serde_json::to_string(&name).unwrap();
        let back: QualifiedName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
        assert_eq!(back.suffix().as_str(), "events");
    }
}
