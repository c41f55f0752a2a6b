//! Facts about table aliases, gathered from the filter of a single query specification.

use std::collections::HashMap;
use std::fmt;

use eventview_sql::ast::{BinaryOperator, Expr, InValue, SqlIdentifier};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `alias.column = 'literal'`
    Equal,
    /// `alias.column IN ('literal', ...)`
    In,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintValue {
    Single(String),
    Set(Vec<String>),
}

/// A fact that holds for every row the filter lets through
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnConstraint {
    pub kind: ConstraintKind,
    /// The column name, with bare identifiers folded to lowercase
    pub column: String,
    pub value: ConstraintValue,
}

/// Identifies one query specification within a single rewrite
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn root() -> Self {
        ScopeId(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        ScopeId(self.0 + 1)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolve an identifier to the name the database would: bare identifiers fold to lowercase,
/// delimited ones are kept as written
fn canonical_name(ident: &SqlIdentifier) -> String {
    if ident.quoted {
        ident.value.clone()
    } else {
        ident.value.to_lowercase()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ScopedAlias {
    scope: ScopeId,
    alias: String,
}

/// Column constraints known for each alias of one query specification.
///
/// Constraints only ever get added; multiple constraints on the same column coexist.
#[derive(Clone, Debug)]
pub struct ScopeContext {
    scope: ScopeId,
    constraints: HashMap<ScopedAlias, Vec<ColumnConstraint>>,
}

impl ScopeContext {
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            constraints: HashMap::new(),
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    fn key(&self, alias: &SqlIdentifier) -> ScopedAlias {
        ScopedAlias {
            scope: self.scope,
            alias: canonical_name(alias),
        }
    }

    pub fn add_constraint(&mut self, alias: &SqlIdentifier, constraint: ColumnConstraint) {
        let key = self.key(alias);
        self.constraints.entry(key).or_default().push(constraint);
    }

    /// All constraints on `alias`, in the order they were collected
    pub fn constraints_for(&self, alias: &SqlIdentifier) -> &[ColumnConstraint] {
        self.constraints
            .get(&self.key(alias))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Splits `alias.column` into its parts. Anything else, including deeper paths like
/// `schema.table.column`, yields `None`.
fn alias_column(expr: &Expr) -> Option<(&SqlIdentifier, &SqlIdentifier)> {
    match expr {
        Expr::Dereference { base, field } => match base.as_ref() {
            Expr::Identifier(alias) => Some((alias, field)),
            _ => None,
        },
        _ => None,
    }
}

fn string_literal(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Literal(literal) => literal.as_string(),
        _ => None,
    }
}

/// Record in `scope` the facts that hold whenever `expr` is true.
///
/// Only conjunctions are descended into. Facts under `OR`, `NOT` or a function call are not
/// guaranteed to hold, so they are skipped without error.
pub fn collect_constraints(expr: &Expr, scope: &mut ScopeContext) {
    match expr {
        Expr::BinaryOp {
            lhs,
            op: BinaryOperator::And,
            rhs,
        } => {
            collect_constraints(lhs, scope);
            collect_constraints(rhs, scope);
        }
        Expr::BinaryOp {
            lhs,
            op: BinaryOperator::Equal,
            rhs,
        } => {
            let fact = alias_column(lhs)
                .zip(string_literal(rhs))
                .or_else(|| alias_column(rhs).zip(string_literal(lhs)));
            if let Some(((alias, column), value)) = fact {
                scope.add_constraint(
                    alias,
                    ColumnConstraint {
                        kind: ConstraintKind::Equal,
                        column: canonical_name(column),
                        value: ConstraintValue::Single(value.to_owned()),
                    },
                );
            }
        }
        Expr::In {
            lhs,
            rhs: InValue::List(list),
            negated: false,
        } => {
            if let Some((alias, column)) = alias_column(lhs) {
                let values = list
                    .iter()
                    .filter_map(string_literal)
                    .map(str::to_owned)
                    .collect();
                scope.add_constraint(
                    alias,
                    ColumnConstraint {
                        kind: ConstraintKind::In,
                        column: canonical_name(column),
                        value: ConstraintValue::Set(values),
                    },
                );
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use eventview_sql::Dialect;
    use eventview_sql::ast::{QueryBody, SqlQuery};
    use eventview_sql_parsing::parse_query;
    use pretty_assertions::assert_eq;

    use super::*;

    fn where_clause(sql: &str) -> Expr {
        match parse_query(Dialect::Trino, sql).unwrap() {
            SqlQuery::Query(query) => match query.body {
                QueryBody::Specification(spec) => spec.where_clause.unwrap(),
                body => panic!("unexpected query body {body:?}"),
            },
            q => panic!("unexpected query {q:?}"),
        }
    }

    fn collect(sql: &str) -> ScopeContext {
        let mut scope = ScopeContext::new(ScopeId::root());
        collect_constraints(&where_clause(sql), &mut scope);
        scope
    }

    #[test]
    fn equality_in_either_order() {
        let scope = collect(
            "select * from events as e where e.type = 'pageview' and 'abc' = e.session_id",
        );
        assert_eq!(
            scope.constraints_for(&"e".into()),
            [
                ColumnConstraint {
                    kind: ConstraintKind::Equal,
                    column: "type".into(),
                    value: ConstraintValue::Single("pageview".into()),
                },
                ColumnConstraint {
                    kind: ConstraintKind::Equal,
                    column: "session_id".into(),
                    value: ConstraintValue::Single("abc".into()),
                },
            ]
        );
    }

    #[test]
    fn in_list_keeps_only_string_literals() {
        let scope = collect("select * from events as e where e.type in ('a', 1, e.other, 'b')");
        assert_eq!(
            scope.constraints_for(&"e".into()),
            [ColumnConstraint {
                kind: ConstraintKind::In,
                column: "type".into(),
                value: ConstraintValue::Set(vec!["a".into(), "b".into()]),
            }]
        );
    }

    #[test]
    fn disjunction_and_negation_are_skipped() {
        assert!(collect("select * from events as e where e.type = 'a' or e.id = 'b'").is_empty());
        assert!(collect("select * from events as e where not e.id = 'b'").is_empty());
        assert!(collect("select * from events as e where e.id not in ('b')").is_empty());
        assert!(collect("select * from events as e where lower(e.id = 'b')").is_empty());
    }

    #[test]
    fn non_literal_comparisons_are_skipped() {
        assert!(collect("select * from events as e where e.id = e.session_id").is_empty());
        assert!(collect("select * from events as e where e.id = 1").is_empty());
        assert!(collect("select * from events as e where e.id > 'a'").is_empty());
        assert!(collect("select * from events as e where id = 'a'").is_empty());
        assert!(collect("select * from events as e where s.e.id = 'a'").is_empty());
    }

    #[test]
    fn facts_under_nested_conjunctions_are_kept() {
        let scope = collect(
            "select * from events as e, profiles as p \
             where (e.type = 'a' and (p.id = 'b' and e.created_at > 1)) or false",
        );
        assert!(scope.is_empty());

        let scope = collect(
            "select * from events as e, profiles as p \
             where (e.type = 'a' and (p.id = 'b' and e.created_at > 1))",
        );
        assert_eq!(scope.constraints_for(&"e".into()).len(), 1);
        assert_eq!(scope.constraints_for(&"p".into()).len(), 1);
        assert!(scope.constraints_for(&"x".into()).is_empty());
    }

    #[test]
    fn alias_keys_follow_identifier_folding() {
        let scope = collect("select * from events as e where E.type = 'a' and \"E\".id = 'b'");
        assert_eq!(scope.constraints_for(&"e".into()).len(), 1);
        assert_eq!(
            scope.constraints_for(&SqlIdentifier::quoted("E"))[0].column,
            "id"
        );
    }
}
