//! Redirects reads of a wide logical events table to narrower views keyed on the columns a query
//! filters by.
//!
//! Each query specification (one `SELECT ... FROM ... WHERE ...` block) is handled on its own:
//! the conjunctive `alias.column = 'literal'` and `alias.column IN ('literal', ...)` facts of its
//! `WHERE` clause decide which view replaces each aliased reference to the logical table in its
//! `FROM` clause. Facts never leak between specifications, so a filter inside a subquery, a CTE
//! body or a `UNION` arm only affects the relations of that block.
//!
//! ```sql
//! SELECT * FROM events AS e WHERE e.type = 'pageview'
//! ```
//!
//! becomes:
//!
//! ```sql
//! SELECT * FROM events_by_type AS e WHERE e.type = 'pageview'
//! ```

mod constraints;
mod view_selection;

use eventview_sql::analysis::rewrite::{self, Rewriter};
use eventview_sql::ast::{
    AliasedRelation, JoinClause, Query, QuerySpecification, Relation, SqlQuery,
};
use tracing::{debug, trace, trace_span};

pub use self::constraints::{
    ColumnConstraint, ConstraintKind, ConstraintValue, ScopeContext, ScopeId, collect_constraints,
};
pub use self::view_selection::{ViewMapping, ViewSelection, ViewSelectionError};

/// Things that can have references to the logical events table redirected to specialized views
pub trait EventViewRewrite {
    /// Replace each aliased reference to `views.logical_table` with the highest priority view
    /// whose key column is constrained by the enclosing query specification's filter.
    ///
    /// References without an alias, or whose alias has no usable constraint, are left alone. The
    /// rewrite is idempotent.
    #[must_use]
    fn rewrite_event_views(self, views: &ViewSelection) -> Self;
}

impl EventViewRewrite for SqlQuery {
    fn rewrite_event_views(self, views: &ViewSelection) -> Self {
        let span =
            trace_span!("event_view_rewrite", logical_table = %views.logical_table).entered();
        trace!(parent: &span, query_pre = ?self);
        let query = EventViewRewriter::new(views).rewrite_sql_query(self);
        trace!(parent: &span, ?query, "Rewrote event views");
        query
    }
}

impl EventViewRewrite for Query {
    fn rewrite_event_views(self, views: &ViewSelection) -> Self {
        let span =
            trace_span!("event_view_rewrite", logical_table = %views.logical_table).entered();
        trace!(parent: &span, query_pre = ?self);
        let query = EventViewRewriter::new(views).rewrite_query(self);
        trace!(parent: &span, ?query, "Rewrote event views");
        query
    }
}

/// Returns a rewritten copy of `query`, leaving the input untouched
pub fn rewrite_query(query: &SqlQuery, views: &ViewSelection) -> SqlQuery {
    query.clone().rewrite_event_views(views)
}

struct EventViewRewriter<'a> {
    views: &'a ViewSelection,
    next_scope: ScopeId,
}

impl<'a> EventViewRewriter<'a> {
    fn new(views: &'a ViewSelection) -> Self {
        Self {
            views,
            next_scope: ScopeId::root(),
        }
    }

    fn enter_scope(&mut self) -> ScopeContext {
        let scope = self.next_scope;
        self.next_scope = scope.next();
        ScopeContext::new(scope)
    }

    /// Rewrite a relation that is directly part of the `FROM` clause described by `context`.
    ///
    /// Joins (parenthesized or not) are still part of the same `FROM` clause; anything else that
    /// introduces its own query specification goes back through the regular traversal.
    fn rewrite_scoped_relation(&mut self, relation: Relation, context: &ScopeContext) -> Relation {
        match relation {
            Relation::Aliased(AliasedRelation {
                relation,
                alias,
                column_names,
            }) => {
                let relation = match *relation {
                    Relation::Table(table) => {
                        match self
                            .views
                            .select_view(&table, context.constraints_for(&alias))
                        {
                            Some(view) => {
                                debug!(
                                    %alias,
                                    table = ?table.name,
                                    view = ?view.name,
                                    "Substituting event view"
                                );
                                Relation::Table(view)
                            }
                            None => Relation::Table(table),
                        }
                    }
                    join @ Relation::Join(_) => self.rewrite_scoped_relation(join, context),
                    other => self.rewrite_relation(other),
                };
                Relation::Aliased(AliasedRelation {
                    relation: Box::new(relation),
                    alias,
                    column_names,
                })
            }
            Relation::Join(JoinClause {
                operator,
                left,
                right,
                constraint,
            }) => Relation::Join(JoinClause {
                operator,
                left: Box::new(self.rewrite_scoped_relation(*left, context)),
                right: Box::new(self.rewrite_scoped_relation(*right, context)),
                constraint: self.rewrite_join_constraint(constraint),
            }),
            other => self.rewrite_relation(other),
        }
    }
}

impl Rewriter for EventViewRewriter<'_> {
    fn rewrite_query_specification(
        &mut self,
        mut spec: QuerySpecification,
    ) -> QuerySpecification {
        let mut context = self.enter_scope();
        let span = trace_span!("query_specification", scope = %context.scope()).entered();
        if let Some(where_clause) = &spec.where_clause {
            collect_constraints(where_clause, &mut context);
        }
        trace!(parent: &span, ?context, "Collected constraints");

        // The FROM clause is rewritten against this scope's facts; everything else (including
        // subqueries in the filter) goes through the regular traversal
        let from = spec.from.take();
        let mut spec = rewrite::walk_query_specification(self, spec);
        spec.from = from.map(|from| self.rewrite_scoped_relation(from, &context));
        spec
    }
}

#[cfg(test)]
mod tests {
    use eventview_sql::Dialect;
    use eventview_sql_parsing::{format_query, parse_query};
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(sql: &str) -> SqlQuery {
        parse_query(Dialect::Trino, sql).unwrap()
    }

    #[track_caller]
    fn check(input: &str, expected: &str) {
        let actual = parse(input).rewrite_event_views(&ViewSelection::default());
        let expected = parse(expected);
        assert_eq!(
            actual,
            expected,
            "\n  actual: {}\nexpected: {}",
            format_query(&actual, Dialect::Trino).unwrap(),
            format_query(&expected, Dialect::Trino).unwrap()
        );
    }

    #[track_caller]
    fn unchanged(input: &str) {
        check(input, input)
    }

    #[test]
    fn nothing_to_rewrite() {
        unchanged("select 1");
        unchanged("select * from not_events as e where e.id = 'x'");
        unchanged("select * from events");
        unchanged("select * from events where id = 'x'");
        unchanged("select * from events as e");
        unchanged("select * from events as e where e.created_at > date '2024-01-01'");
    }

    #[test]
    fn equality_on_id() {
        check(
            "select * from events as e where e.id = 'abc'",
            "select * from events_by_id as e where e.id = 'abc'",
        );
    }

    #[test]
    fn equality_on_type() {
        check(
            "select e.name from events e where e.type = 'pageview'",
            "select e.name from events_by_type e where e.type = 'pageview'",
        );
    }

    #[test]
    fn literal_on_the_left() {
        check(
            "select * from events as e where 'pageview' = e.type",
            "select * from events_by_type as e where 'pageview' = e.type",
        );
    }

    #[test]
    fn session_id() {
        check(
            "select * from events as e where e.session_id = 's'",
            "select * from events_by_session_id as e where e.session_id = 's'",
        );
    }

    #[test]
    fn session_id_wins_over_type() {
        check(
            "select * from events as e where e.type = 'click' and e.session_id = 's'",
            "select * from events_by_session_id as e where e.type = 'click' and e.session_id = 's'",
        );
    }

    #[test]
    fn id_wins_over_everything() {
        check(
            "select * from events as e \
             where e.type = 'click' and e.profile_id = 'p' and e.session_id = 's' and e.id = 'i'",
            "select * from events_by_id as e \
             where e.type = 'click' and e.profile_id = 'p' and e.session_id = 's' and e.id = 'i'",
        );
    }

    #[test]
    fn profile_id_or_sid() {
        check(
            "select * from events as e where e.sid = 'p'",
            "select * from events_by_profile_id as e where e.sid = 'p'",
        );
        check(
            "select * from events as e where e.type = 'a' and e.profile_id = 'p'",
            "select * from events_by_profile_id as e where e.type = 'a' and e.profile_id = 'p'",
        );
    }

    #[test]
    fn extra_predicates_do_not_matter() {
        check(
            "select * from events as e \
             where e.type = 'pageview' and e.created_at > date '2024-01-01'",
            "select * from events_by_type as e \
             where e.type = 'pageview' and e.created_at > date '2024-01-01'",
        );
    }

    #[test]
    fn in_list() {
        check(
            "select * from events as e where e.type in ('pageview', 'click')",
            "select * from events_by_type as e where e.type in ('pageview', 'click')",
        );
    }

    #[test]
    fn disjunction_is_left_alone() {
        unchanged("select * from events as e where e.type = 'a' or e.type = 'b'");
        unchanged("select * from events as e where not (e.id = 'a')");
    }

    #[test]
    fn cte_body_has_its_own_scope() {
        check(
            "with recent as (select * from events as e where e.type = 'click') \
             select * from recent as r, events as e where r.id = 'x'",
            "with recent as (select * from events_by_type as e where e.type = 'click') \
             select * from recent as r, events as e where r.id = 'x'",
        );
    }

    #[test]
    fn outer_facts_do_not_reach_cte_bodies() {
        check(
            "with c as (select * from events as e) select * from c, events as e where e.id = 'x'",
            "with c as (select * from events as e) \
             select * from c, events_by_id as e where e.id = 'x'",
        );
    }

    #[test]
    fn multiple_ctes() {
        check(
            "with a as (select * from events as e where e.id = '1'), \
                  b as (select * from events as e where e.session_id = '2') \
             select * from a join b on a.id = b.id",
            "with a as (select * from events_by_id as e where e.id = '1'), \
                  b as (select * from events_by_session_id as e where e.session_id = '2') \
             select * from a join b on a.id = b.id",
        );
    }

    #[test]
    fn facts_from_on_are_not_used() {
        check(
            "select * from events as e join profiles as p on e.id = 'x' and p.id = e.profile_id \
             where e.type = 'signup'",
            "select * from events_by_type as e join profiles as p on e.id = 'x' and p.id = e.profile_id \
             where e.type = 'signup'",
        );
        unchanged("select * from events as e join profiles as p on e.type = 'x'");
    }

    #[test]
    fn both_sides_of_a_join() {
        check(
            "select * from events as a join events as b on a.session_id = b.session_id \
             where a.id = '1' and b.type = 'click'",
            "select * from events_by_id as a join events_by_type as b on a.session_id = b.session_id \
             where a.id = '1' and b.type = 'click'",
        );
    }

    #[test]
    fn subquery_in_where_has_its_own_scope() {
        check(
            "select * from events as e where e.type = 'a' \
             and e.session_id in (select e.session_id from events as e where e.id = 'x')",
            "select * from events_by_type as e where e.type = 'a' \
             and e.session_id in (select e.session_id from events_by_id as e where e.id = 'x')",
        );
    }

    #[test]
    fn outer_facts_do_not_reach_derived_tables() {
        check(
            "select * from (select * from events as e where e.session_id = 's') as e \
             where e.id = 'x'",
            "select * from (select * from events_by_session_id as e where e.session_id = 's') as e \
             where e.id = 'x'",
        );
        unchanged("select * from (select * from events as e) as e where e.id = 'x'");
    }

    #[test]
    fn union_arms_are_isolated() {
        check(
            "select * from events as e where e.id = 'a' \
             union all select * from events as e",
            "select * from events_by_id as e where e.id = 'a' \
             union all select * from events as e",
        );
    }

    #[test]
    fn qualifiers_are_kept() {
        check(
            "select * from hive.analytics.events as e where e.id = 'x'",
            "select * from hive.analytics.events_by_id as e where e.id = 'x'",
        );
    }

    #[test]
    fn column_aliases_survive_substitution() {
        check(
            "select * from events as e (a, b) where e.id = 'x'",
            "select * from events_by_id as e (a, b) where e.id = 'x'",
        );
    }

    #[test]
    fn case_and_window_expressions() {
        check(
            "select case when e.type = 'a' then 1 else 0 end, \
                    row_number() over (partition by e.session_id order by e.ts desc) \
             from events as e where e.id = 'x'",
            "select case when e.type = 'a' then 1 else 0 end, \
                    row_number() over (partition by e.session_id order by e.ts desc) \
             from events_by_id as e where e.id = 'x'",
        );
        // Subqueries under a CASE branch get their own scope and are still rewritten
        check(
            "select case when exists (select 1 from events as s where s.session_id = 'y') \
                    then 1 end from events as e where e.interval_ts > current_date - interval '1' day",
            "select case when exists (select 1 from events_by_session_id as s \
                    where s.session_id = 'y') \
                    then 1 end from events as e where e.interval_ts > current_date - interval '1' day",
        );
    }

    #[test]
    fn case_folding() {
        check(
            "select * from EVENTS as E where e.ID = 'x'",
            "select * from events_by_id as E where e.ID = 'x'",
        );
        unchanged("select * from events as \"E\" where e.id = 'x'");
    }

    #[test]
    fn explain() {
        check(
            "explain select * from events as e where e.id = 'x'",
            "explain select * from events_by_id as e where e.id = 'x'",
        );
    }

    #[test]
    fn idempotent() {
        let views = ViewSelection::default();
        let once = parse("select * from events as e where e.id = 'x'").rewrite_event_views(&views);
        let twice = once.clone().rewrite_event_views(&views);
        assert_eq!(once, twice);
    }

    #[test]
    fn input_is_untouched() {
        let query = parse("select * from events as e where e.id = 'x'");
        let before = query.clone();
        let rewritten = rewrite_query(&query, &ViewSelection::default());
        assert_eq!(query, before);
        assert_ne!(rewritten, before);
    }

    #[test]
    fn custom_views() {
        let views = ViewSelection::from_json(
            r#"{"logical_table": "pageviews",
                "views": [{"columns": ["url"], "view": "pageviews_by_url"}]}"#,
        )
        .unwrap();
        let query = parse("select * from pageviews as p, events as e where p.url = 'u' and e.id = 'x'");
        assert_eq!(
            query.rewrite_event_views(&views),
            parse(
                "select * from pageviews_by_url as p, events as e where p.url = 'u' and e.id = 'x'"
            )
        );
    }
}
