use eventview_sql::Dialect;
use eventview_sql::ast::SqlQuery;
use eventview_sql_parsing::parse_query;
use eventview_sql_passes::{EventViewRewrite, ViewSelection};
use itertools::Itertools;
use test_strategy::{Arbitrary, proptest};

const COLUMNS: &[&str] = &[
    "id",
    "session_id",
    "profile_id",
    "sid",
    "type",
    "created_at",
    "name",
];

#[derive(Debug, Clone, Arbitrary)]
struct Predicate {
    #[strategy(0..COLUMNS.len())]
    column: usize,
    #[strategy("[a-z]{1,8}")]
    value: String,
    in_list: bool,
    literal_first: bool,
}

impl Predicate {
    fn column(&self) -> &'static str {
        COLUMNS[self.column]
    }

    fn sql(&self, alias: &str) -> String {
        let column = format!("{alias}.{}", self.column());
        if self.in_list {
            format!("{column} IN ('{}', 'other')", self.value)
        } else if self.literal_first {
            format!("'{}' = {column}", self.value)
        } else {
            format!("{column} = '{}'", self.value)
        }
    }
}

fn filter(predicates: &[Predicate], alias: &str) -> String {
    predicates.iter().map(|p| p.sql(alias)).join(" AND ")
}

fn select(table: &str, predicates: &[Predicate]) -> String {
    if predicates.is_empty() {
        format!("SELECT * FROM {table} AS e")
    } else {
        format!("SELECT * FROM {table} AS e WHERE {}", filter(predicates, "e"))
    }
}

fn parse(sql: &str) -> SqlQuery {
    parse_query(Dialect::Trino, sql).unwrap()
}

fn expected_view(predicates: &[Predicate]) -> Option<&'static str> {
    let views = [
        (&["id"][..], "events_by_id"),
        (&["session_id"][..], "events_by_session_id"),
        (&["profile_id", "sid"][..], "events_by_profile_id"),
        (&["type"][..], "events_by_type"),
    ];
    views
        .iter()
        .find(|(columns, _)| predicates.iter().any(|p| columns.contains(&p.column())))
        .map(|(_, view)| *view)
}

#[proptest]
fn rewrite_is_idempotent(predicates: Vec<Predicate>) {
    let views = ViewSelection::default();
    let once = parse(&select("events", &predicates)).rewrite_event_views(&views);
    let twice = once.clone().rewrite_event_views(&views);
    assert_eq!(once, twice);
}

#[proptest]
fn highest_priority_view_is_chosen(predicates: Vec<Predicate>) {
    let rewritten =
        parse(&select("events", &predicates)).rewrite_event_views(&ViewSelection::default());
    let expected = parse(&select(
        expected_view(&predicates).unwrap_or("events"),
        &predicates,
    ));
    assert_eq!(rewritten, expected);
}

#[proptest]
fn disjunctions_never_substitute(predicates: Vec<Predicate>, other: Predicate) {
    let sql = if predicates.is_empty() {
        format!("SELECT * FROM events AS e WHERE {} OR e.id = 'x'", other.sql("e"))
    } else {
        format!(
            "SELECT * FROM events AS e WHERE ({}) OR {}",
            filter(&predicates, "e"),
            other.sql("e")
        )
    };
    let query = parse(&sql);
    assert_eq!(
        query.clone().rewrite_event_views(&ViewSelection::default()),
        query
    );
}

#[proptest]
fn union_arms_do_not_share_facts(left: Vec<Predicate>, right: Vec<Predicate>) {
    let sql = format!(
        "{} UNION ALL {}",
        select("events", &left),
        select("events", &right)
    );
    let expected = format!(
        "{} UNION ALL {}",
        select(expected_view(&left).unwrap_or("events"), &left),
        select(expected_view(&right).unwrap_or("events"), &right)
    );
    assert_eq!(
        parse(&sql).rewrite_event_views(&ViewSelection::default()),
        parse(&expected)
    );
}

#[proptest]
fn facts_about_other_aliases_are_ignored(predicates: Vec<Predicate>) {
    let sql = if predicates.is_empty() {
        "SELECT * FROM events AS e, profiles AS p".to_owned()
    } else {
        format!(
            "SELECT * FROM events AS e, profiles AS p WHERE {}",
            filter(&predicates, "p")
        )
    };
    let query = parse(&sql);
    assert_eq!(
        query.clone().rewrite_event_views(&ViewSelection::default()),
        query
    );
}
