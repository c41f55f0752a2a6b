use eventview_sql::{Dialect, DialectDisplay};
use eventview_sql_parsing::{format_query, parse_query};
use pretty_assertions::assert_eq;

/// Parses the query, displays it, and checks the displayed text parses back into the same tree
macro_rules! check_rt {
    ($dialect:expr, $sql:expr) => {{
        let dialect = $dialect;
        let sql = $sql;
        let parsed = parse_query(dialect, sql)
            .unwrap_or_else(|e| panic!("failed to parse {sql:?}: {e}"));
        let displayed = parsed.display(dialect).to_string();
        let reparsed = parse_query(dialect, &displayed)
            .unwrap_or_else(|e| panic!("failed to re-parse {displayed:?}: {e}"));
        assert_eq!(parsed, reparsed, "round trip of {sql:?} through {displayed:?}");
        format_query(&parsed, dialect).unwrap_or_else(|e| panic!("failed to format {sql:?}: {e}"))
    }};
}

macro_rules! check_rt_all {
    ($sql:expr) => {
        for dialect in Dialect::ALL {
            check_rt!(*dialect, $sql);
        }
    };
}

#[test]
fn simple_selects() {
    check_rt_all!("select 1");
    check_rt_all!("select * from events");
    check_rt_all!("select distinct e.type, count(*) as n from events as e group by e.type");
    check_rt_all!("select a from t where x = 1 order by a desc limit 10 offset 5");
}

#[test]
fn qualified_names_and_quoting() {
    check_rt!(Dialect::Trino, r#"select "e"."type" from hive."Analytics".events e"#);
    check_rt!(Dialect::MySQL, "select `e`.`type` from analytics.`events` as e");
    check_rt!(Dialect::PostgreSQL, r#"select * from "events" as "E""#);
}

#[test]
fn predicates() {
    check_rt_all!(
        "select * from events as e where e.type = 'pageview' and e.created_at > 10 or not e.id is null"
    );
    check_rt_all!("select * from events as e where e.type in ('pageview', 'click')");
    check_rt_all!("select * from events as e where e.type not in (select type from t)");
    check_rt_all!("select * from events as e where e.n between 1 and 2");
    check_rt_all!("select * from events as e where e.name like 'a%' and e.id is not null");
    check_rt_all!("select * from t where exists (select 1 from u) and not exists (select 2 from v)");
    check_rt_all!("select * from t where -x < 2 * (y + 3)");
    check_rt!(Dialect::PostgreSQL, "select * from t where name ilike 'a%'");
}

#[test]
fn typed_literals_and_casts() {
    check_rt!(
        Dialect::Trino,
        "select * from events as e where e.created_at > date '2021-01-01'"
    );
    check_rt!(Dialect::Trino, "select cast(x as varchar), try_cast(y as integer) from t");
    check_rt!(Dialect::PostgreSQL, "select x::text from t");
    check_rt!(Dialect::Trino, "select array[1, 2, 3], (1, 2) from t");
}

#[test]
fn escaped_strings() {
    check_rt_all!("select 'it''s' from t");
    check_rt!(Dialect::MySQL, r"select date 'a\\b' from t");
    check_rt!(Dialect::MySQL, r"select * from t where name like 'a\%' escape '\\'");
}

#[test]
fn like_escape() {
    check_rt_all!("select * from t where name like 'a!%' escape '!'");
    check_rt!(Dialect::Trino, "select * from t where name not like 'a#_%' escape '#'");
    check_rt!(Dialect::PostgreSQL, "select * from t where name ilike 'a#%' escape '#'");
}

#[test]
fn case_expressions() {
    check_rt_all!(
        "select case when e.type = 'a' then 1 when e.type = 'b' then 2 else 0 end from events as e"
    );
    check_rt_all!("select case e.type when 'a' then 1 end as n from events as e");
    check_rt_all!("select * from t where case when x > 1 then y else z end = 2");
}

#[test]
fn window_functions() {
    check_rt_all!(
        "select row_number() over (partition by e.session_id order by e.ts desc) from events as e"
    );
    check_rt_all!("select count(*) over () from t");
    check_rt_all!("select sum(x) over (order by ts rows between 1 preceding and current row) from t");
}

#[test]
fn intervals() {
    check_rt!(Dialect::Trino, "select * from t where d > current_date - interval '1' day");
    check_rt!(Dialect::PostgreSQL, "select * from t where d > now() - interval '2' hour");
    check_rt!(Dialect::Trino, "select interval '1-2' year to month from t");
}

#[test]
fn joins() {
    check_rt_all!("select * from profiles as p join events as e on p.id = e.profile_id");
    check_rt_all!("select * from a left join b on a.x = b.x right join c using (y)");
    check_rt_all!("select * from a cross join b");
    check_rt_all!("select * from a, b, c where a.x = b.x");
    check_rt_all!("select * from a join (b join c on b.y = c.y) on a.x = b.x");
    check_rt!(Dialect::Trino, "select * from a full join b on a.x = b.x");
}

#[test]
fn subqueries_and_ctes() {
    check_rt_all!("with x as (select * from events) select * from x");
    check_rt_all!("with x (a, b) as (select 1, 2), y as (select 3) select * from x, y");
    check_rt_all!("select * from (select * from events as e where e.id = 'a') as s");
    check_rt_all!("select (select max(n) from t) from u");
}

#[test]
fn set_operations() {
    check_rt_all!("select 1 union all select 2 union select 3");
    check_rt_all!("select 1 except select 2");
    check_rt_all!("select a from t intersect (select a from u union select a from v)");
    check_rt!(Dialect::Trino, "values (1, 'a'), (2, 'b')");
    check_rt!(Dialect::PostgreSQL, "values (1, 'a'), (2, 'b')");
}

#[test]
fn explain() {
    check_rt!(Dialect::Trino, "explain select * from events");
    check_rt!(Dialect::PostgreSQL, "explain analyze select * from events");
}

#[test]
fn unnest() {
    check_rt!(
        Dialect::Trino,
        "select * from events as e cross join unnest(e.tags) as t (tag)"
    );
}

#[test]
fn format_output() {
    let formatted = check_rt!(Dialect::Trino, "select * from events as e where e.id = 'x'");
    assert_eq!(
        formatted,
        "SELECT * FROM events AS e WHERE (e.id = 'x')\n"
    );
}
