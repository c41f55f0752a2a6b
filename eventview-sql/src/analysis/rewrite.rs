//! Owning AST rewriter for SQL, in the style of a fold: each hook takes a node by value and
//! returns the node to put in its place.
//!
//! Every `walk_*` function rebuilds its node with each child passed through the corresponding
//! hook, and matches exhaustively on every enum it meets. Adding a variant to the syntax tree
//! therefore fails to compile until a traversal rule for it is written here.

use crate::ast::{
    AliasedRelation, CaseWhenBranch, Expr, FieldDefinitionExpr, FunctionArgument,
    FunctionArguments, FunctionExpr, InValue, IntervalExpr, JoinClause, JoinConstraint, Literal,
    OrderBy, OrderClause, QualifiedName, Query, QueryBody, QuerySpecification, Relation,
    SqlIdentifier, SqlQuery, Table, WindowSpec, With, WithQuery,
};

/// Each method of the `Rewriter` trait is a hook to be potentially overridden when recursively
/// rewriting SQL statements. The default implementation of each method rebuilds its input via the
/// corresponding `walk` function, eg `rewrite_expr` by default calls `rewrite::walk_expr`, so an
/// implementor only overrides the nodes it wants to change.
///
/// Optional clauses which are absent in the input stay absent; leaves (literals and identifiers)
/// are returned unchanged by default.
///
/// # Examples
///
/// The following implements a Rewriter which uppercases every string literal in a query.
///
/// ```
/// use eventview_sql::analysis::rewrite::Rewriter;
/// use eventview_sql::ast::{Literal, SqlQuery};
///
/// struct Shout;
///
/// impl Rewriter for Shout {
///     fn rewrite_literal(&mut self, literal: Literal) -> Literal {
///         match literal {
///             Literal::String(s) => Literal::String(s.to_uppercase()),
///             other => other,
///         }
///     }
/// }
///
/// fn shout(query: SqlQuery) -> SqlQuery {
///     Shout.rewrite_sql_query(query)
/// }
/// ```
pub trait Rewriter: Sized {
    fn rewrite_sql_query(&mut self, query: SqlQuery) -> SqlQuery {
        walk_sql_query(self, query)
    }

    fn rewrite_query(&mut self, query: Query) -> Query {
        walk_query(self, query)
    }

    fn rewrite_with(&mut self, with: With) -> With {
        walk_with(self, with)
    }

    fn rewrite_with_query(&mut self, with_query: WithQuery) -> WithQuery {
        walk_with_query(self, with_query)
    }

    fn rewrite_query_body(&mut self, body: QueryBody) -> QueryBody {
        walk_query_body(self, body)
    }

    fn rewrite_query_specification(&mut self, spec: QuerySpecification) -> QuerySpecification {
        walk_query_specification(self, spec)
    }

    fn rewrite_field_definition_expr(
        &mut self,
        field: FieldDefinitionExpr,
    ) -> FieldDefinitionExpr {
        walk_field_definition_expr(self, field)
    }

    fn rewrite_relation(&mut self, relation: Relation) -> Relation {
        walk_relation(self, relation)
    }

    fn rewrite_table(&mut self, table: Table) -> Table {
        walk_table(self, table)
    }

    fn rewrite_aliased_relation(&mut self, aliased: AliasedRelation) -> AliasedRelation {
        walk_aliased_relation(self, aliased)
    }

    fn rewrite_join_clause(&mut self, join: JoinClause) -> JoinClause {
        walk_join_clause(self, join)
    }

    fn rewrite_join_constraint(&mut self, constraint: JoinConstraint) -> JoinConstraint {
        walk_join_constraint(self, constraint)
    }

    fn rewrite_where_clause(&mut self, expr: Expr) -> Expr {
        self.rewrite_expr(expr)
    }

    fn rewrite_having_clause(&mut self, expr: Expr) -> Expr {
        self.rewrite_expr(expr)
    }

    fn rewrite_group_by(&mut self, exprs: Vec<Expr>) -> Vec<Expr> {
        exprs.into_iter().map(|e| self.rewrite_expr(e)).collect()
    }

    fn rewrite_order_clause(&mut self, order: OrderClause) -> OrderClause {
        walk_order_clause(self, order)
    }

    fn rewrite_expr(&mut self, expr: Expr) -> Expr {
        walk_expr(self, expr)
    }

    fn rewrite_in_value(&mut self, in_value: InValue) -> InValue {
        walk_in_value(self, in_value)
    }

    fn rewrite_function_expr(&mut self, function: FunctionExpr) -> FunctionExpr {
        walk_function_expr(self, function)
    }

    fn rewrite_window_spec(&mut self, window: WindowSpec) -> WindowSpec {
        walk_window_spec(self, window)
    }

    fn rewrite_qualified_name(&mut self, name: QualifiedName) -> QualifiedName {
        name
    }

    fn rewrite_identifier(&mut self, ident: SqlIdentifier) -> SqlIdentifier {
        ident
    }

    fn rewrite_literal(&mut self, literal: Literal) -> Literal {
        literal
    }
}

fn rewrite_exprs<R: Rewriter>(rewriter: &mut R, exprs: Vec<Expr>) -> Vec<Expr> {
    exprs.into_iter().map(|e| rewriter.rewrite_expr(e)).collect()
}

fn rewrite_boxed_expr<R: Rewriter>(rewriter: &mut R, expr: Box<Expr>) -> Box<Expr> {
    Box::new(rewriter.rewrite_expr(*expr))
}

fn rewrite_boxed_query<R: Rewriter>(rewriter: &mut R, query: Box<Query>) -> Box<Query> {
    Box::new(rewriter.rewrite_query(*query))
}

pub fn walk_sql_query<R: Rewriter>(rewriter: &mut R, query: SqlQuery) -> SqlQuery {
    match query {
        SqlQuery::Query(query) => SqlQuery::Query(rewriter.rewrite_query(query)),
        SqlQuery::Explain { analyze, statement } => SqlQuery::Explain {
            analyze,
            statement: Box::new(rewriter.rewrite_sql_query(*statement)),
        },
    }
}

pub fn walk_query<R: Rewriter>(rewriter: &mut R, query: Query) -> Query {
    let Query {
        with,
        body,
        order,
        limit,
        offset,
    } = query;
    Query {
        with: with.map(|with| rewriter.rewrite_with(with)),
        body: rewriter.rewrite_query_body(body),
        order: order.map(|order| rewriter.rewrite_order_clause(order)),
        limit: limit.map(|limit| rewriter.rewrite_expr(limit)),
        offset: offset.map(|offset| rewriter.rewrite_expr(offset)),
    }
}

pub fn walk_with<R: Rewriter>(rewriter: &mut R, with: With) -> With {
    With {
        recursive: with.recursive,
        queries: with
            .queries
            .into_iter()
            .map(|q| rewriter.rewrite_with_query(q))
            .collect(),
    }
}

pub fn walk_with_query<R: Rewriter>(rewriter: &mut R, with_query: WithQuery) -> WithQuery {
    WithQuery {
        name: rewriter.rewrite_identifier(with_query.name),
        column_names: with_query
            .column_names
            .into_iter()
            .map(|c| rewriter.rewrite_identifier(c))
            .collect(),
        query: rewrite_boxed_query(rewriter, with_query.query),
    }
}

pub fn walk_query_body<R: Rewriter>(rewriter: &mut R, body: QueryBody) -> QueryBody {
    match body {
        QueryBody::Specification(spec) => {
            QueryBody::Specification(rewriter.rewrite_query_specification(spec))
        }
        QueryBody::SetOperation {
            op,
            quantifier,
            left,
            right,
        } => QueryBody::SetOperation {
            op,
            quantifier,
            left: Box::new(rewriter.rewrite_query_body(*left)),
            right: Box::new(rewriter.rewrite_query_body(*right)),
        },
        QueryBody::Subquery(query) => QueryBody::Subquery(rewrite_boxed_query(rewriter, query)),
        QueryBody::Values(rows) => QueryBody::Values(
            rows.into_iter()
                .map(|row| rewrite_exprs(rewriter, row))
                .collect(),
        ),
    }
}

pub fn walk_query_specification<R: Rewriter>(
    rewriter: &mut R,
    spec: QuerySpecification,
) -> QuerySpecification {
    let QuerySpecification {
        distinct,
        fields,
        from,
        where_clause,
        group_by,
        having,
    } = spec;
    QuerySpecification {
        distinct,
        fields: fields
            .into_iter()
            .map(|f| rewriter.rewrite_field_definition_expr(f))
            .collect(),
        from: from.map(|from| rewriter.rewrite_relation(from)),
        where_clause: where_clause.map(|expr| rewriter.rewrite_where_clause(expr)),
        group_by: rewriter.rewrite_group_by(group_by),
        having: having.map(|expr| rewriter.rewrite_having_clause(expr)),
    }
}

pub fn walk_field_definition_expr<R: Rewriter>(
    rewriter: &mut R,
    field: FieldDefinitionExpr,
) -> FieldDefinitionExpr {
    match field {
        FieldDefinitionExpr::All => FieldDefinitionExpr::All,
        FieldDefinitionExpr::AllInTable(name) => {
            FieldDefinitionExpr::AllInTable(rewriter.rewrite_qualified_name(name))
        }
        FieldDefinitionExpr::Expr { expr, alias } => FieldDefinitionExpr::Expr {
            expr: rewriter.rewrite_expr(expr),
            alias: alias.map(|alias| rewriter.rewrite_identifier(alias)),
        },
    }
}

pub fn walk_relation<R: Rewriter>(rewriter: &mut R, relation: Relation) -> Relation {
    match relation {
        Relation::Table(table) => Relation::Table(rewriter.rewrite_table(table)),
        Relation::Aliased(aliased) => Relation::Aliased(rewriter.rewrite_aliased_relation(aliased)),
        Relation::Join(join) => Relation::Join(rewriter.rewrite_join_clause(join)),
        Relation::Subquery { lateral, query } => Relation::Subquery {
            lateral,
            query: rewrite_boxed_query(rewriter, query),
        },
        Relation::Unnest {
            exprs,
            with_ordinality,
        } => Relation::Unnest {
            exprs: rewrite_exprs(rewriter, exprs),
            with_ordinality,
        },
    }
}

pub fn walk_table<R: Rewriter>(rewriter: &mut R, table: Table) -> Table {
    Table {
        name: rewriter.rewrite_qualified_name(table.name),
    }
}

pub fn walk_aliased_relation<R: Rewriter>(
    rewriter: &mut R,
    aliased: AliasedRelation,
) -> AliasedRelation {
    AliasedRelation {
        relation: Box::new(rewriter.rewrite_relation(*aliased.relation)),
        alias: rewriter.rewrite_identifier(aliased.alias),
        column_names: aliased
            .column_names
            .into_iter()
            .map(|c| rewriter.rewrite_identifier(c))
            .collect(),
    }
}

pub fn walk_join_clause<R: Rewriter>(rewriter: &mut R, join: JoinClause) -> JoinClause {
    JoinClause {
        operator: join.operator,
        left: Box::new(rewriter.rewrite_relation(*join.left)),
        right: Box::new(rewriter.rewrite_relation(*join.right)),
        constraint: rewriter.rewrite_join_constraint(join.constraint),
    }
}

pub fn walk_join_constraint<R: Rewriter>(
    rewriter: &mut R,
    constraint: JoinConstraint,
) -> JoinConstraint {
    match constraint {
        JoinConstraint::On(expr) => JoinConstraint::On(rewriter.rewrite_expr(expr)),
        JoinConstraint::Using(columns) => JoinConstraint::Using(
            columns
                .into_iter()
                .map(|c| rewriter.rewrite_identifier(c))
                .collect(),
        ),
        JoinConstraint::Empty => JoinConstraint::Empty,
    }
}

pub fn walk_order_clause<R: Rewriter>(rewriter: &mut R, order: OrderClause) -> OrderClause {
    OrderClause {
        order_by: order
            .order_by
            .into_iter()
            .map(|order_by| OrderBy {
                field: rewriter.rewrite_expr(order_by.field),
                order_type: order_by.order_type,
                null_order: order_by.null_order,
            })
            .collect(),
    }
}

pub fn walk_in_value<R: Rewriter>(rewriter: &mut R, in_value: InValue) -> InValue {
    match in_value {
        InValue::List(exprs) => InValue::List(rewrite_exprs(rewriter, exprs)),
        InValue::Subquery(query) => InValue::Subquery(rewrite_boxed_query(rewriter, query)),
    }
}

pub fn walk_function_expr<R: Rewriter>(rewriter: &mut R, function: FunctionExpr) -> FunctionExpr {
    FunctionExpr {
        name: rewriter.rewrite_qualified_name(function.name),
        arguments: function.arguments.map(|arguments| FunctionArguments {
            distinct: arguments.distinct,
            args: arguments
                .args
                .into_iter()
                .map(|arg| match arg {
                    FunctionArgument::Expr(expr) => FunctionArgument::Expr(rewriter.rewrite_expr(expr)),
                    FunctionArgument::Wildcard => FunctionArgument::Wildcard,
                })
                .collect(),
        }),
        over: function.over.map(|over| rewriter.rewrite_window_spec(over)),
    }
}

pub fn walk_window_spec<R: Rewriter>(rewriter: &mut R, window: WindowSpec) -> WindowSpec {
    WindowSpec {
        partition_by: rewrite_exprs(rewriter, window.partition_by),
        order: window.order.map(|order| rewriter.rewrite_order_clause(order)),
        frame: window.frame,
    }
}

pub fn walk_expr<R: Rewriter>(rewriter: &mut R, expr: Expr) -> Expr {
    match expr {
        Expr::Literal(literal) => Expr::Literal(rewriter.rewrite_literal(literal)),
        Expr::Identifier(ident) => Expr::Identifier(rewriter.rewrite_identifier(ident)),
        Expr::Dereference { base, field } => Expr::Dereference {
            base: rewrite_boxed_expr(rewriter, base),
            field: rewriter.rewrite_identifier(field),
        },
        Expr::BinaryOp { lhs, op, rhs } => Expr::BinaryOp {
            lhs: rewrite_boxed_expr(rewriter, lhs),
            op,
            rhs: rewrite_boxed_expr(rewriter, rhs),
        },
        Expr::UnaryOp { op, rhs } => Expr::UnaryOp {
            op,
            rhs: rewrite_boxed_expr(rewriter, rhs),
        },
        Expr::Between {
            operand,
            min,
            max,
            negated,
        } => Expr::Between {
            operand: rewrite_boxed_expr(rewriter, operand),
            min: rewrite_boxed_expr(rewriter, min),
            max: rewrite_boxed_expr(rewriter, max),
            negated,
        },
        Expr::In { lhs, rhs, negated } => Expr::In {
            lhs: rewrite_boxed_expr(rewriter, lhs),
            rhs: rewriter.rewrite_in_value(rhs),
            negated,
        },
        Expr::IsNull { expr, negated } => Expr::IsNull {
            expr: rewrite_boxed_expr(rewriter, expr),
            negated,
        },
        Expr::Like {
            expr,
            pattern,
            negated,
            case_insensitive,
            escape,
        } => Expr::Like {
            expr: rewrite_boxed_expr(rewriter, expr),
            pattern: rewrite_boxed_expr(rewriter, pattern),
            negated,
            case_insensitive,
            escape,
        },
        Expr::Case {
            operand,
            branches,
            else_expr,
        } => Expr::Case {
            operand: operand.map(|operand| rewrite_boxed_expr(rewriter, operand)),
            branches: branches
                .into_iter()
                .map(|branch| CaseWhenBranch {
                    condition: rewriter.rewrite_expr(branch.condition),
                    body: rewriter.rewrite_expr(branch.body),
                })
                .collect(),
            else_expr: else_expr.map(|else_expr| rewrite_boxed_expr(rewriter, else_expr)),
        },
        Expr::Interval(interval) => Expr::Interval(IntervalExpr {
            value: rewrite_boxed_expr(rewriter, interval.value),
            ..interval
        }),
        Expr::Exists(query) => Expr::Exists(rewrite_boxed_query(rewriter, query)),
        Expr::Subquery(query) => Expr::Subquery(rewrite_boxed_query(rewriter, query)),
        Expr::Call(function) => Expr::Call(rewriter.rewrite_function_expr(function)),
        Expr::Cast { expr, ty, style } => Expr::Cast {
            expr: rewrite_boxed_expr(rewriter, expr),
            ty,
            style,
        },
        Expr::Array(exprs) => Expr::Array(rewrite_exprs(rewriter, exprs)),
        Expr::Row(exprs) => Expr::Row(rewrite_exprs(rewriter, exprs)),
    }
}
