//! Parsing SQL text into an [`SqlQuery`] with `sqlparser`, and formatting it back.

use eventview_sql::{AstConversionError, Dialect, DialectDisplay, TryIntoDialect, ast::SqlQuery};
use sqlparser::parser::{Parser, ParserError};
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("sqlparser error: {0}")]
    SqlparserError(#[from] ParserError),
    #[error("AST conversion error: {0}")]
    AstConversionError(#[from] AstConversionError),
    #[error("no statement found in input")]
    Empty,
    #[error("expected a single statement, found {0}")]
    MultipleStatements(usize),
}

/// Parse a single SQL statement in the given dialect.
///
/// A trailing semicolon is accepted, but the input must hold exactly one statement.
pub fn parse_query(dialect: Dialect, input: impl AsRef<str>) -> Result<SqlQuery, ParsingError> {
    let input = input.as_ref();
    let sqlparser_dialect = dialect.sqlparser_dialect();
    let mut statements = Parser::parse_sql(sqlparser_dialect.as_ref(), input)?;
    let statement = match statements.len() {
        0 => return Err(ParsingError::Empty),
        1 => statements.remove(0),
        n => return Err(ParsingError::MultipleStatements(n)),
    };
    trace!(%statement, "parsed statement");
    statement.try_into_dialect(dialect).map_err(|error| {
        debug!(%error, input, "could not convert parsed statement");
        error.into()
    })
}

#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    #[error("formatted query does not parse: {source}\n{sql}")]
    Unparseable {
        sql: String,
        #[source]
        source: ParsingError,
    },
    #[error("formatted query does not parse back into the same query\n{sql}")]
    Mismatch { sql: String },
}

/// Display `query` as SQL in the given dialect, checking that the text parses back into the same
/// query.
///
/// The returned text always ends in exactly one newline.
pub fn format_query(query: &SqlQuery, dialect: Dialect) -> Result<String, FormattingError> {
    let sql = query.display(dialect).to_string();
    let reparsed = parse_query(dialect, &sql).map_err(|source| FormattingError::Unparseable {
        sql: sql.clone(),
        source,
    })?;
    if &reparsed != query {
        debug!(?reparsed, ?query, "formatted query changed on re-parse");
        return Err(FormattingError::Mismatch { sql });
    }
    let mut sql = sql.trim_end_matches('\n').to_owned();
    sql.push('\n');
    Ok(sql)
}
