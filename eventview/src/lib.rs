//! Rewrites SQL text so that reads of the logical events table go to the narrowest matching view.
//!
//! [`RewriteService`] wraps the parse, rewrite and format steps behind a single request/response
//! pair whose JSON form is stable.

use eventview_sql::Dialect;
use eventview_sql_parsing::{format_query, parse_query};
use eventview_sql_passes::{EventViewRewrite, ViewSelection};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RewriteRequest {
    pub sql: String,
}

impl From<String> for RewriteRequest {
    fn from(sql: String) -> Self {
        Self { sql }
    }
}

/// Exactly one of `sql` and `error_message` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RewriteResponse {
    pub sql: Option<String>,
    pub error_message: Option<String>,
}

impl RewriteResponse {
    fn ok(sql: String) -> Self {
        Self {
            sql: Some(sql),
            error_message: None,
        }
    }

    fn error(error_message: String) -> Self {
        Self {
            sql: None,
            error_message: Some(error_message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RewriteService {
    views: ViewSelection,
    dialect: Dialect,
}

impl RewriteService {
    pub fn new(views: ViewSelection, dialect: Dialect) -> Self {
        Self { views, dialect }
    }

    /// Parse and rewrite `sql`, returning the rewritten tree
    pub fn rewrite_tree(
        &self,
        sql: &str,
    ) -> Result<eventview_sql::ast::SqlQuery, eventview_sql_parsing::ParsingError> {
        Ok(parse_query(self.dialect, sql)?.rewrite_event_views(&self.views))
    }

    #[instrument(level = "debug", skip_all)]
    pub fn handle(&self, request: &RewriteRequest) -> RewriteResponse {
        let query = match self.rewrite_tree(&request.sql) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, "Could not parse query");
                return RewriteResponse::error(e.to_string());
            }
        };
        match format_query(&query, self.dialect) {
            Ok(sql) => RewriteResponse::ok(sql),
            Err(e) => {
                error!(error = %e, "Could not format rewritten query");
                RewriteResponse::error(e.to_string())
            }
        }
    }
}
