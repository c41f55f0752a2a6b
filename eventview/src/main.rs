use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use eventview::{RewriteRequest, RewriteService};
use eventview_sql::Dialect;
use eventview_sql_passes::ViewSelection;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// The rewritten SQL text
    Sql,
    /// The rewrite response document, as JSON
    Json,
    /// The rewritten syntax tree, as JSON
    Ast,
}

/// Redirect reads of the logical events table to the view matching each query's filters
#[derive(Parser, Debug)]
#[command(name = "eventview", version)]
struct Options {
    /// Query to rewrite. If neither this nor `--file` is given, the query is read from stdin.
    #[arg(short, long, conflicts_with = "file")]
    query: Option<String>,

    /// Path to a file containing the query to rewrite
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// SQL dialect to parse and format queries with
    #[arg(long, env = "EVENTVIEW_DIALECT", default_value = "trino", value_enum)]
    dialect: Dialect,

    /// Path to a JSON file describing the logical table and its views, in priority order.
    ///
    /// Example:
    ///
    /// ```json
    /// {"logical_table": "events",
    ///  "views": [{"columns": ["id"], "view": "events_by_id"}]}
    /// ```
    #[arg(long, env = "EVENTVIEW_VIEWS")]
    views: Option<PathBuf>,

    /// What to print on success
    #[arg(long, default_value = "sql", value_enum)]
    output: OutputFormat,

    #[command(flatten)]
    logging: eventview_logging::Options,
}

impl Options {
    fn load_views(&self) -> anyhow::Result<ViewSelection> {
        let Some(path) = &self.views else {
            return Ok(ViewSelection::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading view configuration from {}", path.display()))?;
        let views = ViewSelection::from_json(&json)
            .with_context(|| format!("loading view configuration from {}", path.display()))?;
        info!(path = %path.display(), logical_table = %views.logical_table, "Loaded views");
        Ok(views)
    }

    fn read_query(&self) -> anyhow::Result<String> {
        if let Some(query) = &self.query {
            return Ok(query.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading query from {}", path.display()));
        }
        let mut sql = String::new();
        std::io::stdin()
            .read_to_string(&mut sql)
            .context("reading query from stdin")?;
        Ok(sql)
    }

    fn run(self) -> anyhow::Result<ExitCode> {
        let service = RewriteService::new(self.load_views()?, self.dialect);
        let request = RewriteRequest::from(self.read_query()?);
        debug!(dialect = %self.dialect, "Rewriting query");

        let failed = match self.output {
            OutputFormat::Ast => match service.rewrite_tree(&request.sql) {
                Ok(tree) => {
                    println!("{}", serde_json::to_string_pretty(&tree)?);
                    false
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    true
                }
            },
            OutputFormat::Json => {
                let response = service.handle(&request);
                println!("{}", serde_json::to_string_pretty(&response)?);
                response.is_error()
            }
            OutputFormat::Sql => {
                let response = service.handle(&request);
                if let Some(sql) = &response.sql {
                    print!("{sql}");
                }
                if let Some(message) = &response.error_message {
                    eprintln!("error: {message}");
                }
                response.is_error()
            }
        };

        Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let options = Options::parse();
    options.logging.init()?;
    options.run()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Options::command().debug_assert();
    }

    #[test]
    fn query_and_file_conflict() {
        assert!(Options::try_parse_from(["eventview", "-q", "select 1", "-f", "q.sql"]).is_err());
    }

    #[test]
    fn dialect_aliases() {
        let options =
            Options::try_parse_from(["eventview", "--dialect", "presto", "-q", "select 1"])
                .unwrap();
        assert_eq!(options.dialect, Dialect::Trino);
        assert_eq!(options.output, OutputFormat::Sql);
    }
}
