//! Logging setup shared by the eventview binaries. All logging goes through [tracing]; this crate
//! only installs and configures the global subscriber.

use clap::{Args, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Corresponds to [`tracing_subscriber::fmt::format::Compact`]
    Compact,

    /// Corresponds to [`tracing_subscriber::fmt::format::Full`]
    #[default]
    Full,

    /// Corresponds to [`tracing_subscriber::fmt::format::Pretty`]
    Pretty,

    /// Corresponds to [`tracing_subscriber::fmt::format::Json`]
    Json,
}

fn warn_if_debug_build() {
    #[cfg(debug_assertions)]
    warn!("Running a debug build")
}

#[derive(Debug, Clone, Args)]
#[group(id = "logging")]
pub struct Options {
    /// Format to use when emitting log events.
    #[arg(long, env = "LOG_FORMAT", default_value = "full", value_enum)]
    pub log_format: LogFormat,

    /// Log level filter for spans and events. The log level filter string is a comma separated
    /// list of directives.
    /// See [`tracing_subscriber::EnvFilter`] for full documentation on the directive syntax.
    ///
    /// Examples:
    ///
    /// Log at INFO level for all crates and dependencies.
    /// ```bash
    /// LOG_LEVEL=info
    /// ```
    ///
    /// Log every rewrite decision, and nothing below WARN from anywhere else.
    /// ```bash
    /// LOG_LEVEL=warn,eventview_sql_passes=trace
    /// ```
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Disable colors in all log output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: "info".to_owned(),
            no_color: false,
        }
    }
}

impl Options {
    fn filter(&self) -> anyhow::Result<EnvFilter> {
        Ok(EnvFilter::try_new(&self.log_level)?)
    }

    /// Install the global subscriber. Logs are written to stderr so they never mix with query
    /// output on stdout.
    pub fn init(&self) -> anyhow::Result<()> {
        let s = tracing_subscriber::fmt()
            .with_env_filter(self.filter()?)
            .with_ansi(!self.no_color)
            .with_writer(std::io::stderr);

        match self.log_format {
            LogFormat::Compact => s.compact().try_init(),
            LogFormat::Full => s.try_init(),
            LogFormat::Pretty => s.pretty().try_init(),
            LogFormat::Json => s.json().with_current_span(true).try_init(),
        }
        .map_err(|e| anyhow::anyhow!(e))?;

        warn_if_debug_build();

        Ok(())
    }
}

/// Configure the global tracing subscriber for logging inside of tests
pub fn init_test_logging() {
    // This errors out if it's already been called within the scope of a process, which we don't
    // care about, so we just discard the result
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("LOG_LEVEL"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        logging: Options,
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.logging.log_format, LogFormat::Full);
        assert_eq!(cli.logging.log_level, "info");
    }

    #[test]
    fn parse_flags() {
        let cli = Cli::try_parse_from([
            "test",
            "--log-format",
            "json",
            "--log-level",
            "debug,eventview=trace",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.logging.log_format, LogFormat::Json);
        assert!(cli.logging.no_color);
        cli.logging.filter().unwrap();
    }

    #[test]
    fn no_color_env_accepts_numeric_values() {
        // SAFETY: no other test in this crate reads or writes NO_COLOR expecting it unset
        unsafe { std::env::set_var("NO_COLOR", "1") };
        let enabled = Cli::try_parse_from(["test"]).map(|cli| cli.logging.no_color);
        unsafe { std::env::set_var("NO_COLOR", "0") };
        let disabled = Cli::try_parse_from(["test"]).map(|cli| cli.logging.no_color);
        unsafe { std::env::remove_var("NO_COLOR") };

        assert!(enabled.unwrap());
        assert!(!disabled.unwrap());
    }

    #[test]
    fn invalid_format_is_rejected() {
        assert!(Cli::try_parse_from(["test", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn invalid_level_is_rejected() {
        let options = Options {
            log_level: "info,eventview=loud".to_owned(),
            ..Options::default()
        };
        assert!(options.filter().is_err());
    }
}
