//! Command-line interface for `issue_tracker`.
//!
//! Every setting can also come from the environment or the YAML config
//! file; see [`crate::config`] for precedence.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

/// issue-tracker - project-scoped issue tracker HTTP API.
#[derive(Parser, Debug, Default)]
#[command(name = "issue-tracker")]
#[command(
    author,
    version,
    about = "Project-scoped issue tracker HTTP API (JSONL-backed)",
    long_about = None,
    after_help = "Without --data-file, issues are kept in memory and lost on exit."
)]
pub struct Cli {
    /// YAML config file
    #[arg(long, env = "ISSUE_TRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "ISSUE_TRACKER_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// JSONL file issues are persisted to
    #[arg(long, env = "ISSUE_TRACKER_DATA")]
    pub data_file: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, env = "ISSUE_TRACKER_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "issue-tracker",
            "--port",
            "8080",
            "--data-file",
            "data/issues.jsonl",
            "--log-format",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.data_file, Some(PathBuf::from("data/issues.jsonl")));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["issue-tracker", "--port", "http"]).is_err());
    }
}
