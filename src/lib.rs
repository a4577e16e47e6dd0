//! `issue_tracker` - project-scoped issue tracker HTTP API
//!
//! This crate wires the `issues-lib` service to an axum server.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Layered configuration (defaults, YAML, flags/env)
//! - [`logging`] - tracing subscriber setup
//! - [`server`] - Router, request extraction, and response mapping

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod server;

use std::sync::Arc;

use anyhow::Context;
use issues_lib::{InMemoryStore, IssueService};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::ServerConfig;

/// Run the server.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if configuration, the data file, or the listener fails.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::resolve(&cli)?;
    logging::init_logging(cli.verbose, cli.quiet, config.log_format)?;

    let store = match config.data_file {
        Some(ref path) => InMemoryStore::open(path)
            .with_context(|| format!("failed to open data file {}", path.display()))?,
        None => {
            warn!("no data file configured; issues are kept in memory only");
            InMemoryStore::new()
        }
    };
    info!(path = ?store.jsonl_path(), "issue store ready");

    let service = IssueService::new(Arc::new(store));
    server::serve(&config, service).await
}
