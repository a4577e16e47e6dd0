//! Configuration management for `issue_tracker`.
//!
//! Settings are layered, lowest precedence first:
//! - Built-in defaults
//! - YAML config file (`--config` / `ISSUE_TRACKER_CONFIG`)
//! - Command-line flags and environment variables

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;
use crate::logging::LogFormat;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSONL persistence file. `None` keeps issues in memory only.
    pub data_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_file: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load settings from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the file cannot be read or `Parse` if it is not
    /// valid config YAML.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty file is a valid, empty config.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay any settings given on the command line or in the environment.
    #[must_use]
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(ref host) = cli.host {
            self.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(ref data_file) = cli.data_file {
            self.data_file = Some(data_file.clone());
        }
        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
        self
    }

    /// Defaults, then the config file named by `cli` (if any), then `cli`.
    ///
    /// # Errors
    ///
    /// Returns an error if the named config file cannot be loaded.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match cli.config {
            Some(ref path) => Self::load_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(cli))
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
