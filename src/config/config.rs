use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::logging_config::LoggingConfig;
use crate::config::server_config::{DimseSettings, DirectoryConfig, ServerConfig};
use crate::config::Cli;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot determine the working directory: {0}")]
    CurrentDir(std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Server id must not be empty")]
    InvalidServerId,
    #[error("Invalid bind address '{0}'")]
    InvalidBindAddress(String),
    #[error("Bind port must be greater than 0")]
    InvalidPort,
    #[error("Invalid default local AE title: {0}")]
    InvalidAeTitle(String),
    #[error("DIMSE timeouts must be greater than 0")]
    InvalidTimeout,
    #[error("Invalid DIMSE settings: {0}")]
    InvalidDimse(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub directory: DirectoryConfig,
    pub dimse: DimseSettings,
    pub logging: LoggingConfig,

    /// Directory relative paths are resolved against; the config file's
    /// directory, or the executable's when no config file is used.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from command line arguments, optionally layered
    /// on a TOML file.
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::from_cli(&Cli::parse())
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self {
                base_dir: executable_dir(),
                ..Self::default()
            },
        };

        if let Some(transport) = cli.transport {
            config.server.transport = transport;
        }
        // Relative paths on the command line are relative to the working directory
        if let Some(nodes) = &cli.nodes {
            config.directory.nodes_file = if nodes.is_absolute() {
                nodes.clone()
            } else {
                std::env::current_dir()
                    .map_err(ConfigError::CurrentDir)?
                    .join(nodes)
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file. Does not validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text)?;
        config.base_dir = path.parent().map(|p| {
            if p.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                p.to_path_buf()
            }
        });
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.directory.validate()?;
        self.dimse.validate()?;
        Ok(())
    }

    /// Location of the nodes file
    pub fn nodes_path(&self) -> PathBuf {
        let nodes = &self.directory.nodes_file;
        if nodes.is_absolute() {
            return nodes.clone();
        }
        match &self.base_dir {
            Some(base) => base.join(nodes),
            None => nodes.clone(),
        }
    }
}

fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}
