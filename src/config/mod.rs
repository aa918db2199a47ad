mod server_config;
mod logging_config;
pub mod config;

pub use config::{Config, ConfigError};
pub use logging_config::LoggingConfig;
pub use server_config::{
    DimseSettings, DirectoryConfig, ServerConfig, Transport, DEFAULT_LOCAL_AE_TITLE,
};

use clap::Parser;
use std::path::PathBuf;

/// Command line arguments of the `dicom-mcp` binary.
#[derive(Debug, Parser)]
#[command(name = "dicom-mcp", version, about = "DICOM node directory and C-ECHO tools over MCP")]
pub struct Cli {
    /// Path to the service configuration file (TOML).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Transport used to serve MCP requests.
    #[arg(short, long, value_enum)]
    pub transport: Option<Transport>,

    /// Path to the nodes file, overriding `directory.nodes_file`.
    #[arg(short, long)]
    pub nodes: Option<PathBuf>,
}
