use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::ConfigError;
use dimse::DimseConfig;

/// Fallback local AE title used when a requested local identity is not configured
pub const DEFAULT_LOCAL_AE_TITLE: &str = "MCP_DICOM";

/// Transport the MCP server is exposed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over HTTP POST on `/mcp`
    #[default]
    Http,
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub id: String,
    pub bind_address: String,
    pub bind_port: u16,
    pub transport: Transport,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            id: "dicom-mcp".to_string(),
            bind_address: "0.0.0.0".to_string(),
            bind_port: 8080,
            transport: Transport::Http,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.bind_port)
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.bind_address.clone()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::InvalidServerId);
        }
        if self.bind_port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        self.socket_addr()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Nodes file; relative paths are resolved against the service's own directory
    pub nodes_file: PathBuf,
    pub default_local_ae_title: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            nodes_file: PathBuf::from("nodes.yaml"),
            default_local_ae_title: DEFAULT_LOCAL_AE_TITLE.to_string(),
        }
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        dimse::validate_ae_title(&self.default_local_ae_title)
            .map_err(|e| ConfigError::InvalidAeTitle(e.to_string()))
    }
}

/// Association settings applied to every outbound C-ECHO.
/// These are service-side only; tool callers cannot override them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DimseSettings {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub max_pdu: u32,
}

impl Default for DimseSettings {
    fn default() -> Self {
        let base = DimseConfig::default();
        Self {
            connect_timeout_ms: base.connect_timeout_ms,
            read_timeout_ms: base.read_timeout_ms,
            max_pdu: base.max_pdu,
        }
    }
}

impl DimseSettings {
    /// SCU configuration presenting `local_aet` as the calling AE title
    pub fn to_dimse_config(&self, local_aet: impl Into<String>) -> DimseConfig {
        DimseConfig {
            local_aet: local_aet.into(),
            max_pdu: self.max_pdu,
            connect_timeout_ms: self.connect_timeout_ms,
            read_timeout_ms: self.read_timeout_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.to_dimse_config(DEFAULT_LOCAL_AE_TITLE)
            .validate()
            .map_err(|e| ConfigError::InvalidDimse(e.to_string()))
    }
}
