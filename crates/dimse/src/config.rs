//! Configuration types for DIMSE services

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DimseError, Result};

/// Maximum length of an Application Entity Title
pub const MAX_AE_TITLE_LEN: usize = 16;

/// Configuration for the local side of outbound DIMSE operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimseConfig {
    /// Local (calling) Application Entity Title
    pub local_aet: String,

    /// Maximum PDU size in bytes
    #[serde(default = "default_max_pdu")]
    pub max_pdu: u32,

    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Read timeout while waiting for association and DIMSE responses, in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

/// Remote DICOM node addressed by one association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNode {
    /// Remote Application Entity Title
    pub ae_title: String,

    /// Remote host address
    pub host: String,

    /// Remote port
    pub port: u16,
}

impl Default for DimseConfig {
    fn default() -> Self {
        Self {
            local_aet: "MCP_DICOM".to_string(),
            max_pdu: default_max_pdu(),
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl DimseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Get read timeout as Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_ae_title(&self.local_aet)?;

        // Validate PDU size
        if self.max_pdu < 4096 || self.max_pdu > 131072 {
            return Err(DimseError::config(
                "Max PDU size must be between 4096 and 131072 bytes",
            ));
        }

        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(DimseError::config("Timeouts must be greater than 0"));
        }

        Ok(())
    }
}

impl RemoteNode {
    /// Create a new remote node configuration
    pub fn new(ae_title: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            ae_title: ae_title.into(),
            host: host.into(),
            port,
        }
    }

    /// `host:port` form used when opening the association
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the remote node configuration
    pub fn validate(&self) -> Result<()> {
        validate_ae_title(&self.ae_title)?;

        if self.host.trim().is_empty() {
            return Err(DimseError::config("Remote host cannot be empty"));
        }

        if self.port == 0 {
            return Err(DimseError::config("Remote port must be greater than 0"));
        }

        Ok(())
    }
}

/// Check an AE title against the DICOM AE value representation:
/// 1-16 characters of printable ASCII, no backslash, not all spaces.
pub fn validate_ae_title(ae_title: &str) -> Result<()> {
    if ae_title.trim().is_empty() {
        return Err(DimseError::InvalidAeTitle(
            "AE title must not be empty".to_string(),
        ));
    }

    if ae_title.len() > MAX_AE_TITLE_LEN {
        return Err(DimseError::InvalidAeTitle(format!(
            "'{}' exceeds {} characters",
            ae_title, MAX_AE_TITLE_LEN
        )));
    }

    if let Some(c) = ae_title
        .chars()
        .find(|c| !c.is_ascii() || c.is_ascii_control() || *c == '\\')
    {
        return Err(DimseError::InvalidAeTitle(format!(
            "'{}' contains invalid character {:?}",
            ae_title, c
        )));
    }

    Ok(())
}

// Default value functions
fn default_max_pdu() -> u32 {
    16384
}

fn default_connect_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_read_timeout() -> u64 {
    30_000
}
