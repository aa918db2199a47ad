//! The DICOM tools offered over MCP: `list_dicom_nodes`, `dicom_cecho` and
//! `dicom_cecho_by_name`.

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::directory::{DirectoryService, NodeListing};
use crate::mcp::protocol::ToolDefinition;
use crate::verification::{EchoRequest, VerificationResult, Verifier};

pub const LIST_DICOM_NODES: &str = "list_dicom_nodes";
pub const DICOM_CECHO: &str = "dicom_cecho";
pub const DICOM_CECHO_BY_NAME: &str = "dicom_cecho_by_name";

/// Local AE name looked up when `dicom_cecho_by_name` is called without one
pub const DEFAULT_LOCAL_AE_NAME: &str = "default";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        source: serde_json::Error,
    },
    #[error("Failed to serialize result: {0}")]
    Serialization(serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CEchoArgs {
    pub remote_ae_title: String,
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub local_ae_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CEchoByNameArgs {
    pub node_name: String,
    #[serde(default = "default_local_ae_name")]
    pub local_ae_name: String,
}

fn default_local_ae_name() -> String {
    DEFAULT_LOCAL_AE_NAME.to_string()
}

/// Value returned by a tool, with whether the caller should treat it as a failure
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub value: Value,
    pub is_error: bool,
}

pub struct DicomTools {
    directory: DirectoryService,
    verifier: Arc<dyn Verifier>,
}

impl DicomTools {
    pub fn new(directory: DirectoryService, verifier: Arc<dyn Verifier>) -> Self {
        Self {
            directory,
            verifier,
        }
    }

    pub async fn list_dicom_nodes(&self) -> NodeListing {
        info!("Listing DICOM nodes");
        self.directory.load_snapshot().await.into_listing()
    }

    pub async fn dicom_cecho(&self, args: CEchoArgs) -> VerificationResult {
        let local_ae_title = args
            .local_ae_title
            .unwrap_or_else(|| self.directory.default_local_ae().to_string());

        self.verifier
            .verify(EchoRequest {
                remote_ae_title: args.remote_ae_title,
                host: args.ip,
                port: args.port,
                local_ae_title,
            })
            .await
    }

    pub async fn dicom_cecho_by_name(&self, args: CEchoByNameArgs) -> VerificationResult {
        info!(
            "Attempting C-ECHO to node '{}' using local AE '{}'",
            args.node_name, args.local_ae_name
        );

        // One snapshot serves both lookups
        let directory = self.directory.load_snapshot().await;

        let node = match directory.resolve_peer(&args.node_name) {
            Ok(node) => node,
            Err(e) => return VerificationResult::failure(e.to_string()),
        };

        let local = directory
            .resolve_local_identity(&args.local_ae_name, self.directory.default_local_ae());

        self.verifier
            .verify(EchoRequest {
                remote_ae_title: node.ae_title,
                host: node.host,
                port: node.port,
                local_ae_title: local.ae_title().to_string(),
            })
            .await
    }

    /// Dispatch a `tools/call` by name
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> Result<ToolOutput, ToolError> {
        let arguments = arguments.unwrap_or_else(|| json!({}));

        match name {
            LIST_DICOM_NODES => {
                let listing = self.list_dicom_nodes().await;
                let value = serde_json::to_value(listing).map_err(ToolError::Serialization)?;
                Ok(ToolOutput {
                    value,
                    is_error: false,
                })
            }
            DICOM_CECHO => {
                let args: CEchoArgs = parse_args(DICOM_CECHO, arguments)?;
                verification_output(self.dicom_cecho(args).await)
            }
            DICOM_CECHO_BY_NAME => {
                let args: CEchoByNameArgs = parse_args(DICOM_CECHO_BY_NAME, arguments)?;
                verification_output(self.dicom_cecho_by_name(args).await)
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let default_local_ae = self.directory.default_local_ae();
        vec![
            ToolDefinition {
                name: LIST_DICOM_NODES,
                description: "List all configured DICOM nodes and local AE titles from the nodes configuration file.",
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                }),
            },
            ToolDefinition {
                name: DICOM_CECHO_BY_NAME,
                description: "Perform a DICOM C-ECHO verification with a remote node using its configured name.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "node_name": {
                            "type": "string",
                            "description": "The name of the remote node as configured in the nodes file",
                        },
                        "local_ae_name": {
                            "type": "string",
                            "description": "The name of the local AE title entry to use",
                            "default": DEFAULT_LOCAL_AE_NAME,
                        },
                    },
                    "required": ["node_name"],
                }),
            },
            ToolDefinition {
                name: DICOM_CECHO,
                description: "Perform a DICOM C-ECHO verification with a remote node given its AE title, address and port.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "remote_ae_title": {
                            "type": "string",
                            "description": "The AE title of the remote DICOM node",
                        },
                        "ip": {
                            "type": "string",
                            "description": "IP address or host name of the remote node",
                        },
                        "port": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 65535,
                            "description": "Port number of the remote node",
                        },
                        "local_ae_title": {
                            "type": "string",
                            "description": "The AE title to use for the local end",
                            "default": default_local_ae,
                        },
                    },
                    "required": ["remote_ae_title", "ip", "port"],
                }),
            },
        ]
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    tool: &'static str,
    arguments: Value,
) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments { tool, source })
}

fn verification_output(result: VerificationResult) -> Result<ToolOutput, ToolError> {
    let is_error = !result.success;
    let value = serde_json::to_value(result).map_err(ToolError::Serialization)?;
    Ok(ToolOutput { value, is_error })
}
