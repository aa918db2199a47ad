use crate::config::Transport;
use crate::mcp::McpServer;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub mod http;
pub mod stdio;

pub use http::HttpAdapter;
pub use stdio::StdioAdapter;

/// Protocol adapter trait
///
/// Each transport (HTTP, stdio) implements this trait to move JSON-RPC
/// messages between its I/O and the shared [`McpServer`].
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Returns the transport this adapter handles
    fn transport(&self) -> Transport;

    /// Start the adapter (listener, reader loop, etc.)
    ///
    /// # Arguments
    /// * `server` - MCP dispatcher shared by all requests
    /// * `shutdown` - Cancellation token for graceful shutdown
    ///
    /// # Returns
    /// JoinHandle for the adapter task
    async fn start(
        &self,
        server: Arc<McpServer>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<JoinHandle<()>>;

    /// Returns a human-readable summary of the adapter configuration
    /// Used for logging and debugging
    fn summary(&self) -> String;
}
