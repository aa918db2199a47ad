use crate::adapters::ProtocolAdapter;
use crate::config::Transport;
use crate::mcp::McpServer;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub mod router;

/// HTTP Protocol Adapter
///
/// Wraps an Axum HTTP server that accepts one JSON-RPC message per POST.
pub struct HttpAdapter {
    pub bind_addr: SocketAddr,
}

impl HttpAdapter {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }
}

#[async_trait]
impl ProtocolAdapter for HttpAdapter {
    fn transport(&self) -> Transport {
        Transport::Http
    }

    async fn start(
        &self,
        server: Arc<McpServer>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<JoinHandle<()>> {
        let bind_addr = self.bind_addr;
        let app = router::build_router(server);

        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind HTTP adapter to {}: {}", bind_addr, e))?;

        tracing::info!("🚀 MCP HTTP adapter listening on {}{}", bind_addr, router::MCP_PATH);

        Ok(tokio::spawn(async move {
            // Create a future for graceful shutdown
            let graceful_shutdown = async move {
                shutdown.cancelled().await;
            };

            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(graceful_shutdown)
                .await
            {
                tracing::error!("HTTP adapter on {} encountered error: {}", bind_addr, e);
            }

            tracing::info!("HTTP adapter on {} shut down", bind_addr);
        }))
    }

    fn summary(&self) -> String {
        format!("HttpAdapter(bind={}, path={})", self.bind_addr, router::MCP_PATH)
    }
}
