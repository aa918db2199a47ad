use crate::adapters::ProtocolAdapter;
use crate::config::Transport;
use crate::mcp::protocol::{JsonRpcResponse, RpcError};
use crate::mcp::McpServer;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Stdio Protocol Adapter
///
/// Reads newline-delimited JSON-RPC messages from stdin and writes responses
/// to stdout. Logging must stay on stderr while this adapter runs.
#[derive(Debug, Default)]
pub struct StdioAdapter;

impl StdioAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Serve messages from `reader` until EOF or shutdown
pub async fn serve_lines<R, W>(
    server: Arc<McpServer>,
    reader: R,
    mut writer: W,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = reader.read_until(b'\n', &mut buf) => read?,
        };
        if read == 0 {
            tracing::info!("stdin closed");
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => server.handle_message(line.trim_end()).await,
            Err(e) => {
                tracing::warn!("Rejecting non UTF-8 input line: {}", e);
                Some(JsonRpcResponse::error(Value::Null, RpcError::parse_error(e)))
            }
        };

        if let Some(response) = response {
            let mut out = serde_json::to_vec(&response)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

#[async_trait]
impl ProtocolAdapter for StdioAdapter {
    fn transport(&self) -> Transport {
        Transport::Stdio
    }

    async fn start(
        &self,
        server: Arc<McpServer>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<JoinHandle<()>> {
        tracing::info!("🚀 MCP stdio adapter started");

        Ok(tokio::spawn(async move {
            if let Err(e) =
                serve_lines(server, tokio::io::stdin(), tokio::io::stdout(), shutdown).await
            {
                tracing::error!("stdio adapter encountered error: {}", e);
            }
            tracing::info!("stdio adapter shut down");
        }))
    }

    fn summary(&self) -> String {
        "StdioAdapter(newline-delimited JSON-RPC)".to_string()
    }
}
