pub mod adapters;
pub mod config;
pub mod directory;
pub mod mcp;
pub mod tools;
pub mod verification;

use std::sync::Arc;

use crate::adapters::{HttpAdapter, ProtocolAdapter, StdioAdapter};
use crate::config::{Config, LoggingConfig, Transport};
use crate::directory::{DirectoryService, NodeStore};
use crate::mcp::McpServer;
use crate::tools::DicomTools;
use crate::verification::DimseVerifier;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialise tracing. Output goes to stderr so stdout stays free for the stdio transport.
pub fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.log_to_file {
        let path = std::path::Path::new(&logging.log_file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;

        // Log to the file and to stderr
        let file_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(Arc::new(file));

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(stderr_layer)
            .try_init()?;
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()?;
    }

    Ok(())
}

/// Wire the directory, verifier and tools into a transport-independent server
pub fn build_server(config: &Config) -> McpServer {
    let directory = DirectoryService::new(
        NodeStore::new(config.nodes_path()),
        config.directory.default_local_ae_title.clone(),
    );
    let verifier = Arc::new(DimseVerifier::new(config.dimse.clone()));
    let tools = Arc::new(DicomTools::new(directory, verifier));

    McpServer::new(config.server.id.clone(), tools)
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    init_logging(&config.logging)?;

    tracing::info!("🔧 Starting DICOM MCP server '{}'", config.server.id);
    tracing::info!("Using nodes file {}", config.nodes_path().display());

    let server = Arc::new(build_server(&config));

    let adapter: Box<dyn ProtocolAdapter> = match config.server.transport {
        Transport::Http => Box::new(HttpAdapter::new(config.server.socket_addr()?)),
        Transport::Stdio => Box::new(StdioAdapter::new()),
    };
    tracing::info!(
        "Starting {:?} transport: {}",
        adapter.transport(),
        adapter.summary()
    );

    let shutdown = CancellationToken::new();
    let mut handle = adapter.start(server, shutdown.clone()).await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
            if let Err(e) = (&mut handle).await {
                tracing::error!("Adapter task failed during shutdown: {}", e);
            }
        }
        res = &mut handle => {
            if let Err(e) = res {
                tracing::error!("Adapter task failed: {}", e);
            }
        }
    }

    tracing::info!("DICOM MCP server stopped");
    Ok(())
}
