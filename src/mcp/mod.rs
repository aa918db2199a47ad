//! Model Context Protocol surface: JSON-RPC envelope and dispatch.

pub mod protocol;
pub mod server;

pub use server::McpServer;
