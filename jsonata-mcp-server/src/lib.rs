//! JSONata MCP server
//!
//! Exposes a single `evaluate` tool over the Model Context Protocol. The transport
//! is newline-delimited JSON-RPC 2.0 on stdin and stdout. Logs go to stderr.
//!
//! Example client configuration:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "jsonata": { "command": "/path/to/jsonata-mcp" }
//!   }
//! }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult, ToolError};
pub use server::McpServer;

/// Start the server on stdio with the given configuration
pub async fn start(config: ServerConfig) -> ServerResult<()> {
    McpServer::with_config(config).serve_stdio().await
}
