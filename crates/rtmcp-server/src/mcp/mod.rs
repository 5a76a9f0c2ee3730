//! MCP (Model Context Protocol) server implementation.
//!
//! Provides MCP protocol support over stdio (default) or streamable HTTP.

pub mod schema;
pub mod server;
pub mod transport;

pub use server::McpServer;
