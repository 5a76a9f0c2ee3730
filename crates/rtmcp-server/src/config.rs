//! Server configuration (command line).

use clap::{Parser, ValueEnum};
use rtmcp_core::Config;
use std::net::SocketAddr;
use std::path::PathBuf;

/// MCP server wrapping security command-line tools
#[derive(Parser, Debug, Clone)]
#[command(name = "rtmcp-server")]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    /// Tool to serve; serves every configured tool when omitted
    pub tool: Option<String>,

    /// Config file (defaults to ~/.rtmcp/config.toml)
    #[arg(short, long, env = "RTMCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// MCP transport
    #[arg(short, long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// Streamable HTTP at /mcp
    Http,
}

impl ServerArgs {
    /// Config file to load
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::config_path)
    }
}
