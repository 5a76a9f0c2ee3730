//! rtmcp-server - MCP server for security command-line tools
//!
//! `rtmcp-server katana` serves a single tool; without a tool name every
//! configured tool is served from one process.

use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod mcp;
mod state;

use config::{ServerArgs, Transport};
use mcp::McpServer;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive("rtmcp_server=info".parse()?)
                .add_directive("rtmcp_core=info".parse()?),
        )
        .init();

    let args = ServerArgs::parse();
    info!("rtmcp-server v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::load(&args)?;
    let server = McpServer::new(Arc::new(state));

    match args.transport {
        Transport::Stdio => mcp::transport::serve_stdio(server).await,
        Transport::Http => mcp::transport::serve_http(server, args.bind).await,
    }
}
