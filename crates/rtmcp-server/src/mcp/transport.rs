//! Transports the server can be reached over.

use anyhow::{Context, Result};
use rmcp::{
    transport::{
        stdio,
        streamable_http_server::{session::local::LocalSessionManager, StreamableHttpService},
    },
    ServiceExt,
};
use std::net::SocketAddr;
use tracing::info;

use super::McpServer;

/// Serve over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: McpServer) -> Result<()> {
    info!("Serving MCP over stdio");
    let service = server
        .serve(stdio())
        .await
        .context("Failed to start stdio transport")?;
    let reason = service.waiting().await?;
    info!("Client disconnected: {:?}", reason);
    Ok(())
}

/// Serve streamable HTTP at `/mcp` until Ctrl-C.
pub async fn serve_http(server: McpServer, bind: SocketAddr) -> Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Serving MCP over HTTP at http://{}/mcp", bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;
    Ok(())
}
