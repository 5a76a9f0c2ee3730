//! MCP Server implementation.
//!
//! Tools are not known at compile time: every descriptor in the registry
//! (and every preset of it) becomes one MCP tool, so listing and dispatch
//! are implemented by hand instead of through `#[tool_router]`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, JsonObject, ListToolsResult,
        PaginatedRequestParam, ResourceContents, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    ErrorData, RoleServer, ServerHandler,
};
use rtmcp_core::{Entry, PresetRequest, ToolInvocationRequest, ToolOutput};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::schema;
use crate::state::AppState;

/// rtmcp MCP Server
///
/// Exposes one MCP tool per wrapped executable.
#[derive(Clone)]
pub struct McpServer {
    state: Arc<AppState>,
}

impl McpServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// All tools in scope, presets after their tool.
    pub fn tools(&self) -> Vec<Tool> {
        let mut tools = Vec::new();
        for descriptor in self.state.runner.registry().tools() {
            tools.push(schema::tool_entry(descriptor));
            for preset in &descriptor.presets {
                tools.push(schema::preset_entry(descriptor, preset));
            }
        }
        tools
    }

    /// Run one tool call.
    ///
    /// Unknown names and undecodable arguments are protocol errors; anything
    /// that goes wrong while resolving or running the tool is returned as an
    /// error result so the agent sees the message.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let runner = &self.state.runner;
        let is_preset = match runner.registry().lookup(name) {
            Ok(Entry::Tool(_)) => false,
            Ok(Entry::Preset(..)) => true,
            Err(e) => return Err(protocol_error(e)),
        };

        let result = if is_preset {
            let request: PresetRequest = parse_arguments(arguments)?;
            runner.invoke_preset(name, &request).await
        } else {
            let request: ToolInvocationRequest = parse_arguments(arguments)?;
            runner.invoke(name, &request).await
        };

        Ok(to_call_result(name, result))
    }

    /// [`dispatch`](Self::dispatch) unless `cancelled` completes first.
    ///
    /// Losing the race drops the dispatch future, which kills the child.
    pub async fn dispatch_until(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        cancelled: impl Future<Output = ()>,
    ) -> Result<CallToolResult, ErrorData> {
        tokio::select! {
            result = self.dispatch(name, arguments) => result,
            _ = cancelled => {
                warn!("{} cancelled by client", name);
                Err(ErrorData::internal_error(format!("{} was cancelled", name), None))
            }
        }
    }

    fn instructions(&self) -> String {
        let names = self.state.runner.registry().names().join(", ");
        match &self.state.scope {
            Some(tool) => format!(
                "Wraps the {} command-line tool. Call it with CLI flags in `args`; \
                 the raw text output of the command is returned.",
                tool
            ),
            None => format!(
                "Red team MCP server exposing security command-line tools ({}). \
                 Call a tool with CLI flags in `args`; the raw text output of the command \
                 is returned. Preset tools (<tool>_<preset>) take a `target`.",
                names
            ),
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T, ErrorData> {
    let value = serde_json::Value::Object(arguments.unwrap_or_default());
    serde_json::from_value(value)
        .map_err(|e| ErrorData::invalid_params(format!("Invalid arguments: {}", e), None))
}

/// Request faults map to `invalid_params`, anything else to `internal_error`.
fn protocol_error(e: rtmcp_core::Error) -> ErrorData {
    if e.is_caller_error() {
        ErrorData::invalid_params(e.to_string(), None)
    } else {
        ErrorData::internal_error(e.to_string(), None)
    }
}

fn to_call_result(name: &str, result: rtmcp_core::Result<ToolOutput>) -> CallToolResult {
    match result {
        Ok(output) => CallToolResult::success(vec![output_content(name, &output)]),
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

/// Text when stdout is UTF-8, otherwise the exact bytes as a base64 blob.
fn output_content(name: &str, output: &ToolOutput) -> Content {
    match output.as_utf8() {
        Some(text) => Content::text(text),
        None => Content::resource(ResourceContents::BlobResourceContents {
            uri: format!("rtmcp://{}/stdout", name),
            mime_type: Some("application/octet-stream".to_string()),
            blob: STANDARD.encode(&output.stdout),
            meta: None,
        }),
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            let tools = self.tools();
            debug!("list_tools: returning {} tools", tools.len());
            Ok(ListToolsResult {
                tools,
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        debug!("Calling tool: {}", request.name);
        async move {
            let name = request.name.to_string();
            self.dispatch_until(&name, request.arguments, context.ct.cancelled())
                .await
        }
    }
}
