//! MCP client configuration.
//!
//! Agents discover servers through a JSON file of the form
//!
//! ```json
//! { "mcpServers": { "katana": { "command": "/usr/local/bin/rtmcp-server", "args": ["katana"] } } }
//! ```
//!
//! Each tool gets its own server entry; the tool name is the last,
//! positional argument.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::registry::ToolRegistry;

/// Name of the entry that serves every tool from one process
pub const COMBINED_SERVER_NAME: &str = "red_team";

/// Top-level client config document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpClientConfig {
    #[serde(rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, McpServerEntry>,
}

/// How an agent launches one server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerEntry {
    pub command: String,
    pub args: Vec<String>,
}

/// Options for [`McpClientConfig::generate`]
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Path of the `rtmcp-server` binary
    pub server_command: PathBuf,
    /// Config file to pass along with `--config`
    pub config_path: Option<PathBuf>,
    /// Also emit the all-tools entry
    pub combined: bool,
}

impl GenerateOptions {
    pub fn new(server_command: impl Into<PathBuf>) -> Self {
        Self {
            server_command: server_command.into(),
            config_path: None,
            combined: false,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_combined(mut self, combined: bool) -> Self {
        self.combined = combined;
        self
    }

    fn base_args(&self) -> Vec<String> {
        match &self.config_path {
            Some(path) => vec!["--config".to_string(), display(path)],
            None => Vec::new(),
        }
    }
}

impl McpClientConfig {
    /// One server entry per registered tool (plus the combined entry if asked).
    pub fn generate(registry: &ToolRegistry, options: &GenerateOptions) -> Self {
        let command = display(&options.server_command);
        let mut mcp_servers = BTreeMap::new();

        for tool in registry.tools() {
            let mut args = options.base_args();
            args.push(tool.name.clone());
            mcp_servers.insert(
                tool.name.clone(),
                McpServerEntry {
                    command: command.clone(),
                    args,
                },
            );
        }

        if options.combined {
            mcp_servers.insert(
                COMBINED_SERVER_NAME.to_string(),
                McpServerEntry {
                    command,
                    args: options.base_args(),
                },
            );
        }

        Self { mcp_servers }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
