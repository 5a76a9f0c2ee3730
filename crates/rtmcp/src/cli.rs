//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// rtmcp - security tools behind a uniform MCP interface
#[derive(Parser, Debug)]
#[command(name = "rtmcp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ~/.rtmcp/config.toml)
    #[arg(short, long, global = true, env = "RTMCP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured tools and presets
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Run a tool locally, exactly as the MCP server would
    ///
    /// Everything after the tool name is forwarded to the tool. Options for
    /// rtmcp itself (such as --target) go before the tool name.
    Run {
        /// Target for preset tools (e.g. nmap_ping_sweep)
        #[arg(short, long)]
        target: Option<String>,

        /// Preset parameter, repeatable (e.g. --param ports=80,443)
        #[arg(short = 'P', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Tool or preset tool name
        tool: String,

        /// Flags forwarded to the tool; empty means the tool's defaults
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Check that configured executables are installed
    Doctor,

    /// Configuration management
    Config(ConfigCommand),

    /// Show version
    Version,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config file path
    Path,

    /// Print the effective tool table
    Show,

    /// Write a config file listing every built-in tool
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate the MCP client configuration (mcpServers JSON)
    Mcp {
        /// Path of the rtmcp-server binary (detected when omitted)
        #[arg(long)]
        server_bin: Option<PathBuf>,

        /// Add one entry that serves every tool
        #[arg(long)]
        combined: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
