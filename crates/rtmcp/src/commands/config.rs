//! Configuration commands.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rtmcp_core::client_config::{GenerateOptions, McpClientConfig};
use rtmcp_core::config::ToolConfig;
use rtmcp_core::{Config, ToolDescriptor, ToolRegistry};
use std::path::{Path, PathBuf};

use crate::cli::{ConfigAction, ConfigCommand};

const SERVER_BIN: &str = "rtmcp-server";

pub async fn execute(cmd: ConfigCommand, config: &Config, config_path: &Path) -> Result<()> {
    match cmd.action {
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Show => {
            let registry = ToolRegistry::from_config(config)?;
            print!("{}", toml::to_string_pretty(&expand(config, &registry))?);
        }
        ConfigAction::Init { force } => {
            init(config_path, force)?;
            println!(
                "{} Wrote {}",
                "✓".green(),
                config_path.display().to_string().bold()
            );
        }
        ConfigAction::Mcp {
            server_bin,
            combined,
            output,
        } => {
            let registry = ToolRegistry::from_config(config)?;
            let server = server_bin
                .or_else(server_binary)
                .unwrap_or_else(|| PathBuf::from(SERVER_BIN));

            let mut options = GenerateOptions::new(server).with_combined(combined);
            if config_path.exists() {
                options = options.with_config_path(absolute(config_path));
            }

            let json = McpClientConfig::generate(&registry, &options).to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", json))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("{} Wrote {}", "✓".green(), path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

/// Write a config file spelling out every built-in tool.
fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = Config::default();
    let registry = ToolRegistry::builtin()?;
    expand(&config, &registry)
        .save_to(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// The effective tool table as a config document.
fn expand(config: &Config, registry: &ToolRegistry) -> Config {
    Config {
        defaults: config.defaults.clone(),
        tools: registry
            .tools()
            .map(|tool| (tool.name.clone(), tool_config(tool)))
            .collect(),
    }
}

fn tool_config(tool: &ToolDescriptor) -> ToolConfig {
    ToolConfig {
        executable: Some(tool.executable.clone()),
        default_args: Some(tool.default_args.clone()),
        description: (!tool.description.is_empty()).then(|| tool.description.clone()),
        timeout_secs: tool.timeout_secs,
        presets: (!tool.presets.is_empty()).then(|| tool.presets.clone()),
        enabled: true,
    }
}

/// Locate `rtmcp-server`: next to this binary first, then on PATH.
pub fn server_binary() -> Option<PathBuf> {
    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SERVER_BIN)))
        .filter(|path| path.is_file());

    sibling.or_else(|| which::which(SERVER_BIN).ok())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
