//! List command.

use anyhow::Result;
use colored::Colorize;
use rtmcp_core::{Config, ToolDescriptor, ToolRegistry};
use serde::Serialize;

/// One row of `rtmcp list --json`
#[derive(Debug, Serialize)]
struct ToolRow<'a> {
    #[serde(flatten)]
    tool: &'a ToolDescriptor,
    /// Resolved executable path, if installed
    installed: Option<String>,
    /// MCP tool names of the presets
    preset_tools: Vec<String>,
}

pub async fn execute(json: bool, config: &Config) -> Result<()> {
    let registry = ToolRegistry::from_config(config)?;

    if json {
        let rows: Vec<ToolRow> = registry.tools().map(row).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", "Tools".cyan().bold());
    println!("{}", "─".repeat(50));
    for tool in registry.tools() {
        let status = if tool.locate().is_some() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {} {}", status, tool.name.bold(), format!("({})", tool.executable).dimmed());
        if !tool.description.is_empty() {
            println!("      {}", tool.description);
        }
        println!("      defaults: {}", tool.default_args_display().yellow());
        for preset in &tool.presets {
            println!(
                "      {} {}",
                "preset".blue(),
                tool.preset_tool_name(preset)
            );
        }
    }
    println!();
    println!("{} tool(s)", registry.len());

    Ok(())
}

fn row(tool: &ToolDescriptor) -> ToolRow<'_> {
    ToolRow {
        tool,
        installed: tool.locate().map(|p| p.display().to_string()),
        preset_tools: tool
            .presets
            .iter()
            .map(|p| tool.preset_tool_name(p))
            .collect(),
    }
}
