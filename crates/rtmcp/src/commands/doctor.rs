//! Diagnostics command.

use anyhow::Result;
use colored::Colorize;
use rtmcp_core::{Config, ToolRegistry};
use std::path::Path;

pub async fn execute(config: &Config, config_path: &Path) -> Result<()> {
    println!("{}", "rtmcp Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    if config_path.exists() {
        println!("{}", format!("✓ {}", config_path.display()).green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check the tool table itself
    print!("  Tool table: ");
    let registry = match ToolRegistry::from_config(config) {
        Ok(registry) => {
            println!("{}", format!("✓ {} tool(s)", registry.len()).green());
            registry
        }
        Err(e) => {
            println!("{}", format!("✗ {}", e).red());
            issues.push(format!("Invalid tool configuration: {}", e));
            print_summary(&issues);
            return Ok(());
        }
    };

    print!("  Timeout: ");
    match config.defaults.timeout_for(None) {
        Some(timeout) => println!("{}s", timeout.as_secs()),
        None => println!("{}", "○ disabled".yellow()),
    }

    // Check executables
    println!();
    println!("  {}", "Executables:".cyan());
    for tool in registry.tools() {
        print!("    {} ({}): ", tool.name, tool.executable);
        match tool.locate() {
            Some(path) => println!("{}", format!("✓ {}", path.display()).green()),
            None => {
                println!("{}", "✗ not found".red());
                issues.push(format!("{} is not installed", tool.executable));
            }
        }
    }

    // Check server binary
    print!("  rtmcp-server: ");
    match super::config::server_binary() {
        Some(path) => println!("{}", format!("✓ {}", path.display()).green()),
        None => {
            println!("{}", "✗ not found".red());
            issues.push("rtmcp-server is not installed".to_string());
        }
    }

    print_summary(&issues);
    Ok(())
}

fn print_summary(issues: &[String]) {
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in issues {
            println!("  • {}", issue);
        }
    }
}
