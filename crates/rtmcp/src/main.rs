//! rtmcp - operator CLI
//!
//! Lists the wrapped tools, runs them locally, checks the installation and
//! generates the MCP client configuration that points agents at
//! `rtmcp-server`.

use anyhow::{Context, Result};
use clap::Parser;
use rtmcp_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (stderr, so `run` output stays clean)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("rtmcp=info".parse()?)
                .add_directive("rtmcp_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Execute command
    match cli.command {
        Commands::List { json } => commands::list::execute(json, &config).await,
        Commands::Run {
            target,
            params,
            tool,
            args,
        } => {
            let preset = commands::run::PresetOptions {
                target: target.as_deref(),
                params: &params,
            };
            commands::run::execute(&tool, preset, &args, &config).await
        }
        Commands::Doctor => commands::doctor::execute(&config, &config_path).await,
        Commands::Config(cmd) => commands::config::execute(cmd, &config, &config_path).await,
        Commands::Version => {
            println!("rtmcp {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
