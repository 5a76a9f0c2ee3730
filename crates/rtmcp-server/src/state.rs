//! Shared server state.

use anyhow::{Context, Result};
use rtmcp_core::{Config, ToolRegistry, ToolRunner};
use std::sync::Arc;
use tracing::info;

use crate::config::ServerArgs;

/// Process-wide state, immutable after startup
pub struct AppState {
    pub runner: ToolRunner,
    /// Tool this process is dedicated to, if any
    pub scope: Option<String>,
}

impl AppState {
    pub fn new(runner: ToolRunner, scope: Option<String>) -> Self {
        Self { runner, scope }
    }

    /// Load config, build the registry and narrow it to the requested tool.
    pub fn load(args: &ServerArgs) -> Result<Self> {
        let config_path = args.config_path();
        let config = Config::load_from(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
        info!("Config loaded from {:?}", config_path);

        let registry = ToolRegistry::from_config(&config).context("Invalid tool configuration")?;
        let registry = match &args.tool {
            Some(tool) => registry
                .restrict_to(tool)
                .with_context(|| format!("Cannot serve {}", tool))?,
            None => registry,
        };

        if registry.is_empty() {
            anyhow::bail!("No tools configured");
        }
        info!("Serving {} tool(s): {}", registry.len(), registry.names().join(", "));

        let runner = ToolRunner::new(Arc::new(registry), config.defaults);
        Ok(Self::new(runner, args.tool.clone()))
    }
}
