//! Run command.

use anyhow::{Context, Result};
use colored::Colorize;
use rtmcp_core::{
    Config, Entry, Error, PresetRequest, ToolInvocationRequest, ToolOutput, ToolRegistry,
    ToolRunner,
};
use std::io::Write;
use std::sync::Arc;

/// Inputs that only apply to preset tools
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetOptions<'a> {
    pub target: Option<&'a str>,
    /// `NAME=VALUE` pairs
    pub params: &'a [String],
}

impl PresetOptions<'_> {
    fn is_empty(&self) -> bool {
        self.target.is_none() && self.params.is_empty()
    }
}

pub async fn execute(
    tool: &str,
    preset: PresetOptions<'_>,
    args: &[String],
    config: &Config,
) -> Result<()> {
    let registry = ToolRegistry::from_config(config)?;
    let runner = ToolRunner::new(Arc::new(registry), config.defaults.clone());

    let result = invoke(&runner, tool, preset, args).await;
    match result {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&output.stdout)
                .context("Failed to write tool output")?;
            stdout.flush()?;
            Ok(())
        }
        Err(Error::NonZeroExit { tool, code }) => {
            eprintln!("{}", format!("✗ {} exited with code {}", tool, code).red());
            // Mirror the tool's own status
            std::process::exit(code);
        }
        Err(e) if e.is_caller_error() => {
            eprintln!("{}", format!("✗ {}", e).red());
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

async fn invoke(
    runner: &ToolRunner,
    tool: &str,
    preset: PresetOptions<'_>,
    args: &[String],
) -> rtmcp_core::Result<ToolOutput> {
    let flags = join_args(args);
    match runner.registry().lookup(tool)? {
        Entry::Tool(_) => {
            if !preset.is_empty() {
                return Err(Error::InvalidRequest(format!(
                    "--target and --param only apply to preset tools, {} is not one",
                    tool
                )));
            }
            runner.invoke(tool, &ToolInvocationRequest::new(flags)).await
        }
        Entry::Preset(..) => {
            let target = preset.target.ok_or_else(|| {
                Error::InvalidRequest(format!("{} is a preset and needs --target", tool))
            })?;
            let mut request = PresetRequest::new(target).with_args(flags);
            for pair in preset.params {
                let (name, value) = parse_param(pair)?;
                request = request.with_param(name, value);
            }
            runner.invoke_preset(tool, &request).await
        }
    }
}

/// Rebuild the single argument string an agent would send.
fn join_args(args: &[String]) -> String {
    args.join(" ")
}

fn parse_param(pair: &str) -> rtmcp_core::Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(Error::InvalidRequest(format!(
            "--param expects NAME=VALUE, got {:?}",
            pair
        ))),
    }
}
