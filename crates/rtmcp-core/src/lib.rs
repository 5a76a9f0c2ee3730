//! rtmcp-core - Core library for rtmcp
//!
//! Security command-line tools behind a uniform MCP tool-call interface.
//! This crate holds everything that is not transport specific:
//!
//! - **descriptor**: static tool metadata and presets
//! - **builtin**: the built-in tool table
//! - **registry**: name → descriptor lookup
//! - **args**: whitespace tokenization and default substitution
//! - **runner**: subprocess execution
//! - **config**: TOML configuration
//! - **client_config**: MCP client config generation

pub mod args;
pub mod builtin;
pub mod client_config;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use descriptor::{PresetParam, ToolDescriptor, ToolPreset};
pub use error::{Error, Result};
pub use registry::{Entry, ToolRegistry};
pub use runner::{Executor, Invocation, ProcessExecutor, ToolRunner};
pub use types::{ArgSource, PresetRequest, ToolInvocationRequest, ToolOutput};
