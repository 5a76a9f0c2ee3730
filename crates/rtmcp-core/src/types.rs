//! Request and result types shared by the server and the CLI.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Content type of every successful result
pub const TEXT_PLAIN: &str = "text/plain";

/// Input of a tool call: CLI flags forwarded to the tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolInvocationRequest {
    /// Command-line flags, split on whitespace. Leave empty to use the tool's default arguments.
    #[serde(default)]
    pub args: String,
}

impl ToolInvocationRequest {
    pub fn new(args: impl Into<String>) -> Self {
        Self { args: args.into() }
    }
}

/// Input of a preset call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PresetRequest {
    /// Host, network or URL to scan (a single token)
    pub target: String,
    /// Optional extra flags, split on whitespace
    #[serde(default)]
    pub args: String,
    /// Preset parameters (strings or numbers), keyed by name
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

impl PresetRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            args: String::new(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Where the argument vector of an invocation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgSource {
    /// The tool's configured defaults
    Default,
    /// The caller's argument string
    Caller,
    /// A preset template
    Preset,
}

impl fmt::Display for ArgSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgSource::Default => write!(f, "default"),
            ArgSource::Caller => write!(f, "caller-supplied"),
            ArgSource::Preset => write!(f, "preset"),
        }
    }
}

/// Successful tool run: the captured standard output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Raw stdout bytes, untouched
    pub stdout: Vec<u8>,
    /// Always [`TEXT_PLAIN`]
    pub content_type: &'static str,
}

impl ToolOutput {
    pub fn text(stdout: Vec<u8>) -> Self {
        Self {
            stdout,
            content_type: TEXT_PLAIN,
        }
    }

    /// Stdout as text, if it is valid UTF-8.
    pub fn as_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.stdout).ok()
    }
}
