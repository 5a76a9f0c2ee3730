//! Error types for rtmcp-core.

use thiserror::Error;

/// Result type alias using rtmcp-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for tool invocation
#[derive(Error, Debug)]
pub enum Error {
    // Process errors
    #[error("Failed to launch {tool} ({program}): {source}")]
    LaunchFailure {
        tool: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with code {code}")]
    NonZeroExit { tool: String, code: i32 },

    #[error("{tool} was terminated{}", signal_suffix(.signal))]
    Terminated { tool: String, signal: Option<i32> },

    #[error("{tool} timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    #[error("{tool} did not write its report: {source}")]
    MissingReport {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} produced more than {limit} bytes of output")]
    OutputTooLarge { tool: String, limit: usize },

    // Request errors
    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn signal_suffix(signal: &Option<i32>) -> String {
    match signal {
        Some(signal) => format!(" by signal {}", signal),
        None => String::new(),
    }
}

impl Error {
    /// Create a malformed-arguments error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedArguments(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True when the request itself was at fault rather than the tool run.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedArguments(_) | Self::UnknownTool(_) | Self::InvalidRequest(_)
        )
    }
}
