//! Configuration management.
//!
//! The config file is located with this precedence:
//! 1. `RTMCP_CONFIG` (path to the file)
//! 2. `$RTMCP_DIR/config.toml`
//! 3. `~/.rtmcp/config.toml`
//!
//! A missing file means built-in defaults. Entries under `[tools.<name>]`
//! override the built-in tool of the same name field by field; entries
//! for unknown names add new tools and must name an `executable`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::descriptor::ToolPreset;
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Settings applied to every tool
    #[serde(default)]
    pub defaults: Defaults,

    /// Per-tool overrides and additions
    #[serde(default)]
    pub tools: BTreeMap<String, ToolConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Wall-clock limit for one invocation in seconds (0 disables)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fail invocations whose stdout exceeds this many bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_bytes: Option<usize>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_output_bytes: None,
        }
    }
}

/// One `[tools.<name>]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_args: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Replaces the built-in presets when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets: Option<Vec<ToolPreset>>,

    /// Set to false to hide a tool
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: None,
            default_args: None,
            description: None,
            timeout_secs: None,
            presets: None,
            enabled: true,
        }
    }
}

fn default_timeout_secs() -> u64 {
    1800 // 30 minutes
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

impl Defaults {
    /// Effective timeout for a tool that may carry its own override.
    pub fn timeout_for(&self, tool_override: Option<u64>) -> Option<Duration> {
        match tool_override.unwrap_or(self.timeout_secs) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("RTMCP_CONFIG") {
            PathBuf::from(path)
        } else {
            Self::data_dir().join("config.toml")
        }
    }

    /// Base directory for rtmcp files.
    pub fn data_dir() -> PathBuf {
        std::env::var("RTMCP_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rtmcp")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.timeout_secs, 1800);
        assert!(config.defaults.max_output_bytes.is_none());
        assert!(config.tools.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [defaults]
            timeout_secs = 60
            max_output_bytes = 1048576

            [tools.katana]
            default_args = ["-u", "https://internal.test"]
            timeout_secs = 0

            [tools.masscan]
            executable = "/usr/bin/masscan"
            description = "Fast port scanner"

            [tools.ffuf]
            enabled = false

            [[tools.nmap.presets]]
            name = "quick"
            args = ["-Pn", "-F", "{args}", "{target}"]
            "#,
        )
        .unwrap();

        assert_eq!(config.defaults.timeout_secs, 60);
        assert_eq!(config.defaults.max_output_bytes, Some(1_048_576));

        let katana = &config.tools["katana"];
        assert!(katana.executable.is_none());
        assert_eq!(
            katana.default_args.as_deref(),
            Some(&["-u".to_string(), "https://internal.test".to_string()][..])
        );
        assert!(katana.enabled);

        assert_eq!(
            config.tools["masscan"].executable.as_deref(),
            Some("/usr/bin/masscan")
        );
        assert!(!config.tools["ffuf"].enabled);

        let presets = config.tools["nmap"].presets.as_ref().unwrap();
        assert_eq!(presets[0].name, "quick");
        assert_eq!(presets[0].description, "");
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[tools.katana]\ndefault_args = 3").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_timeout_for() {
        let defaults = Defaults::default();
        assert_eq!(defaults.timeout_for(None), Some(Duration::from_secs(1800)));
        assert_eq!(defaults.timeout_for(Some(5)), Some(Duration::from_secs(5)));
        assert_eq!(defaults.timeout_for(Some(0)), None);

        let unbounded = Defaults {
            timeout_secs: 0,
            max_output_bytes: None,
        };
        assert_eq!(unbounded.timeout_for(None), None);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.defaults.timeout_secs = 120;
        config.tools.insert(
            "nuclei".to_string(),
            ToolConfig {
                default_args: Some(vec!["-u".into(), "https://lab.local".into()]),
                ..ToolConfig::default()
            },
        );
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.defaults.timeout_secs, 120);
        assert_eq!(
            loaded.tools["nuclei"].default_args,
            Some(vec!["-u".to_string(), "https://lab.local".to_string()])
        );
        assert!(loaded.tools["nuclei"].enabled);
    }
}
