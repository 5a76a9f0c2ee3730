//! Tool registry.
//!
//! Maps tool names to descriptors. Built once at startup and never mutated
//! afterwards; share it behind an `Arc`.

use std::collections::{BTreeMap, HashSet};

use crate::builtin::builtin_tools;
use crate::client_config::COMBINED_SERVER_NAME;
use crate::config::Config;
use crate::descriptor::{is_valid_name, ToolDescriptor, ToolPreset, RESERVED_PARAM_NAMES};
use crate::error::{Error, Result};

/// What a tool-call name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    Tool(&'a ToolDescriptor),
    Preset(&'a ToolDescriptor, &'a ToolPreset),
}

/// Immutable name → descriptor map
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
    // preset tool name -> (tool name, preset name)
    presets: BTreeMap<String, (String, String)>,
}

impl ToolRegistry {
    /// Build a registry, rejecting invalid or clashing names.
    pub fn new(tools: impl IntoIterator<Item = ToolDescriptor>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for tool in tools {
            if !is_valid_name(&tool.name) {
                return Err(Error::config(format!("Invalid tool name: {:?}", tool.name)));
            }
            if tool.executable.trim().is_empty() {
                return Err(Error::config(format!("Tool {} has no executable", tool.name)));
            }
            if tool.name == COMBINED_SERVER_NAME {
                return Err(Error::config(format!(
                    "Tool name {} is reserved for the combined server entry",
                    tool.name
                )));
            }
            if map.contains_key(&tool.name) {
                return Err(Error::config(format!("Duplicate tool: {}", tool.name)));
            }
            map.insert(tool.name.clone(), tool);
        }

        let mut presets = BTreeMap::new();
        for tool in map.values() {
            for preset in &tool.presets {
                if !is_valid_name(&preset.name) {
                    return Err(Error::config(format!(
                        "Invalid preset name for {}: {:?}",
                        tool.name, preset.name
                    )));
                }
                check_params(tool, preset)?;
                let full_name = tool.preset_tool_name(preset);
                if map.contains_key(&full_name) || presets.contains_key(&full_name) {
                    return Err(Error::config(format!("Preset name clashes: {}", full_name)));
                }
                presets.insert(full_name, (tool.name.clone(), preset.name.clone()));
            }
        }

        Ok(Self {
            tools: map,
            presets,
        })
    }

    /// Registry of the built-in tools only.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_tools())
    }

    /// Built-in tools overlaid with the config file's `[tools]` tables.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut tools: BTreeMap<String, ToolDescriptor> = builtin_tools()
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();

        for (name, entry) in &config.tools {
            if !entry.enabled {
                tools.remove(name);
                continue;
            }

            let mut tool = match tools.remove(name) {
                Some(tool) => tool,
                None => {
                    let executable = entry.executable.clone().ok_or_else(|| {
                        Error::config(format!("Tool {} is not built in and needs an executable", name))
                    })?;
                    ToolDescriptor::new(name.clone(), executable)
                }
            };

            if let Some(executable) = &entry.executable {
                tool.executable = executable.clone();
            }
            if let Some(args) = &entry.default_args {
                tool.default_args = args.clone();
            }
            if let Some(description) = &entry.description {
                tool.description = description.clone();
            }
            if let Some(secs) = entry.timeout_secs {
                tool.timeout_secs = Some(secs);
            }
            if let Some(presets) = &entry.presets {
                tool.presets = presets.clone();
            }
            tools.insert(name.clone(), tool);
        }

        Self::new(tools.into_values())
    }

    /// Narrow the registry to a single tool (and its presets).
    pub fn restrict_to(&self, name: &str) -> Result<Self> {
        let tool = self.get(name)?.clone();
        Self::new([tool])
    }

    /// Exact-match lookup of a tool.
    pub fn get(&self, name: &str) -> Result<&ToolDescriptor> {
        self.tools
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))
    }

    /// Resolve a tool-call name to a tool or one of its presets.
    pub fn lookup(&self, name: &str) -> Result<Entry<'_>> {
        if let Some(tool) = self.tools.get(name) {
            return Ok(Entry::Tool(tool));
        }

        if let Some((tool_name, preset_name)) = self.presets.get(name) {
            let tool = self.get(tool_name)?;
            if let Some(preset) = tool.preset(preset_name) {
                return Ok(Entry::Preset(tool, preset));
            }
        }

        Err(Error::UnknownTool(name.to_string()))
    }

    /// Tools ordered by name.
    pub fn tools(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn check_params(tool: &ToolDescriptor, preset: &ToolPreset) -> Result<()> {
    let mut seen = HashSet::new();
    for param in &preset.params {
        if !is_valid_name(&param.name) || RESERVED_PARAM_NAMES.contains(&param.name.as_str()) {
            return Err(Error::config(format!(
                "Invalid parameter name for {}: {:?}",
                tool.preset_tool_name(preset),
                param.name
            )));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(Error::config(format!(
                "Duplicate parameter {} in {}",
                param.name,
                tool.preset_tool_name(preset)
            )));
        }
    }
    Ok(())
}
