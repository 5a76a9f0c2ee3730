//! Static tool metadata.
//!
//! A [`ToolDescriptor`] names one wrapped executable and how it is invoked
//! when the caller supplies no flags. Presets are fixed flag templates
//! that are exposed to agents as their own tools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Template token replaced by the preset request's target.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Template token replaced by the preset request's extra flags (zero or more tokens).
pub const ARGS_PLACEHOLDER: &str = "{args}";

/// Template slot filled with a fresh file path; the file's content becomes the output.
pub const REPORT_PLACEHOLDER: &str = "{report}";

/// A wrapped security tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name (also the MCP tool name)
    pub name: String,
    /// Executable name (looked up on PATH) or absolute path
    pub executable: String,
    /// Arguments used when the request carries no flags
    #[serde(default)]
    pub default_args: Vec<String>,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Per-tool timeout override in seconds (0 disables)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Named flag templates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<ToolPreset>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            default_args: Vec::new(),
            description: String::new(),
            timeout_secs: None,
            presets: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_default_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_preset(mut self, preset: ToolPreset) -> Self {
        self.presets.push(preset);
        self
    }

    /// Find a preset by name.
    pub fn preset(&self, name: &str) -> Option<&ToolPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// MCP tool name under which a preset is exposed.
    pub fn preset_tool_name(&self, preset: &ToolPreset) -> String {
        format!("{}_{}", self.name, preset.name)
    }

    /// Resolve the executable via PATH (or check an explicit path).
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.executable).ok()
    }

    /// Default arguments rendered the way a caller would type them.
    pub fn default_args_display(&self) -> String {
        self.default_args.join(" ")
    }
}

/// A named flag template for a tool
///
/// Template tokens may contain `{name}` slots. `{target}` and each
/// parameter slot are filled in place; a token whose slot value is empty is
/// dropped whole, so optional flags are written as `--flag={param}`. The
/// token `{args}` expands to the caller's extra flags, possibly none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPreset {
    /// Preset name, unique within its tool
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Argument template; see [`TARGET_PLACEHOLDER`] and [`ARGS_PLACEHOLDER`]
    pub args: Vec<String>,
    /// Named values the caller may (or must) supply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<PresetParam>,
}

impl ToolPreset {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: String::new(),
            args: args.into_iter().map(Into::into).collect(),
            params: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Add a parameter, replacing one of the same name.
    pub fn with_param(mut self, param: PresetParam) -> Self {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
        self
    }

    pub fn param(&self, name: &str) -> Option<&PresetParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// True when the tool writes its result to the `{report}` file.
    pub fn writes_report(&self) -> bool {
        self.args.iter().any(|a| a.contains(REPORT_PLACEHOLDER))
    }

    /// Expand the template.
    ///
    /// `values` maps slot names (`target` and the parameters) to their
    /// resolved values. Unknown slots, `{report}` included, are left as is.
    pub fn render(&self, values: &BTreeMap<String, String>, extra: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + extra.len());
        for token in &self.args {
            if token == ARGS_PLACEHOLDER {
                args.extend(extra.iter().cloned());
            } else if let Some(filled) = fill(token, values) {
                args.push(filled);
            }
        }
        args
    }
}

/// Fill the `{name}` slots of one token in a single pass.
///
/// Returns `None` when any filled slot is empty.
fn fill(token: &str, values: &BTreeMap<String, String>) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let slot = &rest[open..];
        let Some(close) = slot.find('}') else {
            rest = slot;
            break;
        };
        match values.get(&slot[1..close]) {
            Some(value) if value.is_empty() => return None,
            Some(value) => out.push_str(value),
            None => out.push_str(&slot[..=close]),
        }
        rest = &slot[close + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// A named preset value, exposed as its own input property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetParam {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Used when the caller omits the value; `None` makes the parameter required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl PresetParam {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default: Some(default.into()),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Slot names a preset parameter may not take.
pub const RESERVED_PARAM_NAMES: [&str; 3] = ["target", "args", "report"];

/// Tool and preset names end up as MCP tool names.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
