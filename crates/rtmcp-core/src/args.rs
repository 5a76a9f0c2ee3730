//! Argument resolution.
//!
//! The request carries a single free-form string. It is split on
//! whitespace only: there is no quoting or escaping, so an argument that
//! itself contains a space cannot be expressed. No shell is involved at any
//! point, so shell metacharacters reach the tool as literal text.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::descriptor::{ToolDescriptor, ToolPreset};
use crate::error::{Error, Result};
use crate::types::{ArgSource, PresetRequest, ToolInvocationRequest};

/// Argument vector chosen for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArgs {
    pub args: Vec<String>,
    pub source: ArgSource,
    /// The arguments still carry a `{report}` slot
    pub report: bool,
}

/// Split an argument string on whitespace.
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Pick the argument vector for a plain tool call.
///
/// Empty or whitespace-only input selects the descriptor's defaults verbatim.
pub fn resolve(tool: &ToolDescriptor, request: &ToolInvocationRequest) -> Result<ResolvedArgs> {
    let tokens = tokenize(&request.args);
    if tokens.is_empty() {
        return Ok(ResolvedArgs {
            args: tool.default_args.clone(),
            source: ArgSource::Default,
            report: false,
        });
    }

    validate(&tokens)?;
    Ok(ResolvedArgs {
        args: tokens,
        source: ArgSource::Caller,
        report: false,
    })
}

/// Expand a preset template for a request.
///
/// Omitted parameters take their defaults. An optional parameter set to
/// the empty string drops the template tokens that use it.
pub fn resolve_preset(preset: &ToolPreset, request: &PresetRequest) -> Result<ResolvedArgs> {
    let target = request.target.trim();
    if target.is_empty() {
        return Err(Error::malformed("target must not be empty"));
    }
    check_value("target", target)?;

    if let Some(unknown) = request.params.keys().find(|k| preset.param(k).is_none()) {
        return Err(Error::malformed(format!(
            "{} does not take a parameter named {}",
            preset.name, unknown
        )));
    }

    let mut values = BTreeMap::new();
    values.insert("target".to_string(), target.to_string());
    for param in &preset.params {
        let given = match request.params.get(&param.name) {
            Some(value) => param_text(&param.name, value)?,
            None => None,
        };
        let value = match given.or_else(|| param.default.clone()) {
            Some(value) => value,
            None => {
                return Err(Error::malformed(format!("missing parameter {}", param.name)));
            }
        };
        if value.is_empty() {
            if param.is_required() {
                return Err(Error::malformed(format!("{} must not be empty", param.name)));
            }
        } else {
            check_value(&param.name, &value)?;
        }
        values.insert(param.name.clone(), value);
    }

    let extra = tokenize(&request.args);
    validate(&extra)?;

    Ok(ResolvedArgs {
        args: preset.render(&values, &extra),
        source: ArgSource::Preset,
        report: preset.writes_report(),
    })
}

/// Textual form of a parameter value; `None` for JSON null.
fn param_text(name: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(Error::malformed(format!(
            "parameter {} must be a string or a number",
            name
        ))),
    }
}

/// A slot value must stay one argument and must not read as a flag.
fn check_value(name: &str, value: &str) -> Result<()> {
    if value.split_whitespace().count() > 1 {
        return Err(Error::malformed(format!(
            "{} must be a single token: {:?}",
            name, value
        )));
    }
    if value.starts_with('-') {
        return Err(Error::malformed(format!(
            "{} must not start with '-': {}",
            name, value
        )));
    }
    validate(&[value.to_string()])
}

/// Reject tokens that cannot be passed through process creation faithfully.
pub fn validate(tokens: &[String]) -> Result<()> {
    for token in tokens {
        if let Some(c) = token.chars().find(|c| c.is_control()) {
            return Err(Error::malformed(format!(
                "argument {:?} contains control character U+{:04X}",
                token, c as u32
            )));
        }
    }
    Ok(())
}
