//! Tool listings and input schemas.

use rmcp::model::{JsonObject, Tool};
use rtmcp_core::{PresetParam, PresetRequest, ToolDescriptor, ToolInvocationRequest, ToolPreset};
use schemars::JsonSchema;
use serde_json::{json, Value};
use std::sync::Arc;

/// MCP tool entry for a plain tool.
pub fn tool_entry(tool: &ToolDescriptor) -> Tool {
    let mut schema = object_schema::<ToolInvocationRequest>();
    set_property_description(&mut schema, "args", args_description(tool));

    let mut description = if tool.description.is_empty() {
        format!("Run {}.", tool.executable)
    } else {
        format!("{}.", tool.description.trim_end_matches('.'))
    };
    description.push_str(&format!(
        " Returns the raw standard output of `{}` as text.",
        tool.executable
    ));

    build(tool.name.clone(), description, schema)
}

/// MCP tool entry for a preset of `tool`.
pub fn preset_entry(tool: &ToolDescriptor, preset: &ToolPreset) -> Tool {
    let mut schema = object_schema::<PresetRequest>();
    set_property_description(
        &mut schema,
        "args",
        format!(
            "Optional extra {} flags, separated by whitespace (no quoting).",
            tool.executable
        ),
    );

    for param in &preset.params {
        add_param_property(&mut schema, param);
    }
    schema.insert("additionalProperties".to_string(), Value::Bool(false));

    let command = format!("{} {}", tool.executable, preset.args.join(" "));
    let description = if preset.description.is_empty() {
        format!("Runs `{}`.", command)
    } else {
        format!("{}. Runs `{}`.", preset.description.trim_end_matches('.'), command)
    };

    build(tool.preset_tool_name(preset), description, schema)
}

fn args_description(tool: &ToolDescriptor) -> String {
    let defaults = if tool.default_args.is_empty() {
        "no arguments".to_string()
    } else {
        format!("`{}`", tool.default_args_display())
    };
    format!(
        "Command-line flags for {}, e.g. \"-h\". Split on whitespace only: quotes are not \
         interpreted and a single argument cannot contain spaces. Leave empty to run with {}.",
        tool.executable, defaults
    )
}

/// One optional or required string-or-number property per parameter.
fn add_param_property(schema: &mut JsonObject, param: &PresetParam) {
    let mut description = param.description.clone();
    if let Some(default) = &param.default {
        if !description.is_empty() {
            description.push_str(". ");
        }
        if default.is_empty() {
            description.push_str("Omitted unless given");
        } else {
            description.push_str(&format!("Default: {}", default));
        }
    }

    let mut property = json!({
        "type": ["string", "number"],
        "description": description,
    });
    if let Some(default) = &param.default {
        property["default"] = Value::String(default.clone());
    }

    if let Some(Value::Object(props)) = schema.get_mut("properties") {
        props.insert(param.name.clone(), property);
    }
    if param.is_required() {
        match schema.get_mut("required") {
            Some(Value::Array(required)) => required.push(Value::String(param.name.clone())),
            _ => {
                schema.insert("required".to_string(), json!([param.name]));
            }
        }
    }
}

fn build(name: String, description: String, input_schema: JsonObject) -> Tool {
    Tool {
        name: name.into(),
        title: None,
        description: Some(description.into()),
        input_schema: Arc::new(input_schema),
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

/// Root schema of `T` as a JSON object.
fn object_schema<T: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(mut obj)) => {
            obj.remove("$schema");
            obj
        }
        _ => JsonObject::new(),
    }
}

fn set_property_description(schema: &mut JsonObject, property: &str, description: String) {
    if let Some(Value::Object(prop)) = schema
        .get_mut("properties")
        .and_then(|props| props.get_mut(property))
    {
        prop.insert("description".to_string(), Value::String(description));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn katana() -> ToolDescriptor {
        ToolDescriptor::new("katana", "katana")
            .with_description("Web crawler")
            .with_default_args(["-u", "https://example.com"])
    }

    #[test]
    fn test_tool_entry_schema_has_single_args_string() {
        let tool = tool_entry(&katana());
        assert_eq!(tool.name, "katana");

        let schema = &tool.input_schema;
        assert_eq!(schema["type"], "object");

        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props["args"]["type"], "string");

        let desc = props["args"]["description"].as_str().unwrap();
        assert!(desc.contains("-u https://example.com"));
        assert!(desc.contains("cannot contain spaces"));

        // args is optional
        let required = schema.get("required").and_then(Value::as_array);
        assert!(required.is_none_or(|r| r.is_empty()));
    }

    #[test]
    fn test_tool_entry_description() {
        let tool = tool_entry(&katana());
        let desc = tool.description.unwrap();
        assert!(desc.starts_with("Web crawler."));
        assert!(desc.contains("raw standard output of `katana`"));
    }

    #[test]
    fn test_preset_entry_requires_target() {
        let nmap = ToolDescriptor::new("nmap", "nmap").with_preset(
            ToolPreset::new("ping_sweep", ["-sn", "{args}", "{target}"])
                .with_description("Ping sweep"),
        );
        let tool = preset_entry(&nmap, &nmap.presets[0]);

        assert_eq!(tool.name, "nmap_ping_sweep");
        assert!(tool
            .description
            .as_deref()
            .unwrap()
            .contains("nmap -sn {args} {target}"));

        let required: Vec<&str> = tool.input_schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["target"]);
        assert_eq!(tool.input_schema["additionalProperties"], false);
    }

    #[test]
    fn test_preset_entry_lists_params() {
        let dirsearch = ToolDescriptor::new("dirsearch", "dirsearch").with_preset(
            ToolPreset::new("proxy_scan", ["-u", "{target}", "--proxy={proxy}", "--threads={threads}"])
                .with_param(PresetParam::required("proxy").with_description("Proxy URL"))
                .with_param(PresetParam::optional("threads", "20")),
        );
        let tool = preset_entry(&dirsearch, &dirsearch.presets[0]);
        let schema = &tool.input_schema;

        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props["proxy"]["type"], json!(["string", "number"]));
        assert_eq!(props["proxy"]["description"], "Proxy URL");
        assert_eq!(props["threads"]["default"], "20");
        assert!(props["threads"]["description"].as_str().unwrap().contains("Default: 20"));
        assert!(props.contains_key("target"));
        assert!(props.contains_key("args"));

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["target", "proxy"]);
    }
}
