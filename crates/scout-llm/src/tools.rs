//! Function declarations offered to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition sent to the provider
///
/// Describes a capability the model may invoke: its registry name, the
/// natural-language usage description, and a JSON schema for the argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Must match a capability registry name
    pub name: String,

    /// When to use it, in the model-facing wording
    pub description: String,

    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// JSON schema helpers
pub mod schema {
    use serde_json::{Value, json};

    /// Object schema with the given properties
    pub fn object(properties: Value, required: Vec<&str>) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }

    /// Object schema with a single required string property
    pub fn single_string(property: &str, description: &str) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert(property.to_string(), string(description));
        object(Value::Object(properties), vec![property])
    }
}
