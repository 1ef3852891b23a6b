//! JSON schema helpers for configuration types and function arguments.

use schemars::JsonSchema;
use serde_json::{Map, Value, json};

use crate::parameters::ParameterDescriptor;

/// Generate the JSON schema of a configuration type.
pub fn schema_of<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema).unwrap_or_else(|_| json!({}))
}

/// Object schema assembled one parameter at a time
#[derive(Debug, Clone)]
pub struct InputSchema {
    properties: Map<String, Value>,
    required: Vec<Value>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self {
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Add a parameter; non-optional parameters become required.
    pub fn add(mut self, param: &ParameterDescriptor) -> Self {
        let mut property = Map::new();
        if let Some(kind) = param.kind.json_type() {
            property.insert("type".to_string(), json!(kind));
        }
        property.insert("description".to_string(), json!(param.description));
        if param.optional {
            property.insert("default".to_string(), param.default.clone());
        } else if !self.required.contains(&json!(param.name)) {
            self.required.push(json!(param.name));
        }

        self.properties
            .insert(param.name.clone(), Value::Object(property));
        self
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl From<InputSchema> for Value {
    fn from(schema: InputSchema) -> Self {
        json!({
            "type": "object",
            "properties": schema.properties,
            "required": schema.required,
        })
    }
}
