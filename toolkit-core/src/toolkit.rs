use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{error::Result, parameters::ToolParameters};

/// Key under which a function's own configuration is stored in
/// [`ToolkitConfiguration::functions`].
pub const FUNCTION_CONFIG_KEY: &str = "config";

/// A container type whose functions are registered in a [`crate::Registry`].
pub trait Toolkit: Send + Sync + 'static {
    /// Registry id of the toolkit; defaults to the type's own name.
    fn toolkit_id() -> &'static str
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }

    /// Documentation used as the toolkit description when none is declared.
    fn documentation() -> Option<&'static str>
    where
        Self: Sized,
    {
        None
    }

    /// Configuration state of this instance.
    fn configuration(&self) -> &ToolkitConfiguration;
}

/// Last path segment of a type name, without generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Per-instance configuration of a toolkit.
///
/// `config` holds general settings such as credentials, `functions` maps a
/// function name to `{"config": {...}}`. Missing regions deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolkitConfiguration {
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub functions: Map<String, Value>,
    #[serde(default)]
    pub enable: Vec<String>,
}

impl ToolkitConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_function_config(mut self, function: impl Into<String>, config: Value) -> Self {
        self.functions
            .insert(function.into(), json!({ FUNCTION_CONFIG_KEY: config }));
        self
    }

    pub fn with_enabled(mut self, function: impl Into<String>) -> Self {
        self.enable.push(function.into());
        self
    }

    /// General configuration value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    /// Configuration injected into `function` at call time; empty when the
    /// function has no object under its `config` key.
    pub fn function_config(&self, function: &str) -> ToolParameters {
        self.functions
            .get(function)
            .and_then(|entry| entry.get(FUNCTION_CONFIG_KEY))
            .filter(|config| config.is_object())
            .cloned()
            .map(ToolParameters::new)
            .unwrap_or_default()
    }

    pub fn enabled_functions(&self) -> &[String] {
        &self.enable
    }
}
