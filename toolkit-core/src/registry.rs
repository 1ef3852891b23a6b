use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{Result, ToolError},
    parameters::ParameterDescriptor,
    schema::InputSchema,
};

/// Return value description attached to every function record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnsDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// Metadata of a registered function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub parameters: IndexMap<String, ParameterDescriptor>,
    pub returns: ReturnsDescriptor,
    pub schema: Option<Value>,
    pub enabled: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl FunctionRecord {
    /// JSON schema describing the call arguments of this function.
    pub fn input_schema(&self) -> Value {
        self.parameters
            .values()
            .fold(InputSchema::new(), |schema, param| schema.add(param))
            .into()
    }

    /// Validate call arguments against [`FunctionRecord::input_schema`].
    pub fn validate_arguments(&self, arguments: &Value) -> Result<()> {
        let schema = self.input_schema();
        let compiled = jsonschema::Validator::new(&schema)
            .map_err(|e| ToolError::validation(format!("Invalid schema: {e}")))?;

        match compiled.validate(arguments) {
            Ok(()) => Ok(()),
            Err(error) => Err(ToolError::validation(format!(
                "Parameter validation failed for '{}': {error}",
                self.id
            ))),
        }
    }
}

/// Metadata of a registered toolkit and its functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitRecord {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub functions: IndexMap<String, FunctionRecord>,
    pub schema: Option<Value>,
}

/// Store of toolkit records keyed by toolkit id.
///
/// Mutations take `&mut self` and happen during the initialization phase;
/// afterwards the registry is only read and can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    toolkits: IndexMap<String, ToolkitRecord>,
    deferred: HashMap<String, Vec<FunctionRecord>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a toolkit record
    pub fn get(&self, toolkit: &str) -> Result<&ToolkitRecord> {
        self.toolkits
            .get(toolkit)
            .ok_or_else(|| ToolError::toolkit_not_found(toolkit))
    }

    /// Get a function record of a toolkit
    pub fn get_function(&self, toolkit: &str, function: &str) -> Result<&FunctionRecord> {
        self.get(toolkit)?
            .functions
            .get(function)
            .ok_or_else(|| ToolError::function_not_found(toolkit, function))
    }

    pub fn contains(&self, toolkit: &str) -> bool {
        self.toolkits.contains_key(toolkit)
    }

    /// Insert a toolkit record, replacing any previous record with the same id
    pub fn put_toolkit(&mut self, toolkit: impl Into<String>, record: ToolkitRecord) {
        let toolkit = toolkit.into();
        if self.toolkits.insert(toolkit.clone(), record).is_some() {
            debug!(toolkit = %toolkit, "replaced toolkit record");
        }
    }

    /// Attach a function record to an already registered toolkit
    pub fn put_function(&mut self, toolkit: &str, record: FunctionRecord) -> Result<()> {
        let entry = self
            .toolkits
            .get_mut(toolkit)
            .ok_or_else(|| ToolError::unknown_toolkit(toolkit))?;

        if entry.functions.contains_key(&record.id) {
            return Err(ToolError::duplicate_function(toolkit, &record.id));
        }
        entry.functions.insert(record.id.clone(), record);
        Ok(())
    }

    /// Hold a function record until its toolkit registers
    pub fn defer_function(&mut self, toolkit: impl Into<String>, record: FunctionRecord) {
        self.deferred.entry(toolkit.into()).or_default().push(record);
    }

    /// Remove and return the deferred records of a toolkit, in queue order
    pub fn take_deferred(&mut self, toolkit: &str) -> Vec<FunctionRecord> {
        self.deferred.remove(toolkit).unwrap_or_default()
    }

    /// Deferred records of a toolkit, in queue order
    pub fn deferred_for(&self, toolkit: &str) -> &[FunctionRecord] {
        self.deferred.get(toolkit).map_or(&[], Vec::as_slice)
    }

    /// Names of deferred functions per toolkit
    pub fn deferred(&self) -> HashMap<&str, Vec<&str>> {
        self.deferred
            .iter()
            .map(|(toolkit, records)| {
                (
                    toolkit.as_str(),
                    records.iter().map(|r| r.id.as_str()).collect(),
                )
            })
            .collect()
    }

    /// Fail if any function is still waiting for a toolkit that never registered
    pub fn ensure_complete(&self) -> Result<()> {
        let orphaned = self
            .deferred
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .min_by_key(|(toolkit, _)| *toolkit);

        match orphaned {
            Some((toolkit, records)) => Err(ToolError::OrphanedFunctions {
                toolkit: toolkit.clone(),
                functions: records.iter().map(|r| r.id.clone()).collect(),
            }),
            None => Ok(()),
        }
    }

    /// Registered toolkits in registration order
    pub fn toolkits(&self) -> impl Iterator<Item = &ToolkitRecord> {
        self.toolkits.values()
    }

    pub fn len(&self) -> usize {
        self.toolkits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toolkits.is_empty()
    }

    /// Validate call arguments for a registered function
    pub fn validate_call(&self, toolkit: &str, function: &str, arguments: &Value) -> Result<()> {
        self.get_function(toolkit, function)?
            .validate_arguments(arguments)
    }

    /// Render every toolkit record as a JSON object keyed by toolkit id
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.toolkits)?)
    }
}
