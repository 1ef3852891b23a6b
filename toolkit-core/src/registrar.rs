//! Toolkit and function registration.
//!
//! Functions are usually declared before the toolkit that owns them, so the
//! function registrar defers records whose toolkit is not registered yet and
//! the toolkit registrar drains them once it runs.

use std::{collections::HashSet, fmt, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    error::{Result, ToolError},
    parameters::{CONFIG_PARAMETER, Parameter, ToolParameters, describe_parameters},
    registry::{FunctionRecord, Registry, ReturnsDescriptor, ToolkitRecord},
    schema::schema_of,
    toolkit::Toolkit,
};

/// Declaration of a toolkit
#[derive(Debug, Clone)]
pub struct ToolkitDecl {
    id: String,
    title: Option<String>,
    description: Option<String>,
    documentation: Option<String>,
    icon: Option<String>,
    category: Option<String>,
    schema: Option<Value>,
}

impl ToolkitDecl {
    /// Declare the toolkit implemented by `T`.
    pub fn of<T: Toolkit>() -> Self {
        let mut decl = Self::named(T::toolkit_id());
        decl.documentation = T::documentation().map(str::to_string);
        decl
    }

    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            documentation: None,
            icon: None,
            category: None,
            schema: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Use the JSON schema of `S` as the toolkit configuration schema.
    pub fn with_schema<S: JsonSchema>(mut self) -> Self {
        self.schema = Some(schema_of::<S>());
        self
    }

    pub fn with_schema_value(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn into_record(self) -> ToolkitRecord {
        ToolkitRecord {
            description: self.description.or(self.documentation),
            id: self.id,
            title: self.title,
            icon: self.icon,
            category: self.category,
            functions: IndexMap::new(),
            schema: self.schema,
        }
    }
}

/// Register a toolkit and attach every function deferred for it.
///
/// Registering the same toolkit id twice fails with
/// [`ToolError::DuplicateToolkit`].
pub fn register_toolkit(registry: &mut Registry, decl: ToolkitDecl) -> Result<()> {
    if registry.contains(decl.id()) {
        return Err(ToolError::duplicate_toolkit(decl.id()));
    }

    // The queue stays untouched when it holds a duplicate.
    let mut seen = HashSet::new();
    if let Some(duplicate) = registry
        .deferred_for(decl.id())
        .iter()
        .find(|function| !seen.insert(function.id.as_str()))
    {
        return Err(ToolError::duplicate_function(decl.id(), &duplicate.id));
    }

    let mut record = decl.into_record();
    let deferred = registry.take_deferred(&record.id);
    if !deferred.is_empty() {
        info!(
            toolkit = %record.id,
            count = deferred.len(),
            "attaching deferred functions"
        );
    }
    for function in deferred {
        record.functions.insert(function.id.clone(), function);
    }

    debug!(toolkit = %record.id, functions = record.functions.len(), "registered toolkit");
    let id = record.id.clone();
    registry.put_toolkit(id, record);
    Ok(())
}

/// Declaration of a toolkit function
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    qualified_name: String,
    title: Option<String>,
    description: Option<String>,
    documentation: Option<String>,
    parameters: Vec<Parameter>,
    schema: Option<Value>,
    metadata: Map<String, Value>,
}

impl FunctionDecl {
    /// Declare a function by qualified name, e.g. `"SerpApiTool::search_google"`.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            title: None,
            description: None,
            documentation: None,
            parameters: Vec::new(),
            schema: None,
            metadata: Map::new(),
        }
    }

    /// Declare a function of the toolkit implemented by `T`.
    pub fn of<T: Toolkit>(name: &str) -> Self {
        Self::new(format!("{}::{name}", T::toolkit_id()))
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Documentation text; its `Args:` entries describe the parameters.
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Use the JSON schema of `S` as the function configuration schema.
    pub fn with_schema<S: JsonSchema>(mut self) -> Self {
        self.schema = Some(schema_of::<S>());
        self
    }

    pub fn with_schema_value(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Split the qualified name into `(toolkit, function)`.
    ///
    /// The toolkit is the path segment right before the function name; both
    /// `::` and `.` separate segments.
    pub fn resolve(&self) -> Result<(String, String)> {
        let segments: Vec<&str> = self
            .qualified_name
            .split("::")
            .flat_map(|part| part.split('.'))
            .map(str::trim)
            .collect();

        match segments.as_slice() {
            [.., toolkit, function] if !toolkit.is_empty() && !function.is_empty() => {
                Ok((toolkit.to_string(), function.to_string()))
            }
            _ => Err(ToolError::invalid_declaration(format!(
                "'{}' does not name a function inside a toolkit",
                self.qualified_name
            ))),
        }
    }

    fn into_record(self, id: String) -> FunctionRecord {
        let params = describe_parameters(&self.parameters, self.documentation.as_deref());
        FunctionRecord {
            id,
            title: self.title,
            description: self.description,
            parameters: params.into_iter().map(|p| (p.name.clone(), p)).collect(),
            returns: ReturnsDescriptor::default(),
            schema: self.schema,
            enabled: true,
            metadata: self.metadata,
        }
    }
}

/// Call signature of a function body: the instance, the call arguments and
/// the injected configuration.
pub type FunctionBody<T> =
    dyn for<'a> Fn(&'a T, ToolParameters, ToolParameters) -> BoxFuture<'a, Result<Value>>
        + Send
        + Sync;

/// A registered function bound to its body.
///
/// Calling it injects the instance's configuration for this function.
pub struct WrappedFunction<T> {
    toolkit: String,
    name: String,
    body: Arc<FunctionBody<T>>,
}

impl<T> Clone for WrappedFunction<T> {
    fn clone(&self) -> Self {
        Self {
            toolkit: self.toolkit.clone(),
            name: self.name.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<T> fmt::Debug for WrappedFunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedFunction")
            .field("toolkit", &self.toolkit)
            .field("name", &self.name)
            .finish()
    }
}

impl<T: Toolkit> WrappedFunction<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn toolkit(&self) -> &str {
        &self.toolkit
    }

    /// Invoke the body with `arguments` and the instance's configuration for
    /// this function. Errors from the body are returned unchanged.
    pub fn call<'a>(&self, instance: &'a T, arguments: ToolParameters) -> BoxFuture<'a, Result<Value>> {
        let config = instance.configuration().function_config(&self.name);
        (self.body)(instance, arguments.without(CONFIG_PARAMETER), config)
    }
}

/// Register a function and bind it to `body`.
///
/// When the owning toolkit is not registered yet the record is deferred until
/// [`register_toolkit`] runs for it.
pub fn register_function<T, F>(
    registry: &mut Registry,
    decl: FunctionDecl,
    body: F,
) -> Result<WrappedFunction<T>>
where
    T: Toolkit,
    F: for<'a> Fn(&'a T, ToolParameters, ToolParameters) -> BoxFuture<'a, Result<Value>>
        + Send
        + Sync
        + 'static,
{
    let (toolkit, name) = decl.resolve()?;
    let record = decl.into_record(name.clone());

    match registry.put_function(&toolkit, record.clone()) {
        Ok(()) => debug!(toolkit = %toolkit, function = %name, "registered function"),
        Err(ToolError::UnknownToolkit { .. }) => {
            debug!(toolkit = %toolkit, function = %name, "deferred function until toolkit registers");
            registry.defer_function(toolkit.clone(), record);
        }
        Err(err) => return Err(err),
    }

    Ok(WrappedFunction {
        toolkit,
        name,
        body: Arc::new(body),
    })
}

/// Dispatch table of the wrapped functions of one toolkit type
pub struct FunctionSet<T> {
    functions: IndexMap<String, WrappedFunction<T>>,
}

impl<T> Default for FunctionSet<T> {
    fn default() -> Self {
        Self {
            functions: IndexMap::new(),
        }
    }
}

impl<T> fmt::Debug for FunctionSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSet")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Toolkit> FunctionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, function: WrappedFunction<T>) {
        self.functions.insert(function.name.clone(), function);
    }

    pub fn with(mut self, function: WrappedFunction<T>) -> Self {
        self.insert(function);
        self
    }

    pub fn get(&self, name: &str) -> Option<&WrappedFunction<T>> {
        self.functions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Invoke a function by name
    pub async fn invoke(
        &self,
        instance: &T,
        name: &str,
        arguments: impl Into<ToolParameters>,
    ) -> Result<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| ToolError::function_not_found(T::toolkit_id(), name))?;
        function.call(instance, arguments.into()).await
    }
}
