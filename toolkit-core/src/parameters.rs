use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    docstring::Docstring,
    error::{Result, ToolError},
};

/// Name of the receiver parameter, never part of a function's schema.
pub const RECEIVER_PARAMETER: &str = "self";

/// Name of the parameter through which per-function configuration is injected.
pub const CONFIG_PARAMETER: &str = "_config";

/// Coarse parameter type used in function schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Number,
    String,
    Boolean,
    Null,
    Array,
    Object,
    Unknown,
}

impl TypeCategory {
    /// Classify a declared type name.
    ///
    /// Accepts both scripting-style names (`int`, `str`, `dict`, ...) and Rust
    /// type names as produced by [`std::any::type_name`]. Module paths and
    /// generic arguments are ignored, `Option<T>` classifies as `T`, and anything
    /// unrecognized is [`TypeCategory::Unknown`].
    pub fn from_declared(declared: &str) -> Self {
        let mut name = declared.trim().trim_start_matches('&').trim_start();
        if name.starts_with('\'') {
            name = name.split_once(' ').map_or(name, |(_, rest)| rest.trim_start());
        }
        if let Some(rest) = name.strip_prefix("mut ") {
            name = rest.trim_start();
        }

        if name == "()" {
            return Self::Null;
        }
        if name.starts_with('[') || name.starts_with('(') {
            return Self::Array;
        }

        let (head, inner) = match name.find(['<', '[']) {
            Some(open) => {
                let close = name.rfind(['>', ']']).filter(|c| *c > open).unwrap_or(name.len());
                (&name[..open], Some(&name[open + 1..close]))
            }
            None => (name, None),
        };
        let base = head
            .rsplit("::")
            .next()
            .and_then(|segment| segment.rsplit('.').next())
            .unwrap_or(head)
            .trim();

        match base {
            "Option" | "Optional" => inner.map_or(Self::Unknown, Self::from_declared),
            "int" | "float" | "complex" | "Decimal" | "i8" | "i16" | "i32" | "i64" | "i128"
            | "isize" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "f32" | "f64"
            | "Number" => Self::Number,
            "str" | "string" | "String" | "char" => Self::String,
            "bool" | "boolean" => Self::Boolean,
            "NoneType" | "None" => Self::Null,
            "list" | "tuple" | "set" | "frozenset" | "Vec" | "VecDeque" | "HashSet"
            | "BTreeSet" | "IndexSet" => Self::Array,
            "dict" | "mapping" | "HashMap" | "BTreeMap" | "IndexMap" | "Map" => Self::Object,
            _ => Self::Unknown,
        }
    }

    /// JSON schema `type` keyword, if the category has one
    pub fn json_type(&self) -> Option<&'static str> {
        match self {
            Self::Number => Some("number"),
            Self::String => Some("string"),
            Self::Boolean => Some("boolean"),
            Self::Null => Some("null"),
            Self::Array => Some("array"),
            Self::Object => Some("object"),
            Self::Unknown => None,
        }
    }
}

/// Declared signature entry of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    declared_type: Option<String>,
    category: Option<TypeCategory>,
    default: Option<Value>,
    description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            category: None,
            default: None,
            description: None,
        }
    }

    /// Declare a parameter whose type name is taken from `T`.
    pub fn typed<T: ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name).declared_type(std::any::type_name::<T>())
    }

    pub fn declared_type(mut self, type_name: impl Into<String>) -> Self {
        self.declared_type = Some(type_name.into());
        self
    }

    /// Override the category derived from the declared type.
    pub fn category(mut self, category: TypeCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Declare a default value, making the parameter optional.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn is_reserved(&self) -> bool {
        self.name == RECEIVER_PARAMETER || self.name == CONFIG_PARAMETER
    }

    fn type_category(&self) -> TypeCategory {
        self.category.unwrap_or_else(|| {
            self.declared_type
                .as_deref()
                .map_or(TypeCategory::Unknown, TypeCategory::from_declared)
        })
    }
}

/// Normalized description of one function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub description: String,
    pub optional: bool,
    pub default: Value,
    #[serde(rename = "type")]
    pub kind: TypeCategory,
}

/// Build parameter descriptors from a declared signature and its documentation.
///
/// The receiver and configuration parameters are skipped wherever they appear.
/// Descriptions come from the parameter declaration first, then from the
/// documentation entry with the same name, and are empty otherwise.
pub fn describe_parameters(
    signature: &[Parameter],
    documentation: Option<&str>,
) -> Vec<ParameterDescriptor> {
    let docs = documentation.map(Docstring::parse).unwrap_or_default();

    signature
        .iter()
        .filter(|param| !param.is_reserved())
        .map(|param| ParameterDescriptor {
            name: param.name.clone(),
            description: param
                .description
                .clone()
                .or_else(|| docs.param(&param.name).map(str::to_string))
                .unwrap_or_default(),
            optional: param.default.is_some(),
            default: param.default.clone().unwrap_or(Value::Null),
            kind: param.type_category(),
        })
        .collect()
}

/// JSON object wrapper for call arguments and injected configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameters {
    inner: Value,
}

impl ToolParameters {
    pub fn new(value: Value) -> Self {
        Self { inner: value }
    }

    pub fn empty() -> Self {
        Self {
            inner: Value::Object(Map::new()),
        }
    }

    pub fn inner(&self) -> &Value {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        match &self.inner {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = self
            .inner
            .get(key)
            .ok_or_else(|| ToolError::invalid_field(key, "Parameter not found"))?;
        serde_json::from_value(value.clone())
            .map_err(|_| ToolError::invalid_field(key, "Invalid parameter type"))
    }

    pub fn get_optional<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.inner.get(key) {
            Some(value) if !value.is_null() => Ok(Some(
                serde_json::from_value(value.clone())
                    .map_err(|_| ToolError::invalid_field(key, "Invalid parameter type"))?,
            )),
            _ => Ok(None),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    pub fn get_number<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get(key)
    }

    /// Deserialize the whole object, e.g. into a configuration struct.
    pub fn parse<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = if self.inner.is_null() {
            Value::Object(Map::new())
        } else {
            self.inner.clone()
        };
        serde_json::from_value(value).map_err(|e| ToolError::invalid_parameters(e.to_string()))
    }

    /// Copy of these parameters with `key` removed.
    pub fn without(&self, key: &str) -> Self {
        let mut inner = self.inner.clone();
        if let Value::Object(map) = &mut inner {
            map.remove(key);
        }
        Self { inner }
    }
}

impl Default for ToolParameters {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for ToolParameters {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<ToolParameters> for Value {
    fn from(params: ToolParameters) -> Self {
        params.inner
    }
}

impl std::fmt::Display for ToolParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
