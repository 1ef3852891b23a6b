use std::fmt;

use thiserror::Error;

/// Result type for toolkit operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Main error type for registration, lookup and invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Toolkit not found: {toolkit}")]
    ToolkitNotFound { toolkit: String },

    #[error("Function '{function}' not found in toolkit '{toolkit}'")]
    FunctionNotFound { toolkit: String, function: String },

    #[error("Toolkit '{toolkit}' is already registered")]
    DuplicateToolkit { toolkit: String },

    #[error("Function '{function}' is already registered in toolkit '{toolkit}'")]
    DuplicateFunction { toolkit: String, function: String },

    /// Raised by [`crate::Registry::put_function`] when the owning toolkit has
    /// not been declared yet. The function registrar turns it into a deferral.
    #[error("Toolkit '{toolkit}' is not registered")]
    UnknownToolkit { toolkit: String },

    #[error("Functions {functions:?} were declared for toolkit '{toolkit}' which was never registered")]
    OrphanedFunctions {
        toolkit: String,
        functions: Vec<String>,
    },

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Execution error: {0}")]
    Execution(String),
}

impl ToolError {
    /// Create a toolkit lookup error
    pub fn toolkit_not_found(toolkit: impl Into<String>) -> Self {
        Self::ToolkitNotFound {
            toolkit: toolkit.into(),
        }
    }

    /// Create a function lookup error
    pub fn function_not_found(toolkit: impl Into<String>, function: impl Into<String>) -> Self {
        Self::FunctionNotFound {
            toolkit: toolkit.into(),
            function: function.into(),
        }
    }

    pub fn duplicate_toolkit(toolkit: impl Into<String>) -> Self {
        Self::DuplicateToolkit {
            toolkit: toolkit.into(),
        }
    }

    pub fn duplicate_function(toolkit: impl Into<String>, function: impl Into<String>) -> Self {
        Self::DuplicateFunction {
            toolkit: toolkit.into(),
            function: function.into(),
        }
    }

    pub fn unknown_toolkit(toolkit: impl Into<String>) -> Self {
        Self::UnknownToolkit {
            toolkit: toolkit.into(),
        }
    }

    /// Create an invalid declaration error
    pub fn invalid_declaration(message: impl Into<String>) -> Self {
        Self::InvalidDeclaration(message.into())
    }

    /// Create an invalid parameters error
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Get the error category for classification
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ToolkitNotFound { .. } | Self::FunctionNotFound { .. } => ErrorCategory::Lookup,
            Self::DuplicateToolkit { .. }
            | Self::DuplicateFunction { .. }
            | Self::OrphanedFunctions { .. } => ErrorCategory::Duplicate,
            Self::UnknownToolkit { .. } | Self::InvalidDeclaration(_) => ErrorCategory::Declaration,
            Self::InvalidParameters(_) | Self::InvalidField { .. } => ErrorCategory::InvalidInput,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Execution(_) => ErrorCategory::Execution,
        }
    }

    /// Check if the error comes from a failed registry lookup
    pub fn is_lookup(&self) -> bool {
        self.category() == ErrorCategory::Lookup
    }

    /// Check if the error is a load-time programmer error that should abort
    /// plugin initialization
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Duplicate | ErrorCategory::Declaration
        )
    }
}

/// Error categories for classification and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lookup,
    Duplicate,
    Declaration,
    InvalidInput,
    Validation,
    Serialization,
    Execution,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::Duplicate => write!(f, "duplicate"),
            ErrorCategory::Declaration => write!(f, "declaration"),
            ErrorCategory::InvalidInput => write!(f, "invalid_input"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Serialization => write!(f, "serialization"),
            ErrorCategory::Execution => write!(f, "execution"),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ToolError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
