//! Toolkit Core - registration and introspection for plugin toolkits
//!
//! A toolkit is a type grouping related functions that share configuration and
//! presentation metadata (title, icon, category). This crate provides:
//!
//! - An explicitly constructed [`Registry`] of toolkit and function records
//! - Toolkit and function registrars that tolerate functions declared before
//!   their toolkit
//! - Parameter introspection from declared signatures and docstring-style
//!   documentation
//! - Call-time injection of per-function configuration into wrapped functions
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use toolkit_core::prelude::*;
//!
//! struct Echo {
//!     configuration: ToolkitConfiguration,
//! }
//!
//! impl Toolkit for Echo {
//!     fn configuration(&self) -> &ToolkitConfiguration {
//!         &self.configuration
//!     }
//! }
//!
//! fn echo(_tool: &Echo, args: ToolParameters, config: ToolParameters) -> BoxFuture<'_, Result<Value>> {
//!     Box::pin(async move {
//!         let text: String = args.get("text")?;
//!         Ok(json!({ "text": text, "config": config.inner().clone() }))
//!     })
//! }
//!
//! let mut registry = Registry::new();
//! let echo_fn = register_function(
//!     &mut registry,
//!     FunctionDecl::of::<Echo>("echo")
//!         .title("Echo")
//!         .documentation("Echo text.\n\nArgs:\n    text (str): Text to echo.")
//!         .parameter(Parameter::new("text").declared_type("str")),
//!     echo,
//! )?;
//! register_toolkit(&mut registry, ToolkitDecl::of::<Echo>().title("Echo Tools"))?;
//!
//! let record = registry.get_function("Echo", "echo")?;
//! assert_eq!(record.parameters["text"].description, "Text to echo.");
//!
//! let tool = Echo { configuration: ToolkitConfiguration::default() };
//! let output = echo_fn.call(&tool, json!({ "text": "hi" }).into()).await?;
//! ```

/// Toolkit categories.
pub mod category;
/// Docstring parsing for parameter descriptions.
pub mod docstring;
/// Error types for registration and invocation.
pub mod error;
/// Parameter declarations, descriptors and call arguments.
pub mod parameters;
/// Toolkit and function registrars.
pub mod registrar;
/// Registry store and records.
pub mod registry;
/// JSON schema helpers.
pub mod schema;
/// Toolkit trait and instance configuration.
pub mod toolkit;

pub use category::ToolCategory;
pub use error::{ErrorCategory, Result, ToolError};
pub use parameters::{
    CONFIG_PARAMETER, Parameter, ParameterDescriptor, RECEIVER_PARAMETER, ToolParameters,
    TypeCategory, describe_parameters,
};
pub use registrar::{
    FunctionBody, FunctionDecl, FunctionSet, ToolkitDecl, WrappedFunction, register_function,
    register_toolkit,
};
pub use registry::{FunctionRecord, Registry, ReturnsDescriptor, ToolkitRecord};
pub use schema::{InputSchema, schema_of};
pub use toolkit::{FUNCTION_CONFIG_KEY, Toolkit, ToolkitConfiguration};

/// Prelude module for convenient imports
pub mod prelude {
    pub use futures::future::BoxFuture;
    pub use serde_json::{Value, json};

    pub use crate::{
        category::ToolCategory,
        error::{Result, ToolError},
        parameters::{Parameter, ParameterDescriptor, ToolParameters, TypeCategory},
        registrar::{
            FunctionDecl, FunctionSet, ToolkitDecl, WrappedFunction, register_function,
            register_toolkit,
        },
        registry::{FunctionRecord, Registry, ToolkitRecord},
        toolkit::{Toolkit, ToolkitConfiguration},
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    struct Search {
        configuration: ToolkitConfiguration,
    }

    impl Toolkit for Search {
        fn configuration(&self) -> &ToolkitConfiguration {
            &self.configuration
        }
    }

    const LOOKUP_DOC: &str = "Look something up.

Args:
    query (str): What to look up.
    _config (dict): Injected per-call configuration.
";

    fn lookup(
        _tool: &Search,
        args: ToolParameters,
        config: ToolParameters,
    ) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let query: String = args.get("query")?;
            Ok(json!({ "query": query, "config": config.inner().clone() }))
        })
    }

    fn declare(registry: &mut Registry, toolkit_first: bool) -> Result<FunctionSet<Search>> {
        let decl = FunctionDecl::of::<Search>("lookup")
            .title("Lookup")
            .documentation(LOOKUP_DOC)
            .parameter(Parameter::new("self"))
            .parameter(Parameter::typed::<String>("query"))
            .parameter(Parameter::new("_config").declared_type("dict"))
            .parameter(Parameter::typed::<u32>("limit").default(5));

        if toolkit_first {
            register_toolkit(registry, ToolkitDecl::of::<Search>().title("Search"))?;
            let lookup = register_function(registry, decl, lookup)?;
            Ok(FunctionSet::new().with(lookup))
        } else {
            let lookup = register_function(registry, decl, lookup)?;
            register_toolkit(registry, ToolkitDecl::of::<Search>().title("Search"))?;
            Ok(FunctionSet::new().with(lookup))
        }
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let mut first = Registry::new();
        let mut last = Registry::new();
        declare(&mut first, true).unwrap();
        declare(&mut last, false).unwrap();

        for registry in [&first, &last] {
            let toolkit = registry.get("Search").unwrap();
            assert_eq!(toolkit.functions.len(), 1);
            let record = registry.get_function("Search", "lookup").unwrap();
            assert_eq!(record.parameters["query"].description, "What to look up.");
            assert!(!record.parameters["query"].optional);
            assert_eq!(record.parameters["limit"].default, json!(5));
            assert!(record.parameters["limit"].optional);
            registry.ensure_complete().unwrap();
        }
        assert_eq!(first.to_json().unwrap(), last.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_end_to_end_invocation() {
        let mut registry = Registry::new();
        let functions = declare(&mut registry, false).unwrap();

        let tool = Search {
            configuration: ToolkitConfiguration::new(),
        };
        let output = functions
            .invoke(&tool, "lookup", json!({ "query": "hello" }))
            .await
            .unwrap();
        assert_eq!(output, json!({ "query": "hello", "config": {} }));
    }
}
