//! Toolkit Tools - built-in toolkits for the toolkit registry
//!
//! Currently ships the SerpApi toolkit with Google and YouTube search. All
//! toolkits are declared into a [`Registry`] by [`declare_all`], which runs
//! once during initialization before the registry is shared.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use serde_json::json;
//! use toolkit_core::Registry;
//! use toolkit_tools::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> toolkit_core::Result<()> {
//!     let mut registry = Registry::new();
//!     let builtins = declare_all(&mut registry)?;
//!
//!     let tool = SerpApiTool::from_env()?;
//!     let results = builtins
//!         .serpapi
//!         .invoke(&tool, "search_google", json!({"query": "rust async"}))
//!         .await?;
//!     println!("{results}");
//!     Ok(())
//! }
//! ```

/// Search backends.
pub mod backend;
/// Search error types.
pub mod error;
/// SerpApi toolkit.
pub mod serpapi;

use toolkit_core::{FunctionSet, Registry, Result};
use tracing::debug;

pub use backend::{SearchBackend, SearchEngine, SearchRequest};
#[cfg(feature = "http")]
pub use backend::HttpSearchBackend;
pub use error::SearchError;
pub use serpapi::{SearchConfig, SerpApiConfig, SerpApiTool};

/// Dispatch tables of every built-in toolkit
#[derive(Debug)]
pub struct Builtins {
    pub serpapi: FunctionSet<SerpApiTool>,
}

/// Declare every built-in toolkit and check that no function was left
/// without its toolkit.
pub fn declare_all(registry: &mut Registry) -> Result<Builtins> {
    let serpapi = SerpApiTool::declare(registry)?;
    registry.ensure_complete()?;
    debug!(toolkits = registry.len(), "declared built-in toolkits");
    Ok(Builtins { serpapi })
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Builtins, declare_all,
        backend::{SearchBackend, SearchEngine, SearchRequest},
        error::SearchError,
        serpapi::{SearchConfig, SerpApiConfig, SerpApiTool},
    };
}

#[cfg(test)]
mod tests {
    use toolkit_core::ToolError;

    use super::*;

    #[test]
    fn test_declare_all() {
        let mut registry = Registry::new();
        let builtins = declare_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(builtins.serpapi.len(), 2);
        assert!(registry.deferred().is_empty());
    }

    #[test]
    fn test_declare_all_twice_is_rejected() {
        let mut registry = Registry::new();
        declare_all(&mut registry).unwrap();
        let err = declare_all(&mut registry).unwrap_err();
        assert_eq!(
            err,
            ToolError::duplicate_function("SerpApiTool", "search_google")
        );
    }
}
