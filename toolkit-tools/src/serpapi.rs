//! SerpApi search toolkit.
//!
//! Exposes Google and YouTube search as toolkit functions. Backend failures
//! never cross the function boundary: they are logged and returned as
//! `{"error": message}`.

use std::sync::Arc;

use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use toolkit_core::{
    FunctionDecl, FunctionSet, Parameter, Registry, Result, ToolCategory, ToolError,
    ToolParameters, Toolkit, ToolkitConfiguration, ToolkitDecl, register_function,
    register_toolkit,
};
use tracing::{debug, error, warn};

use crate::backend::{SearchBackend, SearchEngine, SearchRequest};

/// Environment variable read by [`SerpApiTool::from_env`]
pub const API_KEY_ENV: &str = "SERPAPI_API_KEY";

/// Toolkit configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SerpApiConfig {
    /// SerpApi API key
    pub api_key: String,
}

/// Per-function configuration of the search functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchConfig {
    /// Number of results to return
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

fn default_num_results() -> u32 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_results: default_num_results(),
        }
    }
}

const SEARCH_GOOGLE_DOC: &str = "Performs a Google search and returns the organic results.

Args:
    query (str): The search query string.
    _config (dict): Configuration dictionary containing parameters for the
        search such as the number of results.

Returns:
    list: The organic search results, or an object with an \"error\" key.
";

const SEARCH_YOUTUBE_DOC: &str = "Search for YouTube videos based on a query.

Args:
    query: str
        The search query to use for fetching YouTube results.
    _config: dict
        A configuration dictionary that may include the number of results.

Returns:
    list | dict
        The video results, or an object with an \"error\" key.
";

/// Google and YouTube search through SerpApi
pub struct SerpApiTool {
    configuration: ToolkitConfiguration,
    backend: Arc<dyn SearchBackend>,
}

impl Toolkit for SerpApiTool {
    fn documentation() -> Option<&'static str> {
        Some("Search the web and YouTube through SerpApi.")
    }

    fn configuration(&self) -> &ToolkitConfiguration {
        &self.configuration
    }
}

impl SerpApiTool {
    /// Create a toolkit instance backed by the SerpApi HTTP API
    #[cfg(feature = "http")]
    pub fn new(configuration: ToolkitConfiguration) -> Self {
        Self::with_backend(
            configuration,
            Arc::new(crate::backend::HttpSearchBackend::new()),
        )
    }

    pub fn with_backend(configuration: ToolkitConfiguration, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            configuration,
            backend,
        }
    }

    /// Create a toolkit instance whose API key comes from `SERPAPI_API_KEY`
    #[cfg(feature = "http")]
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ToolError::invalid_field("api_key", format!("{API_KEY_ENV} is not set")))?;
        Ok(Self::new(
            ToolkitConfiguration::new().with_config("api_key", api_key),
        ))
    }

    /// Configured API key, empty when absent
    pub fn api_key(&self) -> &str {
        self.configuration.get_str("api_key").unwrap_or("")
    }

    /// Register the toolkit and its functions.
    ///
    /// Functions are declared first and attached when the toolkit registers.
    pub fn declare(registry: &mut Registry) -> Result<FunctionSet<Self>> {
        let google = register_function(
            registry,
            FunctionDecl::of::<Self>("search_google")
                .title("Search Google")
                .documentation(SEARCH_GOOGLE_DOC)
                .parameter(Parameter::new("self"))
                .parameter(Parameter::typed::<str>("query"))
                .parameter(Parameter::new("_config").declared_type("dict"))
                .with_schema::<SearchConfig>(),
            search_google_fn,
        )?;
        let youtube = register_function(
            registry,
            FunctionDecl::of::<Self>("search_youtube")
                .title("Search YouTube")
                .documentation(SEARCH_YOUTUBE_DOC)
                .parameter(Parameter::new("self"))
                .parameter(Parameter::typed::<str>("query"))
                .parameter(Parameter::new("_config").declared_type("dict"))
                .with_schema::<SearchConfig>(),
            search_youtube_fn,
        )?;

        register_toolkit(
            registry,
            ToolkitDecl::of::<Self>()
                .title("SerpApi Tools")
                .description("Tools for interacting with SerpApi")
                .icon("serpapi")
                .category(ToolCategory::Search)
                .with_schema::<SerpApiConfig>(),
        )?;

        Ok(FunctionSet::new().with(google).with(youtube))
    }

    /// Google search; returns the organic results or `{"error": ...}`
    pub async fn search_google(&self, query: &str, config: &ToolParameters) -> Value {
        self.run_search(SearchEngine::Google, query, config).await
    }

    /// YouTube search; returns the video results or `{"error": ...}`
    pub async fn search_youtube(&self, query: &str, config: &ToolParameters) -> Value {
        self.run_search(SearchEngine::YouTube, query, config).await
    }

    async fn run_search(&self, engine: SearchEngine, query: &str, config: &ToolParameters) -> Value {
        let search_config = match config.parse::<SearchConfig>() {
            Ok(search_config) => search_config,
            Err(err) => {
                error!(engine = engine.engine(), error = %err, "invalid search configuration");
                return json!({ "error": err.to_string() });
            }
        };
        let request = SearchRequest::new(engine, query)
            .with_num_results(search_config.num_results)
            .with_api_key(self.api_key());

        let mut installed = false;
        loop {
            match self.backend.search(&request).await {
                Ok(mut response) => {
                    let results = response
                        .get_mut(engine.results_key())
                        .map(Value::take)
                        .unwrap_or_else(|| json!([]));
                    debug!(engine = engine.engine(), "search completed");
                    return results;
                }
                Err(err) if err.is_unavailable() && !installed => {
                    warn!(engine = engine.engine(), error = %err, "search backend unavailable, installing");
                    if let Err(install_err) = self.backend.install().await {
                        error!(engine = engine.engine(), error = %install_err, "search backend install failed");
                        return json!({ "error": install_err.to_string() });
                    }
                    installed = true;
                }
                Err(err) => {
                    error!(engine = engine.engine(), error = %err, "search failed");
                    return json!({ "error": err.to_string() });
                }
            }
        }
    }
}

fn search_google_fn(
    tool: &SerpApiTool,
    args: ToolParameters,
    config: ToolParameters,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let query = args.get_string("query")?;
        Ok(tool.search_google(&query, &config).await)
    })
}

fn search_youtube_fn(
    tool: &SerpApiTool,
    args: ToolParameters,
    config: ToolParameters,
) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let query = args.get_string("query")?;
        Ok(tool.search_youtube(&query, &config).await)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;
    use crate::error::SearchError;

    /// Backend replaying scripted responses and recording requests
    #[derive(Default)]
    struct ScriptedBackend {
        responses: Mutex<Vec<std::result::Result<Value, SearchError>>>,
        requests: Mutex<Vec<SearchRequest>>,
        installs: Mutex<u32>,
        install_error: Option<SearchError>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<std::result::Result<Value, SearchError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<SearchRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn installs(&self) -> u32 {
            *self.installs.lock().unwrap()
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn search(&self, request: &SearchRequest) -> std::result::Result<Value, SearchError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(SearchError::unavailable("no scripted response"));
            }
            responses.remove(0)
        }

        async fn install(&self) -> std::result::Result<(), SearchError> {
            *self.installs.lock().unwrap() += 1;
            match &self.install_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    fn tool_with(backend: Arc<ScriptedBackend>) -> SerpApiTool {
        let configuration = ToolkitConfiguration::new()
            .with_config("api_key", "test-key")
            .with_function_config("search_google", json!({ "num_results": 3 }));
        SerpApiTool::with_backend(configuration, backend)
    }

    #[test]
    fn test_declare_registers_toolkit() {
        let mut registry = Registry::new();
        let functions = SerpApiTool::declare(&mut registry).unwrap();
        registry.ensure_complete().unwrap();
        assert_eq!(functions.names(), vec!["search_google", "search_youtube"]);

        let toolkit = registry.get("SerpApiTool").unwrap();
        assert_eq!(toolkit.title.as_deref(), Some("SerpApi Tools"));
        assert_eq!(toolkit.description.as_deref(), Some("Tools for interacting with SerpApi"));
        assert_eq!(toolkit.icon.as_deref(), Some("serpapi"));
        assert_eq!(toolkit.category.as_deref(), Some("Search"));
        let schema = toolkit.schema.as_ref().unwrap();
        assert_eq!(schema["required"], json!(["api_key"]));

        let google = registry.get_function("SerpApiTool", "search_google").unwrap();
        assert_eq!(google.title.as_deref(), Some("Search Google"));
        assert_eq!(google.parameters.keys().collect::<Vec<_>>(), vec!["query"]);
        assert_eq!(google.parameters["query"].description, "The search query string.");
        assert!(!google.parameters["query"].optional);
        assert_eq!(
            google.schema.as_ref().unwrap()["properties"]["num_results"]["default"],
            json!(10)
        );

        let youtube = registry.get_function("SerpApiTool", "search_youtube").unwrap();
        assert_eq!(
            youtube.parameters["query"].description,
            "The search query to use for fetching YouTube results."
        );
    }

    #[tokio::test]
    async fn test_google_results_pass_through() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(json!({
            "search_metadata": { "status": "Success" },
            "organic_results": [{ "title": "Rust", "link": "https://www.rust-lang.org" }]
        }))]));
        let tool = tool_with(backend.clone());
        let mut registry = Registry::new();
        let functions = SerpApiTool::declare(&mut registry).unwrap();

        let results = functions
            .invoke(&tool, "search_google", json!({ "query": "rust" }))
            .await
            .unwrap();
        assert_eq!(
            results,
            json!([{ "title": "Rust", "link": "https://www.rust-lang.org" }])
        );

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            SearchRequest::new(SearchEngine::Google, "rust")
                .with_num_results(3)
                .with_api_key("test-key")
        );
    }

    #[tokio::test]
    async fn test_missing_function_config_uses_default_count() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(json!({ "search_metadata": {} }))]));
        let tool = tool_with(backend.clone());

        let results = tool.search_youtube("ferris", &ToolParameters::empty()).await;
        assert_eq!(results, json!([]));
        assert_eq!(backend.requests()[0].num_results, 10);
        assert_eq!(backend.requests()[0].engine, SearchEngine::YouTube);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_backend_error_becomes_error_value() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(SearchError::api(
            "Invalid API key.",
        ))]));
        let tool = tool_with(backend.clone());

        let result = tool.search_google("rust", &ToolParameters::empty()).await;
        assert_eq!(result, json!({ "error": "Search API error: Invalid API key." }));
        assert_eq!(backend.installs(), 0);
        assert!(logs_contain("search failed"));
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_installed_and_retried_once() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(SearchError::unavailable("client not built")),
            Ok(json!({ "video_results": [{ "title": "Ferris" }] })),
        ]));
        let tool = tool_with(backend.clone());

        let results = tool.search_youtube("ferris", &ToolParameters::empty()).await;
        assert_eq!(results, json!([{ "title": "Ferris" }]));
        assert_eq!(backend.installs(), 1);
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_happens_at_most_once() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(SearchError::unavailable("first")),
            Err(SearchError::unavailable("second")),
        ]));
        let tool = tool_with(backend.clone());

        let result = tool.search_google("rust", &ToolParameters::empty()).await;
        assert_eq!(
            result,
            json!({ "error": "Search backend unavailable: second" })
        );
        assert_eq!(backend.installs(), 1);
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_install_failure_is_reported() {
        let backend = Arc::new(ScriptedBackend {
            install_error: Some(SearchError::unavailable("cannot build client")),
            ..ScriptedBackend::new(vec![Err(SearchError::unavailable("client not built"))])
        });
        let tool = tool_with(backend.clone());

        let result = tool.search_google("rust", &ToolParameters::empty()).await;
        assert_eq!(
            result,
            json!({ "error": "Search backend unavailable: cannot build client" })
        );
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_configuration_is_reported() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let tool = tool_with(backend.clone());

        let config = ToolParameters::new(json!({ "num_results": "many" }));
        let result = tool.search_google("rust", &config).await;
        assert!(result["error"].as_str().unwrap().starts_with("Invalid parameters"));
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_api_key_defaults_to_empty() {
        let tool = SerpApiTool::with_backend(
            ToolkitConfiguration::new(),
            Arc::new(ScriptedBackend::default()),
        );
        assert_eq!(tool.api_key(), "");
    }
}
