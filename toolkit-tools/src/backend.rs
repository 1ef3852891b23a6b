//! Search backends used by the SerpApi toolkit.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SearchError;

/// Search engine served by SerpApi
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    Google,
    YouTube,
}

impl SearchEngine {
    /// Value of the `engine` request parameter
    pub fn engine(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::YouTube => "youtube",
        }
    }

    /// Request parameter carrying the query text
    pub fn query_param(&self) -> &'static str {
        match self {
            Self::Google => "q",
            Self::YouTube => "search_query",
        }
    }

    /// Response field holding the result records
    pub fn results_key(&self) -> &'static str {
        match self {
            Self::Google => "organic_results",
            Self::YouTube => "video_results",
        }
    }
}

/// One search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub engine: SearchEngine,
    pub query: String,
    pub num_results: u32,
    pub api_key: String,
}

impl SearchRequest {
    pub fn new(engine: SearchEngine, query: impl Into<String>) -> Self {
        Self {
            engine,
            query: query.into(),
            num_results: 10,
            api_key: String::new(),
        }
    }

    pub fn with_num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

/// Backend executing search requests.
///
/// `search` returns the full response document. A backend that cannot serve
/// requests yet reports [`SearchError::Unavailable`]; `install` is the
/// remediation for that state.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError>;

    async fn install(&self) -> Result<(), SearchError>;
}

#[cfg(feature = "http")]
pub use client::HttpSearchBackend;

#[cfg(feature = "http")]
mod client {
    use std::time::Duration;

    use async_trait::async_trait;
    use once_cell::sync::OnceCell;
    use serde_json::Value;
    use tracing::debug;

    use super::{SearchBackend, SearchRequest};
    use crate::error::SearchError;

    pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";

    /// SerpApi over HTTP. The client is built on first use.
    #[derive(Debug)]
    pub struct HttpSearchBackend {
        endpoint: String,
        timeout: Duration,
        client: OnceCell<reqwest::Client>,
    }

    impl HttpSearchBackend {
        pub fn new() -> Self {
            Self::with_endpoint(DEFAULT_ENDPOINT)
        }

        pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
            Self {
                endpoint: endpoint.into(),
                timeout: Duration::from_secs(30),
                client: OnceCell::new(),
            }
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        pub fn endpoint(&self) -> &str {
            &self.endpoint
        }

        fn client(&self) -> Result<&reqwest::Client, SearchError> {
            self.client.get_or_try_init(|| {
                reqwest::Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(|e| SearchError::unavailable(e.to_string()))
            })
        }
    }

    impl Default for HttpSearchBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl SearchBackend for HttpSearchBackend {
        async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
            let client = self.client()?;
            let num = request.num_results.to_string();
            let params = [
                ("engine", request.engine.engine()),
                (request.engine.query_param(), request.query.as_str()),
                ("num", num.as_str()),
                ("api_key", request.api_key.as_str()),
            ];

            debug!(engine = request.engine.engine(), num = request.num_results, "sending search request");
            let response = client.get(&self.endpoint).query(&params).send().await?;
            let status = response.status();
            let text = response.text().await?;
            let body: Option<Value> = serde_json::from_str(&text).ok();
            let api_error = body
                .as_ref()
                .and_then(|body| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string);

            if !status.is_success() {
                return Err(SearchError::from_status(
                    status.as_u16(),
                    api_error.unwrap_or(text),
                ));
            }
            if let Some(message) = api_error {
                return Err(SearchError::api(message));
            }
            body.ok_or_else(|| SearchError::Serialization("response is not valid JSON".to_string()))
        }

        async fn install(&self) -> Result<(), SearchError> {
            self.client().map(|_| ())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_parameters() {
        assert_eq!(SearchEngine::Google.query_param(), "q");
        assert_eq!(SearchEngine::Google.results_key(), "organic_results");
        assert_eq!(SearchEngine::YouTube.engine(), "youtube");
        assert_eq!(SearchEngine::YouTube.query_param(), "search_query");
        assert_eq!(SearchEngine::YouTube.results_key(), "video_results");
    }

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new(SearchEngine::Google, "rust")
            .with_num_results(3)
            .with_api_key("key");
        assert_eq!(request.query, "rust");
        assert_eq!(request.num_results, 3);
        assert_eq!(request.api_key, "key");
    }
}
