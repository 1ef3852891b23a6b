//! Declares the built-in toolkits, prints the registry and, when
//! `SERPAPI_API_KEY` is set, runs a Google and a YouTube search.
//!
//! ```sh
//! SERPAPI_API_KEY=... cargo run -p toolkit-tools --example serpapi_search -- "rust async"
//! ```

use serde_json::json;
use toolkit_core::{Registry, ToolkitConfiguration};
use toolkit_tools::prelude::*;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut registry = Registry::new();
    let builtins = declare_all(&mut registry)?;
    println!("{}", serde_json::to_string_pretty(&registry.to_json()?)?);

    let Ok(api_key) = std::env::var("SERPAPI_API_KEY") else {
        warn!("SERPAPI_API_KEY is not set, skipping live search");
        return Ok(());
    };
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "rust programming language".to_string());

    let configuration = ToolkitConfiguration::new()
        .with_config("api_key", api_key)
        .with_function_config("search_google", json!({ "num_results": 5 }))
        .with_function_config("search_youtube", json!({ "num_results": 3 }));
    let tool = SerpApiTool::new(configuration);

    for function in builtins.serpapi.names() {
        info!(function, query = %query, "running search");
        let results = builtins
            .serpapi
            .invoke(&tool, function, json!({ "query": query }))
            .await?;
        println!("{function}: {}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}
