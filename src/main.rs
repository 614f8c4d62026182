// PlanForge - Multi-agent floor plan generation service
// Main entry point

use std::sync::Arc;

use anyhow::Result;

use planforge::config::load_config;
use planforge::llm::GeminiClient;
use planforge::server::{serve, ServerContext};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration; fails fast when the API key is missing
    let config = load_config()?;

    // Create the LLM client
    let model = Arc::new(GeminiClient::new(config.api_key.clone())?);

    // Build the server context and serve
    let context = Arc::new(ServerContext::new(model, &config));
    serve(context).await
}
