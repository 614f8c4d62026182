// HTTP server module
//
// Thin axum transport over the core: job creation, SSE progress streaming,
// status polling and cancellation. The server context is built once at
// startup and threaded into every handler. Admission control here is
// concurrency-shaped only (per-user and global caps on running
// orchestrations); request-rate limiting belongs to an upstream collaborator.

mod handlers;

pub use handlers::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;

use crate::config::constants::MAX_BODY_BYTES;
use crate::config::{Config, ServerConfig};
use crate::jobs::JobStore;
use crate::llm::StructuredGenerator;
use crate::orchestrator::{Orchestrator, OrchestratorSettings};
use crate::progress::ProgressHub;

/// Everything the transport layer needs, constructed once at startup.
pub struct ServerContext {
    pub jobs: JobStore,
    pub hub: ProgressHub,
    pub orchestrator: Arc<Orchestrator>,
    pub settings: OrchestratorSettings,
    pub config: ServerConfig,
}

impl ServerContext {
    pub fn new(model: Arc<dyn StructuredGenerator>, config: &Config) -> Self {
        let jobs = JobStore::new(config.server.max_sessions, config.server.job_ttl_minutes);
        let hub = ProgressHub::new();
        let settings = OrchestratorSettings {
            max_iterations: config.max_iterations,
            score_threshold: config.score_threshold,
        };
        let orchestrator = Arc::new(Orchestrator::new(
            model,
            jobs.clone(),
            hub.clone(),
            settings,
        ));

        Self {
            jobs,
            hub,
            orchestrator,
            settings,
            config: config.server.clone(),
        }
    }
}

/// Bind and serve until shutdown.
pub async fn serve(context: Arc<ServerContext>) -> Result<()> {
    let addr: SocketAddr = context
        .config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", context.config.bind_address))?;

    let app = create_router(Arc::clone(&context))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting planforge server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
