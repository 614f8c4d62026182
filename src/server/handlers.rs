// HTTP handlers
//
// POST /api/generate starts an async orchestration; GET .../stream attaches
// an SSE subscriber; GET .../status polls the job snapshot. Streams for
// terminal jobs replay the synthesized terminal event and close.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use futures::StreamExt;
use serde_json::json;

use super::ServerContext;
use crate::jobs::{Job, JobStatus};
use crate::plan::ProjectConfig;
use crate::progress::ProgressEvent;

pub fn create_router(context: Arc<ServerContext>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/generate/:job_id/stream", get(stream))
        .route("/api/generate/:job_id/status", get(status))
        .route("/api/generate/:job_id/cancel", post(cancel))
        .route("/api/jobs", get(list_jobs))
        .with_state(context)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn generate(
    State(context): State<Arc<ServerContext>>,
    Json(config): Json<ProjectConfig>,
) -> Response {
    if let Err(message) = config.validate() {
        return error_response(StatusCode::BAD_REQUEST, message);
    }

    // Concurrency admission only: the transport caps running orchestrations
    // per user and globally. Request-rate limiting lives upstream.
    if context.jobs.running_count().await >= context.config.max_concurrent_jobs {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "too many concurrent generations, retry shortly",
        );
    }

    let user_id = config.user_id.clone().unwrap_or_else(|| "anonymous".to_string());
    if context.jobs.running_count_for_user(&user_id).await
        >= context.config.max_concurrent_jobs_per_user
    {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "too many concurrent generations for this user, retry shortly",
        );
    }

    let job = context
        .jobs
        .create(&user_id, context.settings.max_iterations)
        .await;

    let orchestrator = Arc::clone(&context.orchestrator);
    let job_id = job.job_id.clone();
    tokio::spawn(async move {
        orchestrator.run(&job_id, config).await;
    });

    (StatusCode::ACCEPTED, Json(json!({ "jobId": job.job_id }))).into_response()
}

async fn status(
    State(context): State<Arc<ServerContext>>,
    Path(job_id): Path<String>,
) -> Response {
    match context.jobs.get(&job_id).await {
        Some(job) => Json(job).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "job not found"),
    }
}

async fn cancel(
    State(context): State<Arc<ServerContext>>,
    Path(job_id): Path<String>,
) -> Response {
    match context.jobs.get(&job_id).await {
        None => error_response(StatusCode::NOT_FOUND, "job not found"),
        Some(job) if job.status.is_terminal() => {
            error_response(StatusCode::CONFLICT, "job already finished")
        }
        Some(_) => {
            context.jobs.request_cancel(&job_id).await;
            Json(json!({ "status": "cancelling" })).into_response()
        }
    }
}

async fn list_jobs(
    State(context): State<Arc<ServerContext>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(user_id) = params.get("userId") else {
        return error_response(StatusCode::BAD_REQUEST, "userId query parameter is required");
    };
    Json(context.jobs.list_by_user(user_id).await).into_response()
}

fn sse_event(event: ProgressEvent) -> Result<Event, Infallible> {
    let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    Ok(Event::default().data(payload))
}

/// Rebuild the terminal event from the job record for late subscribers.
fn synthesize_terminal(job: &Job) -> ProgressEvent {
    match (&job.status, &job.result) {
        (JobStatus::Completed, Some(run)) => ProgressEvent::Completed {
            final_plan: run.final_plan.clone(),
            final_score: run.final_score,
            converged: run.converged,
            iteration_count: run.iteration_count,
        },
        _ => ProgressEvent::Error {
            message: job
                .error
                .clone()
                .unwrap_or_else(|| "generation failed".to_string()),
        },
    }
}

async fn stream(
    State(context): State<Arc<ServerContext>>,
    Path(job_id): Path<String>,
) -> Response {
    let Some(job) = context.jobs.get(&job_id).await else {
        return error_response(StatusCode::NOT_FOUND, "job not found");
    };

    let connected = ProgressEvent::Connected {
        job_id: job_id.clone(),
    };

    if job.status.is_terminal() {
        // Late attachment: replay connected + the synthesized terminal
        // event, then close.
        let events = vec![sse_event(connected), sse_event(synthesize_terminal(&job))];
        return Sse::new(futures::stream::iter(events)).into_response();
    }

    let receiver = context.hub.subscribe(&job_id).await;

    // The job may have terminated between the snapshot and the subscription;
    // re-read so that case degrades to a terminal replay instead of a
    // silent, never-ending stream.
    match context.jobs.get(&job_id).await {
        Some(job) if job.status.is_terminal() => {
            drop(receiver);
            context.hub.prune_closed(&job_id).await;
            let events = vec![sse_event(connected), sse_event(synthesize_terminal(&job))];
            return Sse::new(futures::stream::iter(events)).into_response();
        }
        None => {
            drop(receiver);
            context.hub.prune_closed(&job_id).await;
            return error_response(StatusCode::NOT_FOUND, "job not found");
        }
        Some(_) => {}
    }

    let initial = futures::stream::iter(vec![sse_event(connected)]);
    let live = futures::stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|event| (sse_event(event), receiver))
    });

    Sse::new(initial.chain(live))
        .keep_alive(KeepAlive::default())
        .into_response()
}
