// Progress event wire format
//
// Tagged union serialized as {"type": ..., "data": ...}. The type set is
// closed; consumers are expected to ignore unknown types and fields.

use serde::{Deserialize, Serialize};

use crate::plan::{GeneratedPlan, ScoreComponent, Violation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// First event on every stream attachment.
    #[serde(rename_all = "camelCase")]
    Connected { job_id: String },

    #[serde(rename_all = "camelCase")]
    AgentStart { agent: String },

    #[serde(rename_all = "camelCase")]
    AgentComplete {
        agent: String,
        /// Model that actually served the call
        model: String,
        duration_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_count: Option<u32>,
    },

    #[serde(rename_all = "camelCase")]
    IterationStart { iteration: u32, max_iterations: u32 },

    /// Emitted once per validator per iteration; only the matching pair of
    /// fields is present.
    #[serde(rename_all = "camelCase")]
    ViolationUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regulatory_violations: Option<Vec<Violation>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regulatory_score: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vastu_violations: Option<Vec<Violation>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vastu_score: Option<f64>,
    },

    #[serde(rename_all = "camelCase")]
    ScoreUpdate {
        iteration: u32,
        final_score: f64,
        breakdown: Vec<ScoreComponent>,
        passes_threshold: bool,
    },

    /// Fallback routing notice: the requested model was substituted.
    #[serde(rename_all = "camelCase")]
    MoeRouting {
        agent: String,
        requested: String,
        used: String,
    },

    #[serde(rename_all = "camelCase")]
    Completed {
        final_plan: GeneratedPlan,
        final_score: f64,
        converged: bool,
        iteration_count: u32,
    },

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

impl ProgressEvent {
    /// Whether this event terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Completed { .. } | ProgressEvent::Error { .. })
    }
}
