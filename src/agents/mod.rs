// Generation agents
//
// Five LLM-backed roles plus the optional furniture pass. Every agent is a
// thin executor with the same contract: typed input in, typed output plus
// timing/token metadata out. The orchestrator decides which failures abort
// the run and which are recovered locally.

mod cost;
mod critic;
mod furniture;
mod input;
mod refinement;
mod spatial;

pub use cost::{CostAgent, CostEstimate};
pub use critic::CriticAgent;
pub use furniture::FurnitureAgent;
pub use input::InputAgent;
pub use refinement::RefinementAgent;
pub use spatial::SpatialAgent;

use thiserror::Error;

/// Typed agent failure. The orchestrator treats spatial/critic/refinement
/// failures as fatal and recovers the rest locally.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} agent model call failed: {message}")]
    Model { agent: &'static str, message: String },

    #[error("{agent} agent returned undecodable output: {message}")]
    Parse { agent: &'static str, message: String },

    #[error("{agent} agent timed out")]
    Timeout { agent: &'static str },

    #[error("cancelled")]
    Cancelled,
}

impl AgentError {
    /// Classify a model-layer error, surfacing provider timeouts distinctly.
    pub(crate) fn from_model(agent: &'static str, err: anyhow::Error) -> Self {
        let timed_out = err
            .chain()
            .any(|cause| match cause.downcast_ref::<reqwest::Error>() {
                Some(e) => e.is_timeout(),
                None => false,
            });
        if timed_out {
            AgentError::Timeout { agent }
        } else {
            AgentError::Model {
                agent,
                message: format!("{err:#}"),
            }
        }
    }

    pub(crate) fn parse(agent: &'static str, err: impl std::fmt::Display) -> Self {
        AgentError::Parse {
            agent,
            message: err.to_string(),
        }
    }
}

/// Execution metadata attached to every agent result.
#[derive(Debug, Clone)]
pub struct AgentMetadata {
    pub agent: &'static str,
    /// Model the router selected for this role
    pub requested_model: String,
    /// Model that actually served the call (differs after a fallback)
    pub model_used: String,
    pub duration_ms: u64,
    pub token_count: Option<u32>,
}

impl AgentMetadata {
    /// Whether the fallback chain rerouted this call.
    pub fn was_rerouted(&self) -> bool {
        self.requested_model != self.model_used
    }
}

/// An agent result: the typed payload plus its execution metadata.
#[derive(Debug, Clone)]
pub struct AgentOutput<T> {
    pub data: T,
    pub metadata: AgentMetadata,
}
