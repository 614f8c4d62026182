// Model router — per-agent-role model selection
//
// Thinker roles (spatial, critic, refinement) get the heavier model and a
// looser temperature; parser/utility roles (input, cost, furniture) get the
// fast tier and a tighter temperature. The table is closed and static.

use serde::{Deserialize, Serialize};

/// The heavy reasoning model used by the design-thinking agents.
pub const HEAVY_MODEL: &str = "gemini-2.5-pro-preview-05-06";
/// The fast model used by parser and utility agents.
pub const FAST_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// The six agent roles the router knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Input,
    Spatial,
    Critic,
    Refinement,
    Cost,
    Furniture,
}

impl AgentRole {
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::Input => "input",
            AgentRole::Spatial => "spatial",
            AgentRole::Critic => "critic",
            AgentRole::Refinement => "refinement",
            AgentRole::Cost => "cost",
            AgentRole::Furniture => "furniture",
        }
    }
}

/// Model id, sampling temperature and output cap for one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRouterConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Resolve the model configuration for a role.
pub fn route(role: AgentRole) -> ModelRouterConfig {
    let (model, temperature, max_output_tokens) = match role {
        AgentRole::Input => (FAST_MODEL, 0.2, 2048),
        AgentRole::Spatial => (HEAVY_MODEL, 0.7, 16384),
        AgentRole::Critic => (HEAVY_MODEL, 0.3, 4096),
        AgentRole::Refinement => (HEAVY_MODEL, 0.5, 16384),
        AgentRole::Cost => (FAST_MODEL, 0.2, 4096),
        AgentRole::Furniture => (FAST_MODEL, 0.4, 8192),
    };
    ModelRouterConfig {
        model: model.to_string(),
        temperature,
        max_output_tokens,
    }
}
