// Cost agent — bill of materials and cost range estimation
//
// Non-blocking for convergence: the orchestrator recovers a failure here
// with an empty BOM and a zero cost range.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::json;

use super::{AgentError, AgentMetadata, AgentOutput};
use crate::llm::{StructuredGenerator, StructuredRequest};
use crate::plan::{BomLine, CostRange, FloorPlanGraph, NormalizedSpec};
use crate::router::{route, AgentRole};

const AGENT_NAME: &str = "cost";

pub struct CostAgent {
    model: Arc<dyn StructuredGenerator>,
}

/// BOM plus cost range as returned by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct CostEstimate {
    pub bom: Vec<BomLine>,
    #[serde(rename = "totalCostRange")]
    pub total_cost_range: CostRange,
}

impl CostAgent {
    pub fn new(model: Arc<dyn StructuredGenerator>) -> Self {
        Self { model }
    }

    pub async fn execute(
        &self,
        plan: &FloorPlanGraph,
        spec: &NormalizedSpec,
    ) -> Result<AgentOutput<CostEstimate>, AgentError> {
        let started = Instant::now();
        let router_config = route(AgentRole::Cost);

        let prompt = build_prompt(plan, spec);
        let request = StructuredRequest::new(prompt, router_config.clone(), cost_schema());
        let reply = self
            .model
            .generate_structured(&request)
            .await
            .map_err(|e| AgentError::from_model(AGENT_NAME, e))?;

        let estimate: CostEstimate =
            serde_json::from_value(reply.data).map_err(|e| AgentError::parse(AGENT_NAME, e))?;

        Ok(AgentOutput {
            data: estimate,
            metadata: AgentMetadata {
                agent: AGENT_NAME,
                requested_model: router_config.model,
                model_used: reply.model_used,
                duration_ms: started.elapsed().as_millis() as u64,
                token_count: reply.token_count,
            },
        })
    }
}

fn build_prompt(plan: &FloorPlanGraph, spec: &NormalizedSpec) -> String {
    format!(
        "Estimate the construction bill of materials for this house.\n\n\
         Built-up area: {:.1} sqm across {} floor(s). Plot: {:.1} m x {:.1} m.\n\
         Rooms: {}.\n\n\
         Return a bom array (material, quantity, unit, estimatedCost in INR) for \
         the principal materials — cement, steel, bricks, sand, aggregate, \
         flooring, doors and windows, paint — and a totalCostRange {{min, max, \
         currency}} covering construction at standard finish quality.",
        plan.built_up_area,
        spec.config.floor_count(),
        spec.plot.width,
        spec.plot.depth,
        plan.rooms
            .iter()
            .map(|r| r.room.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn cost_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "bom": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "material": {"type": "string"},
                        "quantity": {"type": "number"},
                        "unit": {"type": "string"},
                        "estimatedCost": {"type": "number"}
                    },
                    "required": ["material", "quantity", "unit", "estimatedCost"]
                }
            },
            "totalCostRange": {
                "type": "object",
                "properties": {
                    "min": {"type": "number"},
                    "max": {"type": "number"},
                    "currency": {"type": "string"}
                },
                "required": ["min", "max", "currency"]
            }
        },
        "required": ["bom", "totalCostRange"]
    })
}
