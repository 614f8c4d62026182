// Critic agent — qualitative plan assessment
//
// Reads the current plan plus both validator reports and returns six
// subscores with bounded critique/strength lists. Never mutates the plan.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use super::{AgentError, AgentMetadata, AgentOutput};
use crate::llm::{StructuredGenerator, StructuredRequest};
use crate::plan::{Critique, FloorPlanGraph, ValidationReport};
use crate::router::{route, AgentRole};

const AGENT_NAME: &str = "critic";

pub struct CriticAgent {
    model: Arc<dyn StructuredGenerator>,
}

impl CriticAgent {
    pub fn new(model: Arc<dyn StructuredGenerator>) -> Self {
        Self { model }
    }

    pub async fn execute(
        &self,
        plan: &FloorPlanGraph,
        regulatory: &ValidationReport,
        cultural: &ValidationReport,
    ) -> Result<AgentOutput<Critique>, AgentError> {
        let started = Instant::now();
        let router_config = route(AgentRole::Critic);

        let prompt = build_prompt(plan, regulatory, cultural);
        let request = StructuredRequest::new(prompt, router_config.clone(), critique_schema());
        let reply = self
            .model
            .generate_structured(&request)
            .await
            .map_err(|e| AgentError::from_model(AGENT_NAME, e))?;

        let critique: Critique =
            serde_json::from_value(reply.data).map_err(|e| AgentError::parse(AGENT_NAME, e))?;

        Ok(AgentOutput {
            // Models occasionally stray outside [0,1]; clamp rather than fail
            data: critique.normalize(),
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

fn build_prompt(
    plan: &FloorPlanGraph,
    regulatory: &ValidationReport,
    cultural: &ValidationReport,
) -> String {
    let rooms: Vec<String> = plan
        .rooms
        .iter()
        .map(|r| {
            format!(
                "- {} ({:?}, {:.1} sqm, {:?} sector) at ({:.1}, {:.1}) {:.1}x{:.1}",
                r.room.name, r.room.room_type, r.area, r.sector, r.room.x, r.room.y,
                r.room.width, r.room.height,
            )
        })
        .collect();

    let violations: Vec<String> = regulatory
        .violations
        .iter()
        .chain(cultural.violations.iter())
        .map(|v| format!("- [{:?}] {}: {}", v.severity, v.rule, v.message))
        .collect();

    format!(
        "Critique this residential floor plan.\n\n\
         Plot: {:.1} sqm, built-up {:.1} sqm, coverage {:.0}%.\n\
         Rooms:\n{}\n\n\
         Validator findings (regulatory score {:.2}, cultural score {:.2}):\n{}\n\n\
         Score the plan from 0 to 1 on spatialEfficiency, circulationQuality, \
         naturalLighting, privacyGradient and aestheticBalance, give your \
         overallConfidence in the design, and list at most five critiques and \
         five strengths.",
        plan.total_area,
        plan.built_up_area,
        plan.plot_coverage_ratio * 100.0,
        rooms.join("\n"),
        regulatory.score,
        cultural.score,
        if violations.is_empty() {
            "- none".to_string()
        } else {
            violations.join("\n")
        },
    )
}

fn critique_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "spatialEfficiency": {"type": "number"},
            "circulationQuality": {"type": "number"},
            "naturalLighting": {"type": "number"},
            "privacyGradient": {"type": "number"},
            "aestheticBalance": {"type": "number"},
            "overallConfidence": {"type": "number"},
            "critiques": {"type": "array", "items": {"type": "string"}},
            "strengths": {"type": "array", "items": {"type": "string"}}
        },
        "required": [
            "spatialEfficiency", "circulationQuality", "naturalLighting",
            "privacyGradient", "aestheticBalance", "overallConfidence",
            "critiques", "strengths"
        ]
    })
}
