// Refinement agent — violation-driven plan revision
//
// Receives the current plan, the normalized requirements, both violation
// lists and the critique, and returns a replacement room list plus the
// human-readable changes it applied. Post-processing re-enriches, recomputes
// totals and appends the changes to the design log under a refinement-pass
// delimiter.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::json;

use super::spatial::{graph_from_rooms, room_array_schema};
use super::{AgentError, AgentMetadata, AgentOutput};
use crate::llm::{StructuredGenerator, StructuredRequest};
use crate::plan::{Critique, FloorPlanGraph, NormalizedSpec, Room, ValidationReport};
use crate::router::{route, AgentRole};

const AGENT_NAME: &str = "refinement";

/// Delimiter written into the design log before each pass's changes.
pub const REFINEMENT_PASS_MARKER: &str = "--- Refinement Pass ---";

pub struct RefinementAgent {
    model: Arc<dyn StructuredGenerator>,
}

#[derive(Debug, Deserialize)]
struct RefinedLayout {
    rooms: Vec<Room>,
    #[serde(rename = "changesApplied", default)]
    changes_applied: Vec<String>,
}

impl RefinementAgent {
    pub fn new(model: Arc<dyn StructuredGenerator>) -> Self {
        Self { model }
    }

    pub async fn execute(
        &self,
        plan: &FloorPlanGraph,
        spec: &NormalizedSpec,
        regulatory: &ValidationReport,
        cultural: &ValidationReport,
        critique: &Critique,
    ) -> Result<AgentOutput<FloorPlanGraph>, AgentError> {
        let started = Instant::now();
        let router_config = route(AgentRole::Refinement);

        let prompt = build_prompt(plan, spec, regulatory, cultural, critique);
        let request = StructuredRequest::new(prompt, router_config.clone(), refinement_schema());
        let reply = self
            .model
            .generate_structured(&request)
            .await
            .map_err(|e| AgentError::from_model(AGENT_NAME, e))?;

        let refined: RefinedLayout =
            serde_json::from_value(reply.data).map_err(|e| AgentError::parse(AGENT_NAME, e))?;

        let mut design_log = plan.design_log.clone();
        design_log.push(REFINEMENT_PASS_MARKER.to_string());
        design_log.extend(refined.changes_applied);

        let graph = graph_from_rooms(&refined.rooms, &spec.plot, design_log, plan.adjacencies.clone());

        Ok(AgentOutput {
            data: graph,
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
    spec: &NormalizedSpec,
    regulatory: &ValidationReport,
    cultural: &ValidationReport,
    critique: &Critique,
) -> String {
    let rooms = serde_json::to_string(&plan.rooms).unwrap_or_default();

    let violations: Vec<String> = regulatory
        .violations
        .iter()
        .chain(cultural.violations.iter())
        .map(|v| format!("- [{:?}] {}: {} Fix: {}", v.severity, v.rule, v.message, v.recommendation))
        .collect();

    let critiques: Vec<String> = critique.critiques.iter().map(|c| format!("- {c}")).collect();

    let setbacks = &spec.municipal.setbacks;
    format!(
        "Revise this floor plan to resolve the violations below while keeping what \
         already works.\n\n\
         Plot: {:.1} m x {:.1} m. Buildable envelope: x in [{:.1}, {:.1}], \
         y in [{:.1}, {:.1}].\n\n\
         Current rooms (JSON):\n{rooms}\n\n\
         Violations to resolve (most severe first):\n{}\n\n\
         Critic concerns:\n{}\n\n\
         Return the complete revised room list — every room, not just the changed \
         ones — plus changesApplied: one short line per change you made.",
        spec.plot.width,
        spec.plot.depth,
        setbacks.left,
        spec.plot.width - setbacks.right,
        setbacks.front,
        spec.plot.depth - setbacks.rear,
        if violations.is_empty() {
            "- none".to_string()
        } else {
            violations.join("\n")
        },
        if critiques.is_empty() {
            "- none".to_string()
        } else {
            critiques.join("\n")
        },
    )
}

fn refinement_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "rooms": room_array_schema(),
            "changesApplied": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["rooms", "changesApplied"]
    })
}
