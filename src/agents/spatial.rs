// Spatial agent — initial floor plan generation
//
// Calls the heavy model with a structured schema describing rooms and the
// design log, then rebuilds every derived quantity server-side. Totals the
// model reports are never trusted; only its room rectangles are.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::json;

use super::{AgentError, AgentMetadata, AgentOutput};
use crate::geometry::{area_totals, enrich};
use crate::llm::{StructuredGenerator, StructuredRequest};
use crate::plan::{AdjacencyPreference, FloorPlanGraph, NormalizedSpec, Plot, Room};
use crate::router::{route, AgentRole};

const AGENT_NAME: &str = "spatial";

pub struct SpatialAgent {
    model: Arc<dyn StructuredGenerator>,
}

/// Room list + design log as returned by the model.
#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedLayout {
    pub rooms: Vec<Room>,
    #[serde(rename = "designLog", default)]
    pub design_log: Vec<String>,
}

impl SpatialAgent {
    pub fn new(model: Arc<dyn StructuredGenerator>) -> Self {
        Self { model }
    }

    pub async fn execute(
        &self,
        spec: &NormalizedSpec,
    ) -> Result<AgentOutput<FloorPlanGraph>, AgentError> {
        let started = Instant::now();
        let router_config = route(AgentRole::Spatial);

        let request = StructuredRequest::new(build_prompt(spec), router_config.clone(), layout_schema());
        let reply = self
            .model
            .generate_structured(&request)
            .await
            .map_err(|e| AgentError::from_model(AGENT_NAME, e))?;

        let layout: GeneratedLayout =
            serde_json::from_value(reply.data).map_err(|e| AgentError::parse(AGENT_NAME, e))?;

        let graph = graph_from_rooms(
            &layout.rooms,
            &spec.plot,
            layout.design_log,
            spec.adjacency.clone(),
        );

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

/// Enrich rooms and recompute area totals into a fresh plan graph.
///
/// Shared by the spatial and refinement agents so both go through the same
/// server-side accounting.
pub(crate) fn graph_from_rooms(
    rooms: &[Room],
    plot: &Plot,
    design_log: Vec<String>,
    adjacencies: Vec<AdjacencyPreference>,
) -> FloorPlanGraph {
    let enriched = enrich(rooms, plot);
    let totals = area_totals(&enriched, plot);
    FloorPlanGraph {
        rooms: enriched,
        total_area: totals.total,
        built_up_area: totals.built_up,
        circulation_area: totals.circulation,
        setback_area: totals.setback,
        outdoor_area: totals.outdoor,
        plot_coverage_ratio: totals.coverage_ratio,
        design_log,
        adjacencies,
    }
}

/// Response schema for room layouts, shared with the refinement agent.
pub(crate) fn room_array_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "name": {"type": "string"},
                "type": {"type": "string", "enum": ["room", "circulation", "outdoor", "setback", "service"]},
                "x": {"type": "number"},
                "y": {"type": "number"},
                "width": {"type": "number"},
                "height": {"type": "number"},
                "features": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "kind": {"type": "string", "enum": ["door", "window", "opening"]},
                            "wall": {"type": "string", "enum": ["top", "bottom", "left", "right"]},
                            "position": {"type": "number"},
                            "width": {"type": "number"}
                        },
                        "required": ["kind", "wall", "position", "width"]
                    }
                },
                "guidance": {"type": "string"},
                "floor": {"type": "integer"}
            },
            "required": ["id", "name", "type", "x", "y", "width", "height"]
        }
    })
}

fn layout_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "rooms": room_array_schema(),
            "designLog": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["rooms", "designLog"]
    })
}

fn build_prompt(spec: &NormalizedSpec) -> String {
    let setbacks = &spec.municipal.setbacks;
    let envelope = format!(
        "x in [{:.1}, {:.1}], y in [{:.1}, {:.1}]",
        setbacks.left,
        spec.plot.width - setbacks.right,
        setbacks.front,
        spec.plot.depth - setbacks.rear,
    );

    let program: Vec<String> = spec
        .room_requirements
        .iter()
        .map(|r| format!("- {} x{} (minimum {:.1} sqm)", r.name, r.count, r.min_area))
        .collect();

    let adjacency: Vec<String> = spec
        .adjacency
        .iter()
        .map(|a| format!("- {} {:?} {}", a.room_a, a.relation, a.room_b))
        .collect();

    let mut prompt = format!(
        "You are a residential architect. Design a floor plan for a {:.1} m wide by \
         {:.1} m deep plot.\n\n\
         Buildable envelope after setbacks: {envelope}.\n\
         Maximum ground coverage: {:.0}% of the plot.\n\n\
         Required rooms:\n{}\n\n\
         Place every room as an axis-aligned rectangle in plot metres (origin at the \
         north-west corner, x east, y south). Include doors and windows as wall \
         features. Add corridors of type \"circulation\" where rooms need \
         connecting, and setback strips of type \"setback\" along the plot edges. \
         Rooms must not overlap.\n\n\
         Record each major decision as one line of the designLog.",
        spec.plot.width,
        spec.plot.depth,
        spec.municipal.max_ground_coverage * 100.0,
        program.join("\n"),
    );

    if !adjacency.is_empty() {
        prompt.push_str(&format!("\n\nAdjacency preferences:\n{}", adjacency.join("\n")));
    }

    if spec.strictness > 0.0 {
        prompt.push_str(
            "\n\nVastu placement guidance (follow where possible): master bedroom in the \
             south-west, kitchen in the south-east or north-west, pooja room in the \
             north-east, entrance on the north or east side, no kitchen, bathroom, \
             toilet, staircase or storage in the central ninth of the plot, toilets \
             away from the north-east corner.",
        );
    }

    if spec.config.floor_count() > 1 {
        prompt.push_str(&format!(
            "\n\nThe house has {} floors; assign each room a floor index starting at 0 \
             and repeat the staircase position on every floor.",
            spec.config.floor_count()
        ));
    }

    prompt
}
