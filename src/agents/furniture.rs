// Furniture agent — best-effort furnishing pass
//
// Places furniture in absolute plot coordinates, keeping clearances and
// staying away from door swings. Failure is logged and tolerated: the final
// plan simply omits furniture.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::json;

use super::{AgentError, AgentMetadata, AgentOutput};
use crate::llm::{StructuredGenerator, StructuredRequest};
use crate::plan::{EnrichedRoom, FurnitureItem};
use crate::router::{route, AgentRole};

const AGENT_NAME: &str = "furniture";

pub struct FurnitureAgent {
    model: Arc<dyn StructuredGenerator>,
}

#[derive(Debug, Deserialize)]
struct FurnitureResponse {
    furniture: Vec<FurnitureItem>,
}

impl FurnitureAgent {
    pub fn new(model: Arc<dyn StructuredGenerator>) -> Self {
        Self { model }
    }

    pub async fn execute(
        &self,
        rooms: &[EnrichedRoom],
    ) -> Result<AgentOutput<Vec<FurnitureItem>>, AgentError> {
        let started = Instant::now();
        let router_config = route(AgentRole::Furniture);

        let prompt = build_prompt(rooms);
        let request = StructuredRequest::new(prompt, router_config.clone(), furniture_schema());
        let reply = self
            .model
            .generate_structured(&request)
            .await
            .map_err(|e| AgentError::from_model(AGENT_NAME, e))?;

        let response: FurnitureResponse =
            serde_json::from_value(reply.data).map_err(|e| AgentError::parse(AGENT_NAME, e))?;

        Ok(AgentOutput {
            data: response.furniture,
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

fn build_prompt(rooms: &[EnrichedRoom]) -> String {
    let described: Vec<String> = rooms
        .iter()
        .filter(|r| r.room.room_type == crate::plan::RoomType::Room)
        .map(|r| {
            let doors: Vec<String> = r
                .room
                .features
                .iter()
                .filter(|f| f.kind == crate::plan::WallFeatureKind::Door)
                .map(|f| format!("{:?} wall at {:.1} m", f.wall, f.position))
                .collect();
            format!(
                "- {} (id {}): at ({:.1}, {:.1}), {:.1} m x {:.1} m, doors: {}",
                r.room.name,
                r.room.id,
                r.room.x,
                r.room.y,
                r.room.width,
                r.room.height,
                if doors.is_empty() { "none".to_string() } else { doors.join("; ") },
            )
        })
        .collect();

    format!(
        "Furnish these rooms with standard residential furniture.\n\n\
         Rooms:\n{}\n\n\
         For every piece return roomId, item, and an absolute rectangle (x, y, \
         width, height) in plot metres. Each piece must lie fully inside its room, \
         keep at least 0.6 m of walking clearance, and stay clear of door swings.",
        described.join("\n"),
    )
}

fn furniture_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "furniture": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "roomId": {"type": "string"},
                        "item": {"type": "string"},
                        "x": {"type": "number"},
                        "y": {"type": "number"},
                        "width": {"type": "number"},
                        "height": {"type": "number"}
                    },
                    "required": ["roomId", "item", "x", "y", "width", "height"]
                }
            }
        },
        "required": ["furniture"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_furniture_response_decodes() {
        let value = json!({
            "furniture": [
                {"roomId": "r1", "item": "queen bed", "x": 2.0, "y": 4.0, "width": 1.6, "height": 2.0}
            ]
        });
        let response: FurnitureResponse = serde_json::from_value(value).unwrap();
        assert_eq!(response.furniture.len(), 1);
        assert_eq!(response.furniture[0].room_id, "r1");
    }
}
