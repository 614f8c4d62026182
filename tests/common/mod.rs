// Scripted model for integration tests
//
// Implements the structured-generation trait by recognising which agent is
// calling from its prompt, and returns canned layouts. No network involved.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use planforge::llm::{StructuredGenerator, StructuredReply, StructuredRequest};

/// Behaviour switches for one test run.
#[derive(Default)]
pub struct Script {
    /// First spatial pass places the kitchen in the plot centre and a
    /// bedroom inside the left setback; refinement fixes both.
    pub flawed_first_plan: bool,
    /// Spatial calls fail outright (fatal to the run).
    pub fail_spatial: bool,
    /// Spatial calls never return, pinning the job in the running state.
    pub hang_spatial: bool,
    /// Cost calls fail (recovered with an empty BOM).
    pub fail_cost: bool,
    /// Furniture calls fail (plan ships unfurnished).
    pub fail_furniture: bool,
    /// Report a fallback model as having served spatial calls.
    pub reroute_spatial: bool,
}

pub struct ScriptedModel {
    script: Script,
    spatial_calls: AtomicU32,
    critic_calls: AtomicU32,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            spatial_calls: AtomicU32::new(0),
            critic_calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

fn room(id: &str, name: &str, kind: &str, x: f64, y: f64, w: f64, h: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": kind,
        "x": x,
        "y": y,
        "width": w,
        "height": h,
        "features": [
            {"kind": "window", "wall": "top", "position": 0.3, "width": 1.5},
            {"kind": "door", "wall": "bottom", "position": 0.3, "width": 0.9}
        ]
    })
}

/// A compliant layout for a 12 x 18 national-profile plot.
/// Envelope: x in [1.5, 10.5], y in [3, 16].
pub fn good_rooms() -> Value {
    json!([
        room("r-master", "Master Bedroom", "room", 1.5, 12.0, 4.0, 3.5), // SW
        room("r-kitchen", "Kitchen", "room", 7.5, 13.0, 3.0, 3.0),      // SE
        room("r-living", "Living Room", "room", 5.5, 3.0, 5.0, 3.5),    // N
        room("r-entrance", "Entrance Foyer", "room", 4.0, 3.0, 1.5, 2.0), // N
        room("r-bath", "Bathroom", "room", 1.5, 6.5, 2.5, 2.0),         // W
        room("r-corridor", "Corridor", "circulation", 5.5, 7.0, 1.2, 5.0),
    ])
}

/// Kitchen dead-centre (brahmasthan) plus a bedroom poking through the left
/// setback: one cultural critical and one regulatory critical.
pub fn flawed_rooms() -> Value {
    json!([
        room("r-master", "Master Bedroom", "room", 0.5, 12.0, 4.0, 3.5), // setback intrusion
        room("r-kitchen", "Kitchen", "room", 5.0, 8.0, 2.0, 2.0),        // CENTER
        room("r-living", "Living Room", "room", 5.5, 3.0, 5.0, 3.5),
        room("r-entrance", "Entrance Foyer", "room", 4.0, 3.0, 1.5, 2.0),
        room("r-bath", "Bathroom", "room", 1.5, 6.5, 2.5, 2.0),
    ])
}

fn critique(overall: f64) -> Value {
    json!({
        "spatialEfficiency": overall,
        "circulationQuality": overall,
        "naturalLighting": overall,
        "privacyGradient": overall,
        "aestheticBalance": overall,
        "overallConfidence": overall,
        "critiques": ["kitchen placement conflicts with the plot centre"],
        "strengths": ["master bedroom anchors the south-west"]
    })
}

#[async_trait]
impl StructuredGenerator for ScriptedModel {
    async fn generate_structured(&self, request: &StructuredRequest) -> anyhow::Result<StructuredReply> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let requested_model = request.model.model.clone();

        let reply = |data: Value, model: String| {
            Ok(StructuredReply {
                data,
                token_count: Some(640),
                model_used: model,
            })
        };

        if request.prompt.contains("adjacency preferences") {
            return reply(json!([]), requested_model);
        }

        if request.prompt.starts_with("You are a residential architect") {
            if self.script.hang_spatial {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
            if self.script.fail_spatial {
                anyhow::bail!("spatial model unavailable");
            }
            let call = self.spatial_calls.fetch_add(1, Ordering::SeqCst);
            let rooms = if self.script.flawed_first_plan && call == 0 {
                flawed_rooms()
            } else {
                good_rooms()
            };
            let model = if self.script.reroute_spatial {
                "gemini-2.5-pro".to_string()
            } else {
                requested_model
            };
            return reply(
                json!({"rooms": rooms, "designLog": ["zoned the plot into day and night wings"]}),
                model,
            );
        }

        if request.prompt.starts_with("Critique this residential floor plan") {
            let call = self.critic_calls.fetch_add(1, Ordering::SeqCst);
            // Harsh on the first pass of a flawed run, content afterwards
            let overall = if self.script.flawed_first_plan && call == 0 {
                0.3
            } else {
                0.85
            };
            return reply(critique(overall), requested_model);
        }

        if request.prompt.starts_with("Revise this floor plan") {
            return reply(
                json!({
                    "rooms": good_rooms(),
                    "changesApplied": [
                        "moved the kitchen out of the plot centre to the south-east",
                        "pulled the master bedroom inside the setback envelope"
                    ]
                }),
                requested_model,
            );
        }

        if request.prompt.starts_with("Estimate the construction bill of materials") {
            if self.script.fail_cost {
                anyhow::bail!("cost model unavailable");
            }
            return reply(
                json!({
                    "bom": [
                        {"material": "Cement", "quantity": 420.0, "unit": "bags", "estimatedCost": 168000.0},
                        {"material": "Steel", "quantity": 3.2, "unit": "tonnes", "estimatedCost": 224000.0}
                    ],
                    "totalCostRange": {"min": 1800000.0, "max": 2400000.0, "currency": "INR"}
                }),
                requested_model,
            );
        }

        if request.prompt.starts_with("Furnish these rooms") {
            if self.script.fail_furniture {
                anyhow::bail!("furniture model unavailable");
            }
            return reply(
                json!({
                    "furniture": [
                        {"roomId": "r-master", "item": "queen bed", "x": 2.0, "y": 12.5, "width": 1.6, "height": 2.0}
                    ]
                }),
                requested_model,
            );
        }

        anyhow::bail!("scripted model got an unexpected prompt: {:.80}", request.prompt)
    }
}
