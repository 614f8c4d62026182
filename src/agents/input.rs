// Input agent — config normalization and adjacency parsing
//
// The room program is built by deterministic rules; the single LLM call only
// parses free-text adjacency hints. That call is optional: on failure the
// adjacency list is empty and the run continues.

use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::{AgentError, AgentMetadata, AgentOutput};
use crate::geometry::RoomClass;
use crate::llm::{StructuredGenerator, StructuredRequest};
use crate::municipal::profile_for;
use crate::plan::{
    AdjacencyPreference, NormalizedSpec, ParkingLevel, Plot, ProjectConfig, RoomRequirement,
};
use crate::router::{route, AgentRole};

const AGENT_NAME: &str = "input";

static BEDROOM_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)bed\s*room").unwrap());

pub struct InputAgent {
    model: Arc<dyn StructuredGenerator>,
}

impl InputAgent {
    pub fn new(model: Arc<dyn StructuredGenerator>) -> Self {
        Self { model }
    }

    pub async fn execute(
        &self,
        config: &ProjectConfig,
    ) -> Result<AgentOutput<NormalizedSpec>, AgentError> {
        let started = Instant::now();
        let router_config = route(AgentRole::Input);

        let plot = Plot {
            width: config.plot_width,
            depth: config.plot_depth,
        };
        let municipal = profile_for(&config.municipal_authority);
        let room_requirements = build_room_requirements(config, &municipal);

        // Best-effort adjacency parse; an empty list is a valid outcome
        let (adjacency, model_used, token_count) = match self.parse_adjacency(config).await {
            Ok((list, model, tokens)) => {
                (list, model.unwrap_or_else(|| router_config.model.clone()), tokens)
            }
            Err(e) => {
                tracing::warn!("Adjacency parse failed, continuing without hints: {e:#}");
                (Vec::new(), router_config.model.clone(), None)
            }
        };

        let spec = NormalizedSpec {
            strictness: config.strictness_coefficient(),
            config: config.clone(),
            plot,
            room_requirements,
            municipal,
            adjacency,
        };

        Ok(AgentOutput {
            data: spec,
            metadata: AgentMetadata {
                agent: AGENT_NAME,
                requested_model: router_config.model,
                model_used,
                duration_ms: started.elapsed().as_millis() as u64,
                token_count,
            },
        })
    }

    async fn parse_adjacency(
        &self,
        config: &ProjectConfig,
    ) -> anyhow::Result<(Vec<AdjacencyPreference>, Option<String>, Option<u32>)> {
        let hints: Vec<&str> = config
            .requirements
            .iter()
            .map(String::as_str)
            .filter(|r| {
                let lower = r.to_lowercase();
                lower.contains("near") || lower.contains("next to") || lower.contains("away from")
                    || lower.contains("adjacent") || lower.contains("separate")
            })
            .collect();

        if hints.is_empty() {
            return Ok((Vec::new(), None, None));
        }

        let prompt = format!(
            "Extract room adjacency preferences from these requirement notes.\n\
             Notes:\n{}\n\n\
             Return a JSON array of objects with keys roomA, roomB and relation \
             (one of \"adjacent\", \"nearby\", \"separated\"). \
             Only include pairs the notes actually mention.",
            hints
                .iter()
                .map(|h| format!("- {h}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );

        let schema = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "roomA": {"type": "string"},
                    "roomB": {"type": "string"},
                    "relation": {"type": "string", "enum": ["adjacent", "nearby", "separated"]}
                },
                "required": ["roomA", "roomB", "relation"]
            }
        });

        let request = StructuredRequest::new(prompt, route(AgentRole::Input), schema);
        let reply = self.model.generate_structured(&request).await?;
        let list: Vec<AdjacencyPreference> = serde_json::from_value(reply.data)?;
        Ok((list, Some(reply.model_used), reply.token_count))
    }
}

fn min_area(municipal: &crate::municipal::MunicipalProfile, class: RoomClass, fallback: f64) -> f64 {
    municipal.min_room_sizes.get(&class).copied().unwrap_or(fallback)
}

/// Deterministic room program derived from the configuration.
fn build_room_requirements(
    config: &ProjectConfig,
    municipal: &crate::municipal::MunicipalProfile,
) -> Vec<RoomRequirement> {
    let mut requirements = Vec::new();
    let mentions = |keyword: &str| {
        config
            .requirements
            .iter()
            .any(|r| r.to_lowercase().contains(keyword))
    };

    // Always present: master bedroom, kitchen, living room, entrance
    requirements.push(RoomRequirement {
        classification: RoomClass::MasterBedroom,
        name: "Master Bedroom".to_string(),
        min_area: min_area(municipal, RoomClass::MasterBedroom, 12.0),
        count: 1,
    });

    // One additional bedroom per "bedroom" mention beyond the first
    let bedroom_mentions = config
        .requirements
        .iter()
        .filter(|r| BEDROOM_HINT.is_match(r))
        .count() as u32;
    if bedroom_mentions > 1 {
        requirements.push(RoomRequirement {
            classification: RoomClass::Bedroom,
            name: "Bedroom".to_string(),
            min_area: min_area(municipal, RoomClass::Bedroom, 9.5),
            count: bedroom_mentions - 1,
        });
    }

    requirements.push(RoomRequirement {
        classification: RoomClass::Kitchen,
        name: "Kitchen".to_string(),
        min_area: min_area(municipal, RoomClass::Kitchen, 5.0),
        count: 1,
    });
    requirements.push(RoomRequirement {
        classification: RoomClass::LivingRoom,
        name: "Living Room".to_string(),
        min_area: min_area(municipal, RoomClass::LivingRoom, 12.0),
        count: 1,
    });
    requirements.push(RoomRequirement {
        classification: RoomClass::Entrance,
        name: "Entrance Foyer".to_string(),
        min_area: 3.0,
        count: 1,
    });

    let bathrooms = config.bathrooms.unwrap_or(2).max(1);
    requirements.push(RoomRequirement {
        classification: RoomClass::Bathroom,
        name: "Bathroom".to_string(),
        min_area: min_area(municipal, RoomClass::Bathroom, 2.8),
        count: bathrooms,
    });

    // Optional rooms keyed off the requirement text
    if mentions("dining") {
        requirements.push(RoomRequirement {
            classification: RoomClass::DiningRoom,
            name: "Dining Room".to_string(),
            min_area: min_area(municipal, RoomClass::DiningRoom, 7.5),
            count: 1,
        });
    }
    if mentions("pooja") || mentions("puja") || mentions("prayer") || mentions("mandir") {
        requirements.push(RoomRequirement {
            classification: RoomClass::PoojaRoom,
            name: "Pooja Room".to_string(),
            min_area: min_area(municipal, RoomClass::PoojaRoom, 1.8),
            count: 1,
        });
    }
    if mentions("study") || mentions("office") {
        requirements.push(RoomRequirement {
            classification: RoomClass::Study,
            name: "Study".to_string(),
            min_area: min_area(municipal, RoomClass::Study, 7.5),
            count: 1,
        });
    }
    if mentions("balcon") {
        requirements.push(RoomRequirement {
            classification: RoomClass::Balcony,
            name: "Balcony".to_string(),
            min_area: 3.0,
            count: 1,
        });
    }
    if mentions("store") || mentions("storage") {
        requirements.push(RoomRequirement {
            classification: RoomClass::Storage,
            name: "Store Room".to_string(),
            min_area: min_area(municipal, RoomClass::Storage, 3.0),
            count: 1,
        });
    }

    if config.floor_count() > 1 {
        requirements.push(RoomRequirement {
            classification: RoomClass::Staircase,
            name: "Staircase".to_string(),
            min_area: 4.5,
            count: 1,
        });
    }

    match config.parking {
        Some(ParkingLevel::Single) => requirements.push(RoomRequirement {
            classification: RoomClass::Parking,
            name: "Car Parking".to_string(),
            min_area: 12.5,
            count: 1,
        }),
        Some(ParkingLevel::Double) => requirements.push(RoomRequirement {
            classification: RoomClass::Parking,
            name: "Car Parking".to_string(),
            min_area: 25.0,
            count: 1,
        }),
        Some(ParkingLevel::None) | None => {}
    }

    requirements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(requirements: &[&str]) -> ProjectConfig {
        ProjectConfig {
            plot_width: 12.0,
            plot_depth: 18.0,
            requirements: requirements.iter().map(|s| s.to_string()).collect(),
            municipal_authority: "national".to_string(),
            cultural_system: None,
            strictness: None,
            floors: None,
            bathrooms: None,
            parking: None,
            user_id: None,
        }
    }

    fn names(requirements: &[RoomRequirement]) -> Vec<&str> {
        requirements.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_core_rooms_always_present() {
        let cfg = config(&["Master Bedroom", "Kitchen", "Living Room"]);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        let names = names(&reqs);
        assert!(names.contains(&"Master Bedroom"));
        assert!(names.contains(&"Kitchen"));
        assert!(names.contains(&"Living Room"));
        assert!(names.contains(&"Entrance Foyer"));
        assert!(names.contains(&"Bathroom"));
    }

    #[test]
    fn test_single_bedroom_mention_adds_no_extra() {
        let cfg = config(&["Master Bedroom", "Kitchen"]);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        assert!(!reqs.iter().any(|r| r.classification == RoomClass::Bedroom));
    }

    #[test]
    fn test_extra_bedrooms_beyond_first_mention() {
        let cfg = config(&["Master Bedroom", "Kids Bedroom", "Guest Bedroom", "Kitchen"]);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        let extra = reqs
            .iter()
            .find(|r| r.classification == RoomClass::Bedroom)
            .expect("extra bedrooms");
        assert_eq!(extra.count, 2);
    }

    #[test]
    fn test_staircase_only_with_multiple_floors() {
        let mut cfg = config(&["Master Bedroom"]);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        assert!(!reqs.iter().any(|r| r.classification == RoomClass::Staircase));

        cfg.floors = Some(2);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        assert!(reqs.iter().any(|r| r.classification == RoomClass::Staircase));
    }

    #[test]
    fn test_optional_rooms_from_requirement_text() {
        let cfg = config(&["Master Bedroom", "Pooja Room", "Study", "Dining Area"]);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        assert!(reqs.iter().any(|r| r.classification == RoomClass::PoojaRoom));
        assert!(reqs.iter().any(|r| r.classification == RoomClass::Study));
        assert!(reqs.iter().any(|r| r.classification == RoomClass::DiningRoom));
        assert!(!reqs.iter().any(|r| r.classification == RoomClass::Balcony));
    }

    #[test]
    fn test_parking_sized_by_tag() {
        let mut cfg = config(&["Master Bedroom"]);
        cfg.parking = Some(ParkingLevel::Double);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        let parking = reqs
            .iter()
            .find(|r| r.classification == RoomClass::Parking)
            .expect("parking");
        assert_eq!(parking.min_area, 25.0);
    }

    #[test]
    fn test_bathroom_count_configurable() {
        let mut cfg = config(&["Master Bedroom"]);
        cfg.bathrooms = Some(3);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        let bathroom = reqs
            .iter()
            .find(|r| r.classification == RoomClass::Bathroom)
            .expect("bathroom");
        assert_eq!(bathroom.count, 3);
    }

    #[test]
    fn test_min_areas_come_from_profile() {
        let cfg = config(&["Master Bedroom"]);
        let reqs = build_room_requirements(&cfg, &profile_for("national"));
        let master = reqs
            .iter()
            .find(|r| r.classification == RoomClass::MasterBedroom)
            .unwrap();
        assert_eq!(master.min_area, 12.0);
    }
}
