// Municipal building profiles
//
// Static regulation data keyed by authority tag. The set of known
// authorities is closed; unknown tags fall back to the national defaults
// (NBC-derived) with a warning rather than failing the request.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::geometry::RoomClass;

/// Mandatory clearances from the plot boundary, in metres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setbacks {
    pub front: f64,
    pub left: f64,
    pub right: f64,
    pub rear: f64,
}

/// Regulation profile for one municipal authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalProfile {
    pub authority: String,
    pub max_far: f64,
    pub max_ground_coverage: f64,
    pub min_room_sizes: HashMap<RoomClass, f64>,
    pub min_corridor_width: f64,
    pub min_ventilation_ratio: f64,
    pub setbacks: Setbacks,
}

fn min_room_sizes() -> HashMap<RoomClass, f64> {
    // NBC 2016 Part III floor-area minima, rounded to common practice
    HashMap::from([
        (RoomClass::MasterBedroom, 12.0),
        (RoomClass::Bedroom, 9.5),
        (RoomClass::GuestRoom, 9.5),
        (RoomClass::Kitchen, 5.0),
        (RoomClass::LivingRoom, 12.0),
        (RoomClass::DiningRoom, 7.5),
        (RoomClass::Bathroom, 2.8),
        (RoomClass::Toilet, 1.1),
        (RoomClass::Study, 7.5),
        (RoomClass::PoojaRoom, 1.8),
        (RoomClass::Storage, 3.0),
    ])
}

fn profile(
    authority: &str,
    max_far: f64,
    max_ground_coverage: f64,
    min_corridor_width: f64,
    setbacks: Setbacks,
) -> MunicipalProfile {
    MunicipalProfile {
        authority: authority.to_string(),
        max_far,
        max_ground_coverage,
        min_room_sizes: min_room_sizes(),
        min_corridor_width,
        min_ventilation_ratio: 0.1,
        setbacks,
    }
}

pub const NATIONAL: &str = "national";

static PROFILES: Lazy<HashMap<&'static str, MunicipalProfile>> = Lazy::new(|| {
    HashMap::from([
        (
            NATIONAL,
            profile(
                NATIONAL,
                2.0,
                0.65,
                0.9,
                Setbacks {
                    front: 3.0,
                    left: 1.5,
                    right: 1.5,
                    rear: 2.0,
                },
            ),
        ),
        (
            "delhi",
            profile(
                "delhi",
                3.5,
                0.75,
                0.9,
                Setbacks {
                    front: 3.0,
                    left: 1.0,
                    right: 1.0,
                    rear: 3.0,
                },
            ),
        ),
        (
            "mumbai",
            profile(
                "mumbai",
                3.0,
                0.7,
                1.0,
                Setbacks {
                    front: 3.0,
                    left: 1.5,
                    right: 1.5,
                    rear: 1.5,
                },
            ),
        ),
        (
            "bangalore",
            profile(
                "bangalore",
                2.5,
                0.65,
                0.9,
                Setbacks {
                    front: 3.0,
                    left: 1.0,
                    right: 1.0,
                    rear: 2.0,
                },
            ),
        ),
        (
            "chennai",
            profile(
                "chennai",
                2.0,
                0.6,
                0.9,
                Setbacks {
                    front: 3.0,
                    left: 1.5,
                    right: 1.5,
                    rear: 2.0,
                },
            ),
        ),
        (
            "hyderabad",
            profile(
                "hyderabad",
                2.25,
                0.6,
                0.9,
                Setbacks {
                    front: 3.0,
                    left: 1.5,
                    right: 1.5,
                    rear: 2.0,
                },
            ),
        ),
    ])
});

/// Resolve a municipal authority tag to its profile.
///
/// Unknown tags warn and fall back to the national profile; this is never a
/// request-level error.
pub fn profile_for(authority: &str) -> MunicipalProfile {
    let key = authority.trim().to_lowercase();
    match PROFILES.get(key.as_str()) {
        Some(profile) => profile.clone(),
        None => {
            tracing::warn!(
                authority = %authority,
                "Unknown municipal authority, falling back to national profile"
            );
            PROFILES[NATIONAL].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_authority_resolves() {
        let profile = profile_for("mumbai");
        assert_eq!(profile.authority, "mumbai");
        assert_eq!(profile.max_far, 3.0);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(profile_for("Mumbai").authority, "mumbai");
        assert_eq!(profile_for("  DELHI ").authority, "delhi");
    }

    #[test]
    fn test_unknown_authority_falls_back_to_national() {
        let profile = profile_for("atlantis");
        assert_eq!(profile.authority, "national");
        assert_eq!(profile.setbacks.front, 3.0);
        assert_eq!(profile.setbacks.left, 1.5);
        assert_eq!(profile.setbacks.right, 1.5);
        assert_eq!(profile.setbacks.rear, 2.0);
    }

    #[test]
    fn test_national_minimum_room_sizes() {
        let profile = profile_for("national");
        assert_eq!(profile.min_room_sizes[&RoomClass::MasterBedroom], 12.0);
        assert_eq!(profile.min_room_sizes[&RoomClass::Toilet], 1.1);
        assert!(!profile.min_room_sizes.contains_key(&RoomClass::Corridor));
    }

    #[test]
    fn test_ventilation_ratio_is_tenth_of_floor_area() {
        assert_eq!(profile_for("national").min_ventilation_ratio, 0.1);
    }
}
