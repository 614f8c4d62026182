// Name-based room classification
//
// An ordered, case-insensitive regex table maps display names to the closed
// classification set. First match wins, so more specific patterns (master
// bedroom, guest room) sit above the generic ones (bed). Unmatched names
// default to Bedroom.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The closed classification set. Drives minimum-size lookups and Vastu rule
/// applicability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomClass {
    MasterBedroom,
    Bedroom,
    GuestRoom,
    Kitchen,
    LivingRoom,
    DiningRoom,
    Bathroom,
    Toilet,
    PoojaRoom,
    Study,
    Staircase,
    Entrance,
    Foyer,
    Corridor,
    Balcony,
    Storage,
    Utility,
    Parking,
    Garden,
    Veranda,
}

impl RoomClass {
    /// Classifications that require ventilation (windows) under the
    /// regulatory checks.
    pub fn is_habitable(&self) -> bool {
        matches!(
            self,
            RoomClass::MasterBedroom
                | RoomClass::Bedroom
                | RoomClass::GuestRoom
                | RoomClass::Kitchen
                | RoomClass::LivingRoom
                | RoomClass::DiningRoom
                | RoomClass::Study
        )
    }

    /// Human label used in violation messages.
    pub fn label(&self) -> &'static str {
        match self {
            RoomClass::MasterBedroom => "master bedroom",
            RoomClass::Bedroom => "bedroom",
            RoomClass::GuestRoom => "guest room",
            RoomClass::Kitchen => "kitchen",
            RoomClass::LivingRoom => "living room",
            RoomClass::DiningRoom => "dining room",
            RoomClass::Bathroom => "bathroom",
            RoomClass::Toilet => "toilet",
            RoomClass::PoojaRoom => "pooja room",
            RoomClass::Study => "study",
            RoomClass::Staircase => "staircase",
            RoomClass::Entrance => "entrance",
            RoomClass::Foyer => "foyer",
            RoomClass::Corridor => "corridor",
            RoomClass::Balcony => "balcony",
            RoomClass::Storage => "storage",
            RoomClass::Utility => "utility",
            RoomClass::Parking => "parking",
            RoomClass::Garden => "garden",
            RoomClass::Veranda => "veranda",
        }
    }
}

// Matching order is normative: master bedroom before bedroom, toilet before
// bathroom, corridor/hallway before living room ("hall").
static CLASSIFY_RULES: Lazy<Vec<(Regex, RoomClass)>> = Lazy::new(|| {
    let table: &[(&str, RoomClass)] = &[
        (r"master\s*bed", RoomClass::MasterBedroom),
        (r"guest\s*(bed)?\s*room|guest\s*bed", RoomClass::GuestRoom),
        (r"pooja|puja|prayer|mandir", RoomClass::PoojaRoom),
        (r"toilet|\bwc\b|lavatory|powder\s*room", RoomClass::Toilet),
        (r"bath|washroom|shower", RoomClass::Bathroom),
        (r"kitchen|cook|pantry", RoomClass::Kitchen),
        (r"dining", RoomClass::DiningRoom),
        (r"corridor|passage|hallway|lobby", RoomClass::Corridor),
        (r"living|lounge|drawing|\bhall\b", RoomClass::LivingRoom),
        (r"stair|steps", RoomClass::Staircase),
        (r"foyer", RoomClass::Foyer),
        (r"entrance|entry", RoomClass::Entrance),
        (r"study|office|work\s*room|library", RoomClass::Study),
        (r"balcon", RoomClass::Balcony),
        (r"store|storage", RoomClass::Storage),
        (r"utility|laundry", RoomClass::Utility),
        (r"parking|garage|car\s*port", RoomClass::Parking),
        (r"garden|lawn|yard|courtyard", RoomClass::Garden),
        (r"veranda|verandah|porch|sit\s*out", RoomClass::Veranda),
        (r"bed|\broom\b", RoomClass::Bedroom),
    ];
    table
        .iter()
        .map(|(pattern, class)| {
            let re = Regex::new(&format!("(?i){pattern}")).expect("classification regex");
            (re, *class)
        })
        .collect()
});

/// Classify a display name. First matching rule wins; unmatched names are
/// treated as bedrooms.
pub fn classify(name: &str) -> RoomClass {
    for (re, class) in CLASSIFY_RULES.iter() {
        if re.is_match(name) {
            return *class;
        }
    }
    RoomClass::Bedroom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_bedroom_beats_bedroom() {
        assert_eq!(classify("Master Bedroom"), RoomClass::MasterBedroom);
        assert_eq!(classify("MasterBed 1"), RoomClass::MasterBedroom);
        assert_eq!(classify("Bedroom 2"), RoomClass::Bedroom);
    }

    #[test]
    fn test_toilet_distinct_from_bathroom() {
        assert_eq!(classify("Toilet"), RoomClass::Toilet);
        assert_eq!(classify("WC"), RoomClass::Toilet);
        assert_eq!(classify("Lavatory"), RoomClass::Toilet);
        assert_eq!(classify("Bathroom"), RoomClass::Bathroom);
        assert_eq!(classify("Attached Bath"), RoomClass::Bathroom);
    }

    #[test]
    fn test_pooja_aliases() {
        assert_eq!(classify("Pooja Room"), RoomClass::PoojaRoom);
        assert_eq!(classify("puja"), RoomClass::PoojaRoom);
        assert_eq!(classify("Prayer Room"), RoomClass::PoojaRoom);
        assert_eq!(classify("Mandir"), RoomClass::PoojaRoom);
    }

    #[test]
    fn test_hallway_is_corridor_not_living() {
        assert_eq!(classify("Hallway"), RoomClass::Corridor);
        assert_eq!(classify("Hall"), RoomClass::LivingRoom);
        assert_eq!(classify("Living Hall"), RoomClass::LivingRoom);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("KITCHEN"), RoomClass::Kitchen);
        assert_eq!(classify("kitchen"), RoomClass::Kitchen);
    }

    #[test]
    fn test_unmatched_defaults_to_bedroom() {
        assert_eq!(classify("Mystery Space"), RoomClass::Bedroom);
        assert_eq!(classify(""), RoomClass::Bedroom);
    }

    #[test]
    fn test_staircase_and_entrance() {
        assert_eq!(classify("Staircase"), RoomClass::Staircase);
        assert_eq!(classify("Stairs"), RoomClass::Staircase);
        assert_eq!(classify("Main Entrance"), RoomClass::Entrance);
        assert_eq!(classify("Foyer"), RoomClass::Foyer);
    }

    #[test]
    fn test_guest_room() {
        assert_eq!(classify("Guest Room"), RoomClass::GuestRoom);
        assert_eq!(classify("Guest Bedroom"), RoomClass::GuestRoom);
    }

    #[test]
    fn test_wire_format_is_snake_case() {
        assert_eq!(
            serde_json::to_value(RoomClass::MasterBedroom).unwrap(),
            "master_bedroom"
        );
        assert_eq!(serde_json::to_value(RoomClass::PoojaRoom).unwrap(), "pooja_room");
    }
}
