// Vastu validator — sector placement rules scaled by strictness
//
// A closed rule table maps room classifications to permitted or forbidden
// sectors of the 3x3 grid. Each failing rule contributes weight x strictness
// to the penalty, so strictness 0 short-circuits to a perfect score and the
// penalty grows linearly in the coefficient.

use crate::geometry::{RoomClass, Sector};
use crate::plan::{
    ComplianceItem, ComplianceStatus, EnrichedRoom, Plot, Severity, ValidationReport, Violation,
};

/// Sector placement constraint for one rule.
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// Room must sit in one of these sectors
    In(&'static [Sector]),
    /// Room must sit anywhere but these sectors
    NotIn(&'static [Sector]),
}

impl Placement {
    fn satisfied_by(&self, sector: Sector) -> bool {
        match self {
            Placement::In(sectors) => sectors.contains(&sector),
            Placement::NotIn(sectors) => !sectors.contains(&sector),
        }
    }

    fn describe(&self) -> String {
        let names = |sectors: &[Sector]| {
            sectors
                .iter()
                .map(|s| format!("{s:?}"))
                .collect::<Vec<_>>()
                .join("/")
                .replace("Center", "CENTER")
        };
        match self {
            Placement::In(sectors) => format!("should be in the {} sector", names(sectors)),
            Placement::NotIn(sectors) => format!("must not be in the {} sector", names(sectors)),
        }
    }
}

struct VastuRule {
    id: &'static str,
    applies_to: &'static [RoomClass],
    severity: Severity,
    weight: f64,
    placement: Placement,
}

// Severity/weight pairing is fixed: critical 0.15, major 0.10, minor 0.05.
const VASTU_RULES: &[VastuRule] = &[
    VastuRule {
        id: "brahmasthan",
        applies_to: &[
            RoomClass::Kitchen,
            RoomClass::Bathroom,
            RoomClass::Toilet,
            RoomClass::Staircase,
            RoomClass::Storage,
        ],
        severity: Severity::Critical,
        weight: 0.15,
        placement: Placement::NotIn(&[Sector::Center]),
    },
    VastuRule {
        id: "master-sw",
        applies_to: &[RoomClass::MasterBedroom],
        severity: Severity::Major,
        weight: 0.10,
        placement: Placement::In(&[Sector::SW]),
    },
    VastuRule {
        id: "kitchen-se-nw",
        applies_to: &[RoomClass::Kitchen],
        severity: Severity::Major,
        weight: 0.10,
        placement: Placement::In(&[Sector::SE, Sector::NW]),
    },
    VastuRule {
        id: "living-ne-n-e",
        applies_to: &[RoomClass::LivingRoom],
        severity: Severity::Minor,
        weight: 0.05,
        placement: Placement::In(&[Sector::NE, Sector::N, Sector::E]),
    },
    VastuRule {
        id: "pooja-ne",
        applies_to: &[RoomClass::PoojaRoom],
        severity: Severity::Major,
        weight: 0.10,
        placement: Placement::In(&[Sector::NE, Sector::E, Sector::N]),
    },
    VastuRule {
        id: "toilet-not-ne-center",
        applies_to: &[RoomClass::Bathroom, RoomClass::Toilet],
        severity: Severity::Critical,
        weight: 0.15,
        placement: Placement::NotIn(&[Sector::NE, Sector::Center]),
    },
    VastuRule {
        id: "entrance-n-e-ne",
        applies_to: &[RoomClass::Entrance, RoomClass::Foyer],
        severity: Severity::Major,
        weight: 0.10,
        placement: Placement::In(&[Sector::N, Sector::E, Sector::NE]),
    },
    VastuRule {
        id: "staircase-not-ne-center",
        applies_to: &[RoomClass::Staircase],
        severity: Severity::Major,
        weight: 0.10,
        placement: Placement::NotIn(&[Sector::NE, Sector::Center]),
    },
    VastuRule {
        id: "dining-w-e",
        applies_to: &[RoomClass::DiningRoom],
        severity: Severity::Minor,
        weight: 0.05,
        placement: Placement::In(&[Sector::W, Sector::E, Sector::NW]),
    },
    VastuRule {
        id: "bedroom-not-ne",
        applies_to: &[RoomClass::Bedroom],
        severity: Severity::Minor,
        weight: 0.05,
        placement: Placement::NotIn(&[Sector::NE]),
    },
    VastuRule {
        id: "guest-nw",
        applies_to: &[RoomClass::GuestRoom],
        severity: Severity::Minor,
        weight: 0.05,
        placement: Placement::In(&[Sector::NW, Sector::N, Sector::W]),
    },
    VastuRule {
        id: "storage-sw-s",
        applies_to: &[RoomClass::Storage, RoomClass::Utility],
        severity: Severity::Minor,
        weight: 0.05,
        placement: Placement::In(&[Sector::SW, Sector::S, Sector::NW, Sector::W]),
    },
    VastuRule {
        id: "parking-nw-se",
        applies_to: &[RoomClass::Parking],
        severity: Severity::Minor,
        weight: 0.05,
        placement: Placement::In(&[Sector::NW, Sector::SE]),
    },
    VastuRule {
        id: "balcony-n-e",
        applies_to: &[RoomClass::Balcony, RoomClass::Veranda],
        severity: Severity::Minor,
        weight: 0.05,
        placement: Placement::In(&[Sector::N, Sector::E, Sector::NE]),
    },
];

/// Run the Vastu rule set against an enriched plan.
///
/// `strictness` in [0, 1]: zero disables checking entirely.
pub fn validate_vastu(rooms: &[EnrichedRoom], _plot: &Plot, strictness: f64) -> ValidationReport {
    if strictness <= 0.0 {
        return ValidationReport::passing(ComplianceItem {
            rule: "vastu".to_string(),
            status: ComplianceStatus::Pass,
            message: "Vastu checking is disabled for this project".to_string(),
            recommendation: None,
        });
    }

    let strictness = strictness.min(1.0);
    let mut violations = Vec::new();
    let mut items = Vec::new();
    let mut penalty = 0.0;

    for rule in VASTU_RULES {
        for room in rooms {
            if !rule.applies_to.contains(&room.classification) {
                continue;
            }

            if rule.placement.satisfied_by(room.sector) {
                items.push(ComplianceItem {
                    rule: rule.id.to_string(),
                    status: ComplianceStatus::Pass,
                    message: format!(
                        "{} in the {:?} sector satisfies {}",
                        room.room.name, room.sector, rule.id
                    ),
                    recommendation: None,
                });
            } else {
                let message = format!(
                    "{} is in the {:?} sector; it {}",
                    room.room.name,
                    room.sector,
                    rule.placement.describe()
                );
                let recommendation = format!(
                    "Relocate {} so that it {}",
                    room.room.name,
                    rule.placement.describe()
                );
                let status = if rule.severity == Severity::Minor {
                    ComplianceStatus::Warn
                } else {
                    ComplianceStatus::Fail
                };
                items.push(ComplianceItem {
                    rule: rule.id.to_string(),
                    status,
                    message: message.clone(),
                    recommendation: Some(recommendation.clone()),
                });
                violations.push(Violation {
                    rule: rule.id.to_string(),
                    severity: rule.severity,
                    room: Some(room.room.id.clone()),
                    message,
                    recommendation,
                });
                penalty += rule.weight * strictness;
            }
        }
    }

    ValidationReport {
        violations,
        items,
        score: (1.0 - penalty).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::enrich;
    use crate::plan::{Plot, Room, RoomType};

    fn room_at(name: &str, x: f64, y: f64) -> Room {
        Room {
            id: format!("room-{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            room_type: RoomType::Room,
            x,
            y,
            width: 2.0,
            height: 2.0,
            features: vec![],
            guidance: String::new(),
            floor: None,
        }
    }

    fn plot() -> Plot {
        Plot {
            width: 12.0,
            depth: 18.0,
        }
    }

    fn validate(rooms: Vec<Room>, strictness: f64) -> ValidationReport {
        let plot = plot();
        let enriched = enrich(&rooms, &plot);
        validate_vastu(&enriched, &plot, strictness)
    }

    #[test]
    fn test_zero_strictness_short_circuits() {
        // Kitchen dead centre would be a brahmasthan violation at any s > 0
        let rooms = vec![room_at("Kitchen", 5.0, 8.0)];
        let report = validate(rooms, 0.0);
        assert_eq!(report.score, 1.0);
        assert!(report.violations.is_empty());
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].status, ComplianceStatus::Pass);
        assert!(report.items[0].message.contains("disabled"));
    }

    #[test]
    fn test_kitchen_in_center_fails_brahmasthan() {
        let rooms = vec![room_at("Kitchen", 5.0, 8.0)];
        let report = validate(rooms, 0.5);
        let violation = report
            .violations
            .iter()
            .find(|v| v.rule == "brahmasthan")
            .expect("brahmasthan violation");
        assert_eq!(violation.severity, Severity::Critical);
        // 0.15 weight x 0.5 strictness, plus kitchen-se-nw (0.10 x 0.5)
        assert!(report.score <= 1.0 - 0.15 * 0.5);
    }

    #[test]
    fn test_kitchen_in_se_passes_placement() {
        // SE corner of a 12x18 plot
        let rooms = vec![room_at("Kitchen", 9.0, 14.0)];
        let report = validate(rooms, 1.0);
        assert!(report.violations.is_empty());
        assert_eq!(report.score, 1.0);
    }

    #[test]
    fn test_master_bedroom_outside_sw_is_major() {
        let rooms = vec![room_at("Master Bedroom", 9.0, 2.0)]; // NE
        let report = validate(rooms, 1.0);
        let violation = report
            .violations
            .iter()
            .find(|v| v.rule == "master-sw")
            .expect("master-sw violation");
        assert_eq!(violation.severity, Severity::Major);
    }

    #[test]
    fn test_toilet_in_ne_is_critical() {
        let rooms = vec![room_at("Toilet", 9.0, 2.0)];
        let report = validate(rooms, 1.0);
        let violation = report
            .violations
            .iter()
            .find(|v| v.rule == "toilet-not-ne-center")
            .expect("toilet violation");
        assert_eq!(violation.severity, Severity::Critical);
    }

    #[test]
    fn test_minor_failure_is_warn_item() {
        let rooms = vec![room_at("Living Room", 2.0, 14.0)]; // SW
        let report = validate(rooms, 1.0);
        let item = report
            .items
            .iter()
            .find(|i| i.rule == "living-ne-n-e")
            .expect("living item");
        assert_eq!(item.status, ComplianceStatus::Warn);
    }

    #[test]
    fn test_major_failure_is_fail_item() {
        let rooms = vec![room_at("Pooja Room", 2.0, 14.0)]; // SW
        let report = validate(rooms, 1.0);
        let item = report
            .items
            .iter()
            .find(|i| i.rule == "pooja-ne")
            .expect("pooja item");
        assert_eq!(item.status, ComplianceStatus::Fail);
    }

    #[test]
    fn test_penalty_linear_in_strictness() {
        let rooms = vec![room_at("Master Bedroom", 9.0, 2.0)]; // fails master-sw only
        let quarter = validate(rooms.clone(), 0.25);
        let half = validate(rooms.clone(), 0.5);
        let full = validate(rooms, 1.0);
        assert!((1.0 - quarter.score - 0.025).abs() < 1e-9);
        assert!((1.0 - half.score - 0.05).abs() < 1e-9);
        assert!((1.0 - full.score - 0.10).abs() < 1e-9);
        // Monotone decrease in s
        assert!(quarter.score > half.score && half.score > full.score);
    }

    #[test]
    fn test_rule_items_emitted_for_passes_too() {
        let rooms = vec![room_at("Master Bedroom", 2.0, 14.0)]; // SW, passes
        let report = validate(rooms, 1.0);
        let item = report
            .items
            .iter()
            .find(|i| i.rule == "master-sw")
            .expect("master-sw item");
        assert_eq!(item.status, ComplianceStatus::Pass);
    }

    #[test]
    fn test_entrance_and_foyer_share_rule() {
        let rooms = vec![room_at("Foyer", 2.0, 14.0)]; // SW, should fail
        let report = validate(rooms, 1.0);
        assert!(report.violations.iter().any(|v| v.rule == "entrance-n-e-ne"));
    }

    #[test]
    fn test_score_floors_at_zero() {
        // Pile up enough failures to exceed a full penalty of 1.0
        let rooms = vec![
            room_at("Kitchen", 5.0, 8.0),      // brahmasthan + kitchen-se-nw
            room_at("Toilet", 9.0, 2.0),       // toilet-not-ne-center
            room_at("Bathroom", 5.0, 8.0),     // brahmasthan + toilet rule
            room_at("Staircase", 5.0, 8.0),    // brahmasthan + staircase rule
            room_at("Master Bedroom", 9.0, 2.0),
            room_at("Pooja Room", 2.0, 14.0),
            room_at("Entrance", 2.0, 14.0),
        ];
        let report = validate(rooms, 1.0);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_deterministic_output_order() {
        let rooms = vec![
            room_at("Kitchen", 5.0, 8.0),
            room_at("Master Bedroom", 9.0, 2.0),
        ];
        let a = validate(rooms.clone(), 0.7);
        let b = validate(rooms, 0.7);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
