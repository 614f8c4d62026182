// Regulatory validator — setbacks, FAR, coverage, room sizes, corridors,
// ventilation
//
// Checks run in a fixed order and every check emits a ComplianceItem, pass
// or fail. Failures additionally emit a Violation that feeds the penalty
// score. Ventilation shortfalls are warnings, never hard violations.

use crate::geometry::AreaTotals;
use crate::municipal::{MunicipalProfile, Setbacks};
use crate::plan::{
    ComplianceItem, ComplianceStatus, EnrichedRoom, Plot, RoomType, Severity, ValidationReport,
    Violation,
};

/// Positional tolerance for setback intrusion, in metres.
const SETBACK_TOLERANCE: f64 = 0.1;
/// Tolerance below the minimum room area before a violation fires.
const AREA_TOLERANCE: f64 = 0.1;
/// Tolerance below the minimum corridor width.
const CORRIDOR_TOLERANCE: f64 = 0.05;
/// Assumed window height for the ventilation area estimate, in metres.
const WINDOW_HEIGHT: f64 = 1.2;

fn penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 0.20,
        Severity::Major => 0.10,
        Severity::Minor => 0.03,
    }
}

/// Run all regulatory checks against an enriched plan.
pub fn validate_regulatory(
    rooms: &[EnrichedRoom],
    plot: &Plot,
    profile: &MunicipalProfile,
    setbacks: &Setbacks,
    floor_count: u32,
    totals: &AreaTotals,
) -> ValidationReport {
    let mut violations = Vec::new();
    let mut items = Vec::new();

    check_setbacks(rooms, plot, setbacks, &mut violations, &mut items);
    check_far(profile, floor_count, totals, &mut violations, &mut items);
    check_ground_coverage(profile, totals, &mut violations, &mut items);
    check_room_sizes(rooms, profile, &mut violations, &mut items);
    check_corridor_widths(rooms, profile, &mut violations, &mut items);
    check_ventilation(rooms, profile, &mut items);

    let score = (1.0 - violations.iter().map(|v| penalty(v.severity)).sum::<f64>()).max(0.0);

    ValidationReport {
        violations,
        items,
        score,
    }
}

fn check_setbacks(
    rooms: &[EnrichedRoom],
    plot: &Plot,
    setbacks: &Setbacks,
    violations: &mut Vec<Violation>,
    items: &mut Vec<ComplianceItem>,
) {
    let min_x = setbacks.left - SETBACK_TOLERANCE;
    let max_x = plot.width - setbacks.right + SETBACK_TOLERANCE;
    let min_y = setbacks.front - SETBACK_TOLERANCE;
    let max_y = plot.depth - setbacks.rear + SETBACK_TOLERANCE;

    for room in rooms {
        if !matches!(
            room.room.room_type,
            RoomType::Room | RoomType::Circulation | RoomType::Service
        ) {
            continue;
        }

        let rule = format!("Setback: {}", room.room.name);
        let inside = room.room.x >= min_x
            && room.room.y >= min_y
            && room.room.x + room.room.width <= max_x
            && room.room.y + room.room.height <= max_y;

        if inside {
            items.push(ComplianceItem {
                rule,
                status: ComplianceStatus::Pass,
                message: format!("{} lies within the setback envelope", room.room.name),
                recommendation: None,
            });
        } else {
            let message = format!(
                "{} intrudes into the mandatory setback (envelope x:[{:.1}, {:.1}] y:[{:.1}, {:.1}])",
                room.room.name,
                setbacks.left,
                plot.width - setbacks.right,
                setbacks.front,
                plot.depth - setbacks.rear,
            );
            let recommendation = format!(
                "Move or shrink {} so its rectangle stays inside the setback envelope",
                room.room.name
            );
            items.push(ComplianceItem {
                rule: rule.clone(),
                status: ComplianceStatus::Fail,
                message: message.clone(),
                recommendation: Some(recommendation.clone()),
            });
            violations.push(Violation {
                rule,
                severity: Severity::Critical,
                room: Some(room.room.id.clone()),
                message,
                recommendation,
            });
        }
    }
}

fn check_far(
    profile: &MunicipalProfile,
    floor_count: u32,
    totals: &AreaTotals,
    violations: &mut Vec<Violation>,
    items: &mut Vec<ComplianceItem>,
) {
    let far = if totals.total > 0.0 {
        totals.built_up * f64::from(floor_count) / totals.total
    } else {
        0.0
    };
    let rule = "Floor Area Ratio".to_string();

    if far <= profile.max_far {
        items.push(ComplianceItem {
            rule,
            status: ComplianceStatus::Pass,
            message: format!("FAR {:.2} is within the permitted {:.2}", far, profile.max_far),
            recommendation: None,
        });
    } else {
        let message = format!("FAR {:.2} exceeds the permitted {:.2}", far, profile.max_far);
        let recommendation =
            "Reduce built-up area or floor count to bring FAR within limits".to_string();
        items.push(ComplianceItem {
            rule: rule.clone(),
            status: ComplianceStatus::Fail,
            message: message.clone(),
            recommendation: Some(recommendation.clone()),
        });
        violations.push(Violation {
            rule,
            severity: Severity::Critical,
            room: None,
            message,
            recommendation,
        });
    }
}

fn check_ground_coverage(
    profile: &MunicipalProfile,
    totals: &AreaTotals,
    violations: &mut Vec<Violation>,
    items: &mut Vec<ComplianceItem>,
) {
    let coverage = totals.coverage_ratio;
    let rule = "Ground Coverage".to_string();

    if coverage <= profile.max_ground_coverage {
        items.push(ComplianceItem {
            rule,
            status: ComplianceStatus::Pass,
            message: format!(
                "Ground coverage {:.0}% is within the permitted {:.0}%",
                coverage * 100.0,
                profile.max_ground_coverage * 100.0
            ),
            recommendation: None,
        });
    } else {
        let message = format!(
            "Ground coverage {:.0}% exceeds the permitted {:.0}%",
            coverage * 100.0,
            profile.max_ground_coverage * 100.0
        );
        let recommendation = "Shrink the footprint or move area to an upper floor".to_string();
        items.push(ComplianceItem {
            rule: rule.clone(),
            status: ComplianceStatus::Fail,
            message: message.clone(),
            recommendation: Some(recommendation.clone()),
        });
        violations.push(Violation {
            rule,
            severity: Severity::Major,
            room: None,
            message,
            recommendation,
        });
    }
}

fn check_room_sizes(
    rooms: &[EnrichedRoom],
    profile: &MunicipalProfile,
    violations: &mut Vec<Violation>,
    items: &mut Vec<ComplianceItem>,
) {
    for room in rooms {
        if room.room.room_type != RoomType::Room {
            continue;
        }
        let Some(&minimum) = profile.min_room_sizes.get(&room.classification) else {
            continue;
        };

        let rule = format!("Minimum Room Size: {}", room.room.name);
        if room.area >= minimum - AREA_TOLERANCE {
            items.push(ComplianceItem {
                rule,
                status: ComplianceStatus::Pass,
                message: format!(
                    "{} is {:.1} sqm, at or above the {:.1} sqm minimum",
                    room.room.name, room.area, minimum
                ),
                recommendation: None,
            });
        } else {
            let message = format!(
                "{} is {:.1} sqm, below the {:.1} sqm minimum for a {}",
                room.room.name,
                room.area,
                minimum,
                room.classification.label()
            );
            let recommendation = format!(
                "Enlarge {} to at least {:.1} sqm",
                room.room.name, minimum
            );
            items.push(ComplianceItem {
                rule: rule.clone(),
                status: ComplianceStatus::Fail,
                message: message.clone(),
                recommendation: Some(recommendation.clone()),
            });
            violations.push(Violation {
                rule,
                severity: Severity::Major,
                room: Some(room.room.id.clone()),
                message,
                recommendation,
            });
        }
    }
}

fn check_corridor_widths(
    rooms: &[EnrichedRoom],
    profile: &MunicipalProfile,
    violations: &mut Vec<Violation>,
    items: &mut Vec<ComplianceItem>,
) {
    for room in rooms {
        if room.room.room_type != RoomType::Circulation {
            continue;
        }

        let rule = format!("Corridor Width: {}", room.room.name);
        let width = room.room.width.min(room.room.height);

        if width >= profile.min_corridor_width - CORRIDOR_TOLERANCE {
            items.push(ComplianceItem {
                rule,
                status: ComplianceStatus::Pass,
                message: format!(
                    "{} is {:.2} m wide, at or above the {:.2} m minimum",
                    room.room.name, width, profile.min_corridor_width
                ),
                recommendation: None,
            });
        } else {
            let message = format!(
                "{} is {:.2} m wide, below the {:.2} m minimum",
                room.room.name, width, profile.min_corridor_width
            );
            let recommendation = format!(
                "Widen {} to at least {:.2} m",
                room.room.name, profile.min_corridor_width
            );
            items.push(ComplianceItem {
                rule: rule.clone(),
                status: ComplianceStatus::Fail,
                message: message.clone(),
                recommendation: Some(recommendation.clone()),
            });
            violations.push(Violation {
                rule,
                severity: Severity::Major,
                room: Some(room.room.id.clone()),
                message,
                recommendation,
            });
        }
    }
}

fn check_ventilation(
    rooms: &[EnrichedRoom],
    profile: &MunicipalProfile,
    items: &mut Vec<ComplianceItem>,
) {
    for room in rooms {
        if room.room.room_type != RoomType::Room || !room.classification.is_habitable() {
            continue;
        }

        let rule = format!("Ventilation: {}", room.room.name);
        let window_width = room.room.window_width();

        if window_width == 0.0 {
            items.push(ComplianceItem {
                rule,
                status: ComplianceStatus::Warn,
                message: format!("{} has no windows", room.room.name),
                recommendation: Some(format!(
                    "Add at least one window to {} on an external wall",
                    room.room.name
                )),
            });
            continue;
        }

        let ratio = if room.area > 0.0 {
            window_width * WINDOW_HEIGHT / room.area
        } else {
            0.0
        };

        if ratio >= profile.min_ventilation_ratio {
            items.push(ComplianceItem {
                rule,
                status: ComplianceStatus::Pass,
                message: format!(
                    "{} window area is {:.0}% of floor area (minimum {:.0}%)",
                    room.room.name,
                    ratio * 100.0,
                    profile.min_ventilation_ratio * 100.0
                ),
                recommendation: None,
            });
        } else {
            items.push(ComplianceItem {
                rule,
                status: ComplianceStatus::Warn,
                message: format!(
                    "{} window area is {:.0}% of floor area, below the {:.0}% minimum",
                    room.room.name,
                    ratio * 100.0,
                    profile.min_ventilation_ratio * 100.0
                ),
                recommendation: Some(format!("Enlarge or add windows in {}", room.room.name)),
            });
        }
    }
}
