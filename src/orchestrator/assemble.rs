// Final plan assembly
//
// Collapses the last iteration's state into the externally visible
// GeneratedPlan: rooms, accumulated design log, server-side area totals,
// compliance items, BOM and the optional furniture/floor sections.

use crate::plan::{
    BomLine, ComplianceItem, ComplianceSection, ComplianceStatus, CostRange, FloorPartition,
    FloorPlanGraph, FurnitureItem, GeneratedPlan, IterationRecord,
};

fn floor_label(floor: u32) -> String {
    match floor {
        0 => "Ground Floor".to_string(),
        1 => "First Floor".to_string(),
        2 => "Second Floor".to_string(),
        3 => "Third Floor".to_string(),
        n => format!("Floor {n}"),
    }
}

/// Partition rooms by floor index for multi-storey plans. Rooms with no
/// explicit floor land on the ground floor.
fn partition_floors(plan: &FloorPlanGraph) -> Vec<FloorPartition> {
    let mut floors: Vec<u32> = plan
        .rooms
        .iter()
        .map(|r| r.room.floor.unwrap_or(0))
        .collect();
    floors.sort_unstable();
    floors.dedup();

    floors
        .into_iter()
        .map(|floor_number| FloorPartition {
            floor_number,
            floor_label: floor_label(floor_number),
            rooms: plan
                .rooms
                .iter()
                .filter(|r| r.room.floor.unwrap_or(0) == floor_number)
                .cloned()
                .collect(),
        })
        .collect()
}

/// Build the assembled plan from the final iteration.
pub fn assemble_plan(
    plan: &FloorPlanGraph,
    last_iteration: &IterationRecord,
    bom: Vec<BomLine>,
    cost_range: CostRange,
    cost_error: Option<String>,
    furniture: Option<Vec<FurnitureItem>>,
    floor_count: u32,
) -> GeneratedPlan {
    let mut regulatory_items = last_iteration.regulatory.items.clone();
    if let Some(message) = cost_error {
        regulatory_items.push(ComplianceItem {
            rule: "Cost Estimation".to_string(),
            status: ComplianceStatus::Unknown,
            message,
            recommendation: Some("Request a fresh estimate once the service recovers".to_string()),
        });
    }

    GeneratedPlan {
        design_log: plan.design_log.clone(),
        rooms: plan.rooms.clone(),
        total_area: plan.total_area,
        built_up_area: plan.built_up_area,
        plot_coverage_ratio: plan.plot_coverage_ratio,
        compliance: ComplianceSection {
            regulatory: regulatory_items,
            cultural: last_iteration.cultural.items.clone(),
        },
        bom,
        total_cost_range: cost_range,
        furniture,
        floors: (floor_count > 1).then(|| partition_floors(plan)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::enrich;
    use crate::plan::{Critique, Plot, Room, RoomType, ValidationReport};
    use crate::scoring::score_plan;

    fn sample_room(name: &str, floor: Option<u32>) -> Room {
        Room {
            id: format!("room-{name}"),
            name: name.to_string(),
            room_type: RoomType::Room,
            x: 2.0,
            y: 4.0,
            width: 4.0,
            height: 3.0,
            features: vec![],
            guidance: String::new(),
            floor,
        }
    }

    fn sample_plan(floors: &[Option<u32>]) -> FloorPlanGraph {
        let plot = Plot {
            width: 12.0,
            depth: 18.0,
        };
        let rooms: Vec<Room> = floors
            .iter()
            .enumerate()
            .map(|(i, f)| sample_room(&format!("Room {i}"), *f))
            .collect();
        let enriched = enrich(&rooms, &plot);
        FloorPlanGraph {
            rooms: enriched,
            total_area: 216.0,
            built_up_area: 24.0,
            circulation_area: 0.0,
            setback_area: 0.0,
            outdoor_area: 0.0,
            plot_coverage_ratio: 24.0 / 216.0,
            design_log: vec!["initial layout".to_string()],
            adjacencies: vec![],
        }
    }

    fn sample_record(plan: &FloorPlanGraph) -> IterationRecord {
        let report = ValidationReport {
            violations: vec![],
            items: vec![ComplianceItem {
                rule: "Floor Area Ratio".to_string(),
                status: ComplianceStatus::Pass,
                message: "ok".to_string(),
                recommendation: None,
            }],
            score: 1.0,
        };
        IterationRecord {
            iteration: 1,
            plan: plan.clone(),
            regulatory: report.clone(),
            cultural: report,
            critique: Critique {
                spatial_efficiency: 0.8,
                circulation_quality: 0.8,
                natural_lighting: 0.8,
                privacy_gradient: 0.8,
                aesthetic_balance: 0.8,
                overall_confidence: 0.8,
                critiques: vec![],
                strengths: vec![],
            },
            score: score_plan(1.0, 1.0, 0.8, 0.8, 0.7),
        }
    }

    #[test]
    fn test_single_floor_plan_has_no_floor_partition() {
        let plan = sample_plan(&[None, None]);
        let record = sample_record(&plan);
        let assembled = assemble_plan(&plan, &record, vec![], CostRange::zero(), None, None, 1);
        assert!(assembled.floors.is_none());
        assert_eq!(assembled.rooms.len(), 2);
    }

    #[test]
    fn test_multi_floor_partition_groups_and_labels() {
        let plan = sample_plan(&[Some(0), Some(1), None, Some(1)]);
        let record = sample_record(&plan);
        let assembled = assemble_plan(&plan, &record, vec![], CostRange::zero(), None, None, 2);
        let floors = assembled.floors.expect("floors");
        assert_eq!(floors.len(), 2);
        assert_eq!(floors[0].floor_label, "Ground Floor");
        assert_eq!(floors[0].rooms.len(), 2); // Some(0) and None
        assert_eq!(floors[1].floor_label, "First Floor");
        assert_eq!(floors[1].rooms.len(), 2);
    }

    #[test]
    fn test_cost_error_adds_unknown_item() {
        let plan = sample_plan(&[None]);
        let record = sample_record(&plan);
        let assembled = assemble_plan(
            &plan,
            &record,
            vec![],
            CostRange::zero(),
            Some("cost agent model call failed".to_string()),
            None,
            1,
        );
        let item = assembled
            .compliance
            .regulatory
            .iter()
            .find(|i| i.rule == "Cost Estimation")
            .expect("soft-error item");
        assert_eq!(item.status, ComplianceStatus::Unknown);
        assert!(assembled.bom.is_empty());
        assert_eq!(assembled.total_cost_range.min, 0.0);
    }

    #[test]
    fn test_compliance_carried_from_last_iteration() {
        let plan = sample_plan(&[None]);
        let record = sample_record(&plan);
        let assembled = assemble_plan(&plan, &record, vec![], CostRange::zero(), None, None, 1);
        assert_eq!(assembled.compliance.regulatory.len(), 1);
        assert_eq!(assembled.compliance.regulatory[0].rule, "Floor Area Ratio");
    }

    #[test]
    fn test_floor_labels() {
        assert_eq!(floor_label(0), "Ground Floor");
        assert_eq!(floor_label(4), "Floor 4");
    }
}
