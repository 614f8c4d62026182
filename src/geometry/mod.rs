// Geometry utilities — centroids, areas, cardinal sectors, enrichment
//
// Everything here is pure and deterministic: no LLM, no IO. Both the
// enrichment step and the Vastu validator depend on the 3x3 sector grid.

mod classify;

pub use classify::{classify, RoomClass};

use serde::{Deserialize, Serialize};

use crate::plan::{EnrichedRoom, Plot, Room, RoomType};

/// One of nine cardinal cells of a 3x3 partition of the plot.
///
/// The plot origin (0, 0) is the north-west corner; x grows east, y grows
/// south. Row 0 is therefore the northern band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    NW,
    N,
    NE,
    W,
    #[serde(rename = "CENTER")]
    Center,
    E,
    SW,
    S,
    SE,
}

const SECTOR_GRID: [[Sector; 3]; 3] = [
    [Sector::NW, Sector::N, Sector::NE],
    [Sector::W, Sector::Center, Sector::E],
    [Sector::SW, Sector::S, Sector::SE],
];

/// Locate a centroid in the 3x3 grid over the plot.
///
/// A centroid exactly on a gridline resolves to the lower-index cell, so the
/// assignment is total and deterministic for any finite input.
pub fn direction(center_x: f64, center_y: f64, plot_width: f64, plot_depth: f64) -> Sector {
    let col = third_index(center_x, plot_width);
    let row = third_index(center_y, plot_depth);
    SECTOR_GRID[row][col]
}

fn third_index(value: f64, extent: f64) -> usize {
    if value > extent * 2.0 / 3.0 {
        2
    } else if value > extent / 3.0 {
        1
    } else {
        0
    }
}

/// Augment rooms with centroid, area, sector and classification.
///
/// Idempotent: enriching already-enriched rooms yields identical results
/// because every derived field is a pure function of the base room.
pub fn enrich(rooms: &[Room], plot: &Plot) -> Vec<EnrichedRoom> {
    rooms
        .iter()
        .map(|room| {
            let (cx, cy) = room.centroid();
            EnrichedRoom {
                centroid_x: cx,
                centroid_y: cy,
                area: room.area(),
                sector: direction(cx, cy, plot.width, plot.depth),
                classification: classify(&room.name),
                room: room.clone(),
            }
        })
        .collect()
}

/// Server-side area accounting, recomputed from the room list.
///
/// LLM-returned totals are never trusted; this is the single source of truth
/// for built-up, circulation, setback and outdoor areas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaTotals {
    pub total: f64,
    pub built_up: f64,
    pub circulation: f64,
    pub setback: f64,
    pub outdoor: f64,
    pub coverage_ratio: f64,
}

pub fn area_totals(rooms: &[EnrichedRoom], plot: &Plot) -> AreaTotals {
    let mut built_up = 0.0;
    let mut circulation = 0.0;
    let mut setback = 0.0;
    let mut outdoor = 0.0;

    for room in rooms {
        match room.room.room_type {
            RoomType::Room | RoomType::Service => built_up += room.area,
            RoomType::Circulation => circulation += room.area,
            RoomType::Setback => setback += room.area,
            RoomType::Outdoor => outdoor += room.area,
        }
    }

    let total = plot.area();
    AreaTotals {
        total,
        built_up,
        circulation,
        setback,
        outdoor,
        coverage_ratio: if total > 0.0 { built_up / total } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str, x: f64, y: f64, w: f64, h: f64, room_type: RoomType) -> Room {
        Room {
            id: format!("room-{name}"),
            name: name.to_string(),
            room_type,
            x,
            y,
            width: w,
            height: h,
            features: vec![],
            guidance: String::new(),
            floor: None,
        }
    }

    #[test]
    fn test_direction_corners() {
        assert_eq!(direction(1.0, 1.0, 12.0, 18.0), Sector::NW);
        assert_eq!(direction(11.0, 1.0, 12.0, 18.0), Sector::NE);
        assert_eq!(direction(1.0, 17.0, 12.0, 18.0), Sector::SW);
        assert_eq!(direction(11.0, 17.0, 12.0, 18.0), Sector::SE);
    }

    #[test]
    fn test_direction_center_and_edges() {
        assert_eq!(direction(6.0, 9.0, 12.0, 18.0), Sector::Center);
        assert_eq!(direction(6.0, 1.0, 12.0, 18.0), Sector::N);
        assert_eq!(direction(6.0, 17.0, 12.0, 18.0), Sector::S);
        assert_eq!(direction(1.0, 9.0, 12.0, 18.0), Sector::W);
        assert_eq!(direction(11.0, 9.0, 12.0, 18.0), Sector::E);
    }

    #[test]
    fn test_direction_gridline_resolves_to_lower_index() {
        // x exactly on the first gridline (12/3 = 4) stays in column 0
        assert_eq!(direction(4.0, 1.0, 12.0, 18.0), Sector::NW);
        // y exactly on the second gridline (18 * 2/3 = 12) stays in row 1
        assert_eq!(direction(6.0, 12.0, 12.0, 18.0), Sector::Center);
    }

    #[test]
    fn test_direction_deterministic_across_calls() {
        for _ in 0..10 {
            assert_eq!(direction(7.3, 4.1, 12.0, 18.0), direction(7.3, 4.1, 12.0, 18.0));
        }
    }

    #[test]
    fn test_enrich_computes_derived_fields() {
        let plot = Plot {
            width: 12.0,
            depth: 18.0,
        };
        let rooms = vec![room("Kitchen", 8.0, 0.0, 4.0, 4.0, RoomType::Room)];
        let enriched = enrich(&rooms, &plot);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].centroid_x, 10.0);
        assert_eq!(enriched[0].centroid_y, 2.0);
        assert_eq!(enriched[0].area, 16.0);
        assert_eq!(enriched[0].sector, Sector::NE);
        assert_eq!(enriched[0].classification, RoomClass::Kitchen);
    }

    #[test]
    fn test_enrich_is_idempotent() {
        let plot = Plot {
            width: 10.0,
            depth: 10.0,
        };
        let rooms = vec![
            room("Master Bedroom", 0.0, 6.0, 4.0, 4.0, RoomType::Room),
            room("Corridor", 4.0, 4.0, 2.0, 6.0, RoomType::Circulation),
        ];
        let once = enrich(&rooms, &plot);
        let base: Vec<Room> = once.iter().map(|e| e.room.clone()).collect();
        let twice = enrich(&base, &plot);
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.sector, b.sector);
            assert_eq!(a.classification, b.classification);
            assert_eq!(a.area, b.area);
            assert_eq!(a.centroid_x, b.centroid_x);
        }
    }

    #[test]
    fn test_area_totals_partitions_by_room_type() {
        let plot = Plot {
            width: 10.0,
            depth: 20.0,
        };
        let rooms = enrich(
            &[
                room("Living Room", 0.0, 0.0, 5.0, 8.0, RoomType::Room),
                room("Utility", 5.0, 0.0, 2.0, 4.0, RoomType::Service),
                room("Corridor", 5.0, 4.0, 2.0, 6.0, RoomType::Circulation),
                room("Front Setback", 0.0, 17.0, 10.0, 3.0, RoomType::Setback),
                room("Garden", 0.0, 10.0, 5.0, 5.0, RoomType::Outdoor),
            ],
            &plot,
        );
        let totals = area_totals(&rooms, &plot);
        assert_eq!(totals.total, 200.0);
        assert_eq!(totals.built_up, 48.0);
        assert_eq!(totals.circulation, 12.0);
        assert_eq!(totals.setback, 30.0);
        assert_eq!(totals.outdoor, 25.0);
        assert!((totals.coverage_ratio - 0.24).abs() < 1e-9);
    }

    #[test]
    fn test_sector_serializes_to_wire_names() {
        assert_eq!(serde_json::to_value(Sector::Center).unwrap(), "CENTER");
        assert_eq!(serde_json::to_value(Sector::NW).unwrap(), "NW");
    }
}
