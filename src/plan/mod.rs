// Floor plan data model
//
// Shared types for the whole pipeline: project configuration in, enriched
// floor plan graph through the iteration loop, assembled GeneratedPlan out.

mod types;

pub use types::{
    AdjacencyPreference, AdjacencyRelation, BomLine, ComplianceItem, ComplianceSection,
    ComplianceStatus, CostRange, Critique, EnrichedRoom, FloorPartition, FloorPlanGraph,
    FurnitureItem, GeneratedPlan, IterationRecord, NormalizedSpec, ParkingLevel, PlanScore, Plot,
    ProjectConfig, Room, RoomRequirement, RoomType, ScoreComponent, Severity, StrictnessLevel,
    ValidationReport, Violation, WallFeature, WallFeatureKind, WallSide,
};
