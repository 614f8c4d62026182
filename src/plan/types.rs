// Core data types for floor plan generation
//
// Wire shapes use camelCase to match the public JSON contract. Internal-only
// fields are skipped during serialization.

use serde::{Deserialize, Serialize};

use crate::geometry::{RoomClass, Sector};
use crate::municipal::MunicipalProfile;

/// How strongly Vastu rules are enforced. Omitted in the config means `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrictnessLevel {
    #[default]
    None,
    Slightly,
    Moderately,
    Strictly,
}

impl StrictnessLevel {
    /// Scalar multiplier applied to every Vastu rule penalty.
    pub fn coefficient(&self) -> f64 {
        match self {
            StrictnessLevel::None => 0.0,
            StrictnessLevel::Slightly => 0.25,
            StrictnessLevel::Moderately => 0.5,
            StrictnessLevel::Strictly => 1.0,
        }
    }
}

/// Parking requirement from the project configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParkingLevel {
    None,
    Single,
    Double,
}

/// The declarative project configuration submitted by the client.
///
/// Immutable once submitted — the orchestrator never mutates it, only the
/// derived `NormalizedSpec`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Plot width in metres (east-west extent)
    pub plot_width: f64,
    /// Plot depth in metres (north-south extent)
    pub plot_depth: f64,
    /// Free-text room requirements ("Master Bedroom", "Pooja Room near entrance", ...)
    pub requirements: Vec<String>,
    /// Municipal authority tag ("national", "mumbai", ...). Unknown tags fall
    /// back to the national profile with a warning.
    pub municipal_authority: String,
    #[serde(default)]
    pub cultural_system: Option<String>,
    #[serde(default)]
    pub strictness: Option<StrictnessLevel>,
    #[serde(default)]
    pub floors: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub parking: Option<ParkingLevel>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl ProjectConfig {
    /// Synchronous validation performed before a job is created.
    ///
    /// Returns a human-readable message for the 400 response on failure.
    pub fn validate(&self) -> Result<(), String> {
        if !self.plot_width.is_finite() || self.plot_width <= 0.0 {
            return Err(format!("plotWidth must be positive, got {}", self.plot_width));
        }
        if !self.plot_depth.is_finite() || self.plot_depth <= 0.0 {
            return Err(format!("plotDepth must be positive, got {}", self.plot_depth));
        }
        if self.requirements.is_empty() {
            return Err("requirements must not be empty".to_string());
        }
        if let Some(floors) = self.floors {
            if floors < 1 {
                return Err("floors must be >= 1".to_string());
            }
        }
        Ok(())
    }

    pub fn strictness_coefficient(&self) -> f64 {
        self.strictness.unwrap_or_default().coefficient()
    }

    pub fn floor_count(&self) -> u32 {
        self.floors.unwrap_or(1).max(1)
    }
}

/// Plot geometry in metres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub width: f64,
    pub depth: f64,
}

impl Plot {
    pub fn area(&self) -> f64 {
        self.width * self.depth
    }
}

/// What a room rectangle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Room,
    Circulation,
    Outdoor,
    Setback,
    Service,
}

impl RoomType {
    /// Room types counted towards built-up area.
    pub fn is_built_up(&self) -> bool {
        matches!(self, RoomType::Room | RoomType::Service)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallFeatureKind {
    Door,
    Window,
    Opening,
}

/// A door, window or opening placed along one wall of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallFeature {
    pub kind: WallFeatureKind,
    pub wall: WallSide,
    /// Offset from the wall's origin corner, in metres
    pub position: f64,
    pub width: f64,
}

/// An axis-aligned room rectangle in plot coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub features: Vec<WallFeature>,
    /// Free-text design guidance carried through refinement passes
    #[serde(default)]
    pub guidance: String,
    #[serde(default)]
    pub floor: Option<u32>,
}

impl Room {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn centroid(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Total window width along all walls, used by the ventilation check.
    pub fn window_width(&self) -> f64 {
        self.features
            .iter()
            .filter(|f| f.kind == WallFeatureKind::Window)
            .map(|f| f.width)
            .sum()
    }
}

/// A room augmented with derived geometry and its classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRoom {
    #[serde(flatten)]
    pub room: Room,
    pub centroid_x: f64,
    pub centroid_y: f64,
    pub area: f64,
    pub sector: Sector,
    pub classification: RoomClass,
}

/// One required room derived from the project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequirement {
    pub classification: RoomClass,
    pub name: String,
    pub min_area: f64,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjacencyRelation {
    Adjacent,
    Nearby,
    Separated,
}

/// A parsed adjacency hint ("kitchen near dining").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacencyPreference {
    pub room_a: String,
    pub room_b: String,
    pub relation: AdjacencyRelation,
}

/// The project configuration plus everything derived from it.
///
/// Produced once by the input agent; read-only for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSpec {
    pub config: ProjectConfig,
    pub plot: Plot,
    pub room_requirements: Vec<RoomRequirement>,
    pub municipal: MunicipalProfile,
    /// Vastu strictness coefficient in [0, 1]
    pub strictness: f64,
    pub adjacency: Vec<AdjacencyPreference>,
}

/// The current candidate solution flowing through the iteration loop.
///
/// Area totals are always recomputed server-side from the room list — LLM
/// returned totals are discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanGraph {
    pub rooms: Vec<EnrichedRoom>,
    pub total_area: f64,
    pub built_up_area: f64,
    pub circulation_area: f64,
    pub setback_area: f64,
    pub outdoor_area: f64,
    pub plot_coverage_ratio: f64,
    pub design_log: Vec<String>,
    #[serde(default)]
    pub adjacencies: Vec<AdjacencyPreference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

/// A single regulatory or cultural rule violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub message: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// One line of the compliance report — validators emit one item per check,
/// including the passing ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceItem {
    pub rule: String,
    pub status: ComplianceStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Output of either deterministic validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub items: Vec<ComplianceItem>,
    /// Score in [0, 1]
    pub score: f64,
}

impl ValidationReport {
    pub fn passing(item: ComplianceItem) -> Self {
        Self {
            violations: Vec::new(),
            items: vec![item],
            score: 1.0,
        }
    }
}

/// Critic agent output — six subscores plus bounded critique/strength lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Critique {
    pub spatial_efficiency: f64,
    pub circulation_quality: f64,
    pub natural_lighting: f64,
    pub privacy_gradient: f64,
    pub aesthetic_balance: f64,
    pub overall_confidence: f64,
    pub critiques: Vec<String>,
    pub strengths: Vec<String>,
}

impl Critique {
    /// Clamp every subscore into [0, 1] and cap both lists at five entries.
    ///
    /// Some models occasionally return 1.05 or -0.1; that is never fatal.
    pub fn normalize(mut self) -> Self {
        for score in [
            &mut self.spatial_efficiency,
            &mut self.circulation_quality,
            &mut self.natural_lighting,
            &mut self.privacy_gradient,
            &mut self.aesthetic_balance,
            &mut self.overall_confidence,
        ] {
            *score = score.clamp(0.0, 1.0);
        }
        self.critiques.truncate(5);
        self.strengths.truncate(5);
        self
    }
}

/// One weighted component of the final score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub category: String,
    pub weight: f64,
    pub raw_score: f64,
    pub weighted_score: f64,
}

/// The convergence signal: weighted combination of the four subscores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanScore {
    pub final_score: f64,
    pub breakdown: Vec<ScoreComponent>,
    pub passes_threshold: bool,
}

/// Snapshot of one full iteration: plan, both validator reports, critique, score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    pub iteration: u32,
    pub plan: FloorPlanGraph,
    pub regulatory: ValidationReport,
    pub cultural: ValidationReport,
    pub critique: Critique,
    pub score: PlanScore,
}

/// One bill-of-materials line from the cost agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomLine {
    pub material: String,
    pub quantity: f64,
    pub unit: String,
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

impl CostRange {
    pub fn zero() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            currency: "INR".to_string(),
        }
    }
}

/// A furniture placement in absolute plot coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureItem {
    pub room_id: String,
    pub item: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rooms of one floor, split out when the plan spans multiple floors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPartition {
    pub floor_number: u32,
    pub floor_label: String,
    pub rooms: Vec<EnrichedRoom>,
}

/// Compliance section of the assembled plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSection {
    pub regulatory: Vec<ComplianceItem>,
    pub cultural: Vec<ComplianceItem>,
}

/// The externally visible result of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub design_log: Vec<String>,
    pub rooms: Vec<EnrichedRoom>,
    pub total_area: f64,
    pub built_up_area: f64,
    pub plot_coverage_ratio: f64,
    pub compliance: ComplianceSection,
    pub bom: Vec<BomLine>,
    pub total_cost_range: CostRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furniture: Option<Vec<FurnitureItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<Vec<FloorPartition>>,
}
