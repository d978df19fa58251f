//! Core data models for the turbulence pipeline.

use serde::{Deserialize, Serialize};

use crate::severity::SeverityLevel;

/// A point on the sampled great-circle route, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Vertical extent in feet MSL, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltitudeBand {
    pub min_ft: f64,
    pub max_ft: f64,
}

impl AltitudeBand {
    /// Band used when a feed omits altitude information.
    pub const UNBOUNDED: AltitudeBand = AltitudeBand {
        min_ft: 0.0,
        max_ft: 999_999.0,
    };

    pub fn new(min_ft: f64, max_ft: f64) -> Self {
        Self {
            min_ft: min_ft.min(max_ft),
            max_ft: min_ft.max(max_ft),
        }
    }

    /// Degenerate band covering a single altitude.
    pub fn at(altitude_ft: f64) -> Self {
        Self::new(altitude_ft, altitude_ft)
    }

    pub fn length(&self) -> f64 {
        self.max_ft - self.min_ft
    }

    pub fn contains(&self, altitude_ft: f64) -> bool {
        altitude_ft >= self.min_ft && altitude_ft <= self.max_ft
    }

    /// `a.min <= b.max && b.min <= a.max`; touching bands overlap.
    pub fn overlaps(&self, other: &AltitudeBand) -> bool {
        self.min_ft <= other.max_ft && other.min_ft <= self.max_ft
    }

    /// Length of the shared interval, zero when disjoint.
    pub fn overlap_length(&self, other: &AltitudeBand) -> f64 {
        (self.max_ft.min(other.max_ft) - self.min_ft.max(other.min_ft)).max(0.0)
    }

    /// Portion of `reference` covered by `self`, clamped to [0, 1].
    ///
    /// A zero-length reference is either fully covered or not at all.
    pub fn overlap_fraction(&self, reference: &AltitudeBand) -> f64 {
        let span = reference.length();
        if span <= 0.0 {
            return if self.contains(reference.min_ft) { 1.0 } else { 0.0 };
        }
        (self.overlap_length(reference) / span).clamp(0.0, 1.0)
    }
}

/// Surface reading from the weather provider (imperial units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub wind_speed_mph: f64,
    pub temperature_f: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub description: String,
}

/// Weather reading tied to the waypoint it was sampled at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    /// Index into the route's waypoint sequence.
    pub waypoint_index: usize,
    pub lat: f64,
    pub lon: f64,
    pub reading: WeatherReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardType {
    Turbulence,
    Icing,
    MountainWave,
    LowLevelWindShear,
    Unknown,
}

impl HazardType {
    /// Hazards that feed turbulence severity.
    pub fn affects_turbulence(self) -> bool {
        matches!(self, HazardType::Turbulence | HazardType::MountainWave)
    }
}

/// Normalised hazard advisory, independent of the feed format it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRecord {
    pub hazard_type: HazardType,
    /// Hazard code as published (e.g. "TURB-HI"), kept for display.
    pub raw_hazard: String,
    pub severity: SeverityLevel,
    pub altitude: AltitudeBand,
    /// Vertices as `[lat, lon]`; empty when the feed carried no geometry.
    #[serde(default)]
    pub polygon: Vec<[f64; 2]>,
    #[serde(default)]
    pub valid_time: Option<String>,
    pub area_label: String,
    #[serde(default)]
    pub product: Option<String>,
}

impl AdvisoryRecord {
    pub fn has_polygon(&self) -> bool {
        self.polygon.len() >= 3
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseName {
    Climb,
    Cruise,
    Descent,
}

impl PhaseName {
    /// Assumed share of total flight time.
    pub fn time_share(self) -> f64 {
        match self {
            PhaseName::Climb => 0.15,
            PhaseName::Cruise => 0.70,
            PhaseName::Descent => 0.15,
        }
    }
}

/// Sensitivity profile applied to a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    /// Near-ground climb/descent: surface wind, coarse thresholds, capped advisory upgrade.
    Terminal,
    /// Cruise: altitude-adjusted wind, jet-stream thresholds, full advisory upgrade.
    EnRoute,
}

/// Contiguous slice of the route flown in one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPhase {
    pub name: PhaseName,
    /// Index of the first waypoint of this phase in the full route.
    pub start_index: usize,
    pub waypoints: Vec<Waypoint>,
    pub altitude_band: AltitudeBand,
    pub phase_type: PhaseType,
}

impl FlightPhase {
    pub fn end_index(&self) -> usize {
        self.start_index + self.waypoints.len()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index()
    }
}

/// Classification outcome for one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseAssessment {
    pub phase: FlightPhase,
    /// Mode of the raw per-band severities, before advisories.
    pub base_severity: SeverityLevel,
    pub severity: SeverityLevel,
    /// Number of (waypoint, band) pairs that fed the mode.
    pub sample_count: usize,
    pub applicable_advisories: usize,
    pub advisory_recommendation: Option<SeverityLevel>,
    /// Every raw per-band severity computed for this phase.
    #[serde(skip)]
    pub raw_severities: Vec<SeverityLevel>,
}

/// Result handed to the API layer and the narrative generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAssessment {
    pub phases: Vec<PhaseAssessment>,
    /// Phase-weighted severity (authoritative).
    pub route_severity: SeverityLevel,
    /// Population-based severity, kept for diagnostics.
    pub population_severity: Option<SeverityLevel>,
    pub confidence: f64,
    pub confidence_breakdown: crate::confidence::ConfidenceBreakdown,
    pub contributing_advisories: Vec<AdvisoryRecord>,
    /// Route-scope recommendation from the contributing advisories.
    pub advisory_recommendation: Option<SeverityLevel>,
    pub advisory_total_weight: f64,
    pub has_advisories: bool,
}

impl RouteAssessment {
    pub fn phase(&self, name: PhaseName) -> Option<&PhaseAssessment> {
        self.phases.iter().find(|p| p.phase.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_bands_overlap() {
        let climb = AltitudeBand::new(0.0, 30_000.0);
        let cruise = AltitudeBand::new(30_000.0, 40_000.0);
        assert!(climb.overlaps(&cruise));
        assert_eq!(climb.overlap_length(&cruise), 0.0);
    }

    #[test]
    fn high_band_is_disjoint_from_terminal_band() {
        let advisory = AltitudeBand::new(40_000.0, 41_000.0);
        assert!(!advisory.overlaps(&AltitudeBand::new(0.0, 30_000.0)));
        assert!(advisory.overlaps(&AltitudeBand::new(30_000.0, 40_000.0)));
    }

    #[test]
    fn overlap_fraction_is_clamped_and_handles_points() {
        let reference = AltitudeBand::new(30_000.0, 40_000.0);
        assert_eq!(AltitudeBand::new(0.0, 50_000.0).overlap_fraction(&reference), 1.0);
        assert!((AltitudeBand::new(35_000.0, 45_000.0).overlap_fraction(&reference) - 0.5).abs() < 1e-9);
        assert_eq!(AltitudeBand::new(0.0, 10_000.0).overlap_fraction(&reference), 0.0);

        let point = AltitudeBand::at(35_000.0);
        assert_eq!(AltitudeBand::new(30_000.0, 40_000.0).overlap_fraction(&point), 1.0);
        assert_eq!(AltitudeBand::new(0.0, 30_000.0).overlap_fraction(&point), 0.0);
    }

    #[test]
    fn new_orders_bounds() {
        let band = AltitudeBand::new(10_000.0, 2_000.0);
        assert_eq!(band.min_ft, 2_000.0);
        assert_eq!(band.max_ft, 10_000.0);
    }

    #[test]
    fn altitude_band_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(AltitudeBand::new(30_000.0, 40_000.0)).unwrap();
        assert_eq!(json, serde_json::json!({"minFt": 30000.0, "maxFt": 40000.0}));
        let back: AltitudeBand = serde_json::from_value(json).unwrap();
        assert_eq!(back, AltitudeBand::new(30_000.0, 40_000.0));
    }
}
