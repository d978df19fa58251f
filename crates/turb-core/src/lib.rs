pub mod advisory;
pub mod aggregate;
pub mod altitude;
pub mod assessment;
pub mod confidence;
pub mod matching;
pub mod models;
pub mod phases;
pub mod regions;
pub mod report;
pub mod severity;
pub mod spatial;
pub mod waypoints;

pub use advisory::{
    normalize_hazard_type, normalize_severity, parse_feed, parse_json_feed, parse_xml_feed,
    FeedFormat, FeedParseError,
};
pub use aggregate::{blend_population_with_advisory, phase_weighted_severity, population_severity};
pub use assessment::assess_route;
pub use confidence::{
    estimate_confidence, AdvisorySupport, ConfidenceBreakdown, FixedNoise, NoiseSource,
    SeededNoise, ThreadNoise,
};
pub use matching::{match_advisories, AdvisoryMatch, MatchKind, MatchOutcome, MatchScope};
pub use models::{
    AdvisoryRecord, AltitudeBand, FlightPhase, HazardType, PhaseAssessment, PhaseName, PhaseType,
    RouteAssessment, Waypoint, WeatherReading, WeatherSample,
};
pub use phases::{classify_phase, classify_wind, segment_phases};
pub use report::{
    estimate_flight_time, recommendations, turbulence_factors, NarrativeContext, Recommendation,
};
pub use severity::SeverityLevel;
pub use spatial::{distance_miles, haversine_distance, point_in_polygon, split_at_antimeridian};
pub use waypoints::{generate_great_circle_path, RouteError, DEFAULT_WAYPOINT_COUNT};
