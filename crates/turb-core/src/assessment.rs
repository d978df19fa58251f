//! Full route assessment from waypoints, weather samples and advisories.

use crate::aggregate::{blend_population_with_advisory, phase_weighted_severity, population_severity};
use crate::confidence::{estimate_confidence, AdvisorySupport, NoiseSource};
use crate::matching::{match_advisories, MatchScope};
use crate::models::{AdvisoryRecord, PhaseAssessment, RouteAssessment, Waypoint, WeatherSample};
use crate::phases::{classify_phase, segment_phases};
use crate::severity::SeverityLevel;

/// Classify every phase, aggregate, and score confidence.
///
/// Missing weather samples and non-matching advisories only reduce the
/// input; this never fails.
pub fn assess_route(
    waypoints: &[Waypoint],
    samples: &[WeatherSample],
    advisories: &[AdvisoryRecord],
    noise: &dyn NoiseSource,
) -> RouteAssessment {
    let phases: Vec<PhaseAssessment> = segment_phases(waypoints)
        .iter()
        .map(|phase| classify_phase(phase, samples, advisories))
        .collect();
    let route_severity = phase_weighted_severity(&phases).unwrap_or(SeverityLevel::Light);

    let route_match = match_advisories(advisories, MatchScope::route(waypoints));
    let contributing_advisories = route_match.records(advisories);

    let pooled: Vec<SeverityLevel> = phases
        .iter()
        .flat_map(|p| p.raw_severities.iter().copied())
        .collect();
    let population_severity = population_severity(&pooled)
        .map(|level| blend_population_with_advisory(level, route_match.recommendation));

    let support = (!contributing_advisories.is_empty()).then(|| AdvisorySupport {
        advisories: &contributing_advisories,
        total_weight: route_match.total_weight,
    });
    let confidence_breakdown = estimate_confidence(support, noise);

    RouteAssessment {
        phases,
        route_severity,
        population_severity,
        confidence: confidence_breakdown.value,
        confidence_breakdown,
        has_advisories: !contributing_advisories.is_empty(),
        advisory_recommendation: route_match.recommendation,
        advisory_total_weight: route_match.total_weight,
        contributing_advisories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::FixedNoise;
    use crate::models::{AltitudeBand, HazardType, PhaseName, WeatherReading};
    use crate::waypoints::generate_great_circle_path;

    const JFK: Waypoint = Waypoint { lat: 40.6413, lon: -73.7781 };
    const LAX: Waypoint = Waypoint { lat: 33.9416, lon: -118.4085 };

    fn calm_samples(route: &[Waypoint]) -> Vec<WeatherSample> {
        route
            .iter()
            .enumerate()
            .map(|(i, wp)| WeatherSample {
                waypoint_index: i,
                lat: wp.lat,
                lon: wp.lon,
                reading: WeatherReading {
                    wind_speed_mph: 40.0,
                    temperature_f: 55.0,
                    humidity_pct: 45.0,
                    pressure_hpa: 1016.0,
                    description: "few clouds".to_string(),
                },
            })
            .collect()
    }

    /// Box around the cruise waypoints, padded a degree each way.
    fn cruise_box(route: &[Waypoint]) -> Vec<[f64; 2]> {
        let cruise = &route[3..13];
        let min_lat = cruise.iter().map(|w| w.lat).fold(f64::MAX, f64::min) - 1.0;
        let max_lat = cruise.iter().map(|w| w.lat).fold(f64::MIN, f64::max) + 1.0;
        let min_lon = cruise.iter().map(|w| w.lon).fold(f64::MAX, f64::min) - 0.5;
        let max_lon = cruise.iter().map(|w| w.lon).fold(f64::MIN, f64::max) + 0.5;
        vec![[min_lat, min_lon], [min_lat, max_lon], [max_lat, max_lon], [max_lat, min_lon]]
    }

    #[test]
    fn calm_route_without_advisories_is_light() {
        let route = generate_great_circle_path(JFK, LAX, 15).unwrap();
        let result = assess_route(&route, &calm_samples(&route), &[], &FixedNoise(0.5));
        assert_eq!(result.route_severity, SeverityLevel::Light);
        assert_eq!(result.population_severity, Some(SeverityLevel::Light));
        assert!(!result.has_advisories);
        assert_eq!(result.phases.len(), 3);
        assert_eq!(result.confidence, 0.55);
    }

    #[test]
    fn severe_cruise_advisory_raises_cruise_and_route() {
        let route = generate_great_circle_path(JFK, LAX, 15).unwrap();
        let samples = calm_samples(&route);
        let advisory = AdvisoryRecord {
            hazard_type: HazardType::Turbulence,
            raw_hazard: "TURB-HI".to_string(),
            severity: SeverityLevel::Severe,
            altitude: AltitudeBand::new(30_000.0, 40_000.0),
            polygon: cruise_box(&route),
            valid_time: None,
            area_label: "Central United States".to_string(),
            product: Some("TANGO".to_string()),
        };
        let baseline = assess_route(&route, &samples, &[], &FixedNoise(0.5));
        let result = assess_route(&route, &samples, &[advisory], &FixedNoise(0.5));

        let cruise = result.phase(PhaseName::Cruise).unwrap();
        assert_eq!(cruise.base_severity, SeverityLevel::Light);
        assert_eq!(cruise.severity, SeverityLevel::Severe);
        assert!(result.route_severity > baseline.route_severity);
        assert_eq!(result.route_severity, SeverityLevel::ModerateToSevere);
        assert!(result.has_advisories);
        assert_eq!(result.contributing_advisories.len(), 1);
        assert!(result.confidence >= baseline.confidence);
    }

    #[test]
    fn european_route_gets_no_advisory_analysis() {
        let lhr = Waypoint::new(51.47, -0.4543);
        let cdg = Waypoint::new(49.0097, 2.5479);
        let route = generate_great_circle_path(lhr, cdg, 15).unwrap();
        let everywhere = AdvisoryRecord {
            hazard_type: HazardType::Turbulence,
            raw_hazard: "TURB-HI".to_string(),
            severity: SeverityLevel::Severe,
            altitude: AltitudeBand::UNBOUNDED,
            polygon: vec![[-89.0, -179.0], [-89.0, 179.0], [89.0, 179.0], [89.0, -179.0]],
            valid_time: None,
            area_label: "Western Europe".to_string(),
            product: None,
        };
        let result = assess_route(&route, &calm_samples(&route), &[everywhere], &FixedNoise(0.5));
        assert!(!result.has_advisories);
        assert!(result.phases.iter().all(|p| p.applicable_advisories == 0));
        assert_eq!(result.route_severity, SeverityLevel::Light);
    }

    #[test]
    fn partial_weather_coverage_still_assesses() {
        let route = generate_great_circle_path(JFK, LAX, 15).unwrap();
        let samples: Vec<WeatherSample> = calm_samples(&route).into_iter().step_by(4).collect();
        let result = assess_route(&route, &samples, &[], &FixedNoise(0.5));
        assert_eq!(result.route_severity, SeverityLevel::Light);
        let counted: usize = result.phases.iter().map(|p| p.sample_count).sum();
        assert!(counted > 0);
    }
}
