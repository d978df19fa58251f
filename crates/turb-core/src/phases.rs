//! Flight phase segmentation and per-phase severity classification.

use crate::altitude::{band_sample_altitude, terminal_sample_bands, CRUISE_REFERENCE_FT};
use crate::matching::{match_advisories, MatchScope};
use crate::models::{
    AdvisoryRecord, AltitudeBand, FlightPhase, PhaseAssessment, PhaseName, PhaseType, Waypoint,
    WeatherSample,
};
use crate::severity::{mode, SeverityLevel};

/// Share of waypoints assigned to climb, and again to descent.
pub const TERMINAL_PHASE_SHARE: f64 = 0.2;

pub const TERMINAL_PHASE_BAND: AltitudeBand = AltitudeBand {
    min_ft: 0.0,
    max_ft: 30_000.0,
};

pub const CRUISE_PHASE_BAND: AltitudeBand = AltitudeBand {
    min_ft: 30_000.0,
    max_ft: 40_000.0,
};

/// Upper wind bounds (mph, exclusive) for Light..ModerateToSevere at cruise,
/// applied to altitude-adjusted wind.
const CRUISE_WIND_THRESHOLDS: [f64; 4] = [110.0, 140.0, 170.0, 200.0];
/// Same for climb/descent, applied to surface wind.
const TERMINAL_WIND_THRESHOLDS: [f64; 4] = [50.0, 70.0, 90.0, 110.0];

/// Split the route into climb (first 20%), cruise, descent (last 20%).
///
/// Climb and descent get at least one waypoint each when the route has
/// enough points; cruise takes whatever is left and may be empty.
pub fn segment_phases(waypoints: &[Waypoint]) -> Vec<FlightPhase> {
    let total = waypoints.len();
    let terminal = ((total as f64 * TERMINAL_PHASE_SHARE).floor() as usize).max(1);
    let climb_len = terminal.min(total);
    let descent_len = terminal.min(total - climb_len);
    let cruise_len = total - climb_len - descent_len;

    let spans = [
        (PhaseName::Climb, 0, climb_len),
        (PhaseName::Cruise, climb_len, cruise_len),
        (PhaseName::Descent, climb_len + cruise_len, descent_len),
    ];

    spans
        .into_iter()
        .map(|(name, start, len)| {
            let (altitude_band, phase_type) = match name {
                PhaseName::Cruise => (CRUISE_PHASE_BAND, PhaseType::EnRoute),
                PhaseName::Climb | PhaseName::Descent => (TERMINAL_PHASE_BAND, PhaseType::Terminal),
            };
            FlightPhase {
                name,
                start_index: start,
                waypoints: waypoints[start..start + len].to_vec(),
                altitude_band,
                phase_type,
            }
        })
        .collect()
}

/// Bucket a wind speed with the phase's threshold table.
pub fn classify_wind(phase_type: PhaseType, wind_mph: f64) -> SeverityLevel {
    let thresholds = match phase_type {
        PhaseType::EnRoute => &CRUISE_WIND_THRESHOLDS,
        PhaseType::Terminal => &TERMINAL_WIND_THRESHOLDS,
    };
    thresholds
        .iter()
        .position(|limit| wind_mph < *limit)
        .map(|slot| SeverityLevel::ALL[slot])
        .unwrap_or(SeverityLevel::Severe)
}

/// Raw severity for every (waypoint, band) pair sampled in `phase`.
pub fn raw_phase_severities(phase: &FlightPhase, samples: &[WeatherSample]) -> Vec<SeverityLevel> {
    let in_phase = samples
        .iter()
        .filter(|sample| phase.contains_index(sample.waypoint_index));

    match phase.phase_type {
        PhaseType::EnRoute => in_phase
            .map(|sample| {
                let cruise = sample.reading.at_altitude(CRUISE_REFERENCE_FT);
                classify_wind(PhaseType::EnRoute, cruise.wind_speed_mph)
            })
            .collect(),
        PhaseType::Terminal => {
            let bands = terminal_sample_bands();
            in_phase
                .flat_map(|sample| {
                    bands.iter().map(move |band| {
                        let reading = sample
                            .reading
                            .at_altitude_surface_wind(band_sample_altitude(band));
                        classify_wind(PhaseType::Terminal, reading.wind_speed_mph)
                    })
                })
                .collect()
        }
    }
}

/// Apply an advisory recommendation to a phase's base severity.
///
/// Cruise adopts any higher recommendation; climb and descent move up by
/// at most one level.
pub fn apply_advisory_upgrade(
    phase_type: PhaseType,
    base: SeverityLevel,
    recommendation: Option<SeverityLevel>,
) -> SeverityLevel {
    match recommendation {
        Some(recommended) if recommended > base => match phase_type {
            PhaseType::EnRoute => recommended,
            PhaseType::Terminal => base.step_up(),
        },
        _ => base,
    }
}

/// Classify one phase from its weather samples and the advisories in play.
pub fn classify_phase(
    phase: &FlightPhase,
    samples: &[WeatherSample],
    advisories: &[AdvisoryRecord],
) -> PhaseAssessment {
    let raw_severities = raw_phase_severities(phase, samples);
    let base_severity = mode(&raw_severities).unwrap_or(SeverityLevel::Light);

    let outcome = match_advisories(advisories, MatchScope::phase(phase));
    let severity = apply_advisory_upgrade(phase.phase_type, base_severity, outcome.recommendation);

    PhaseAssessment {
        phase: phase.clone(),
        base_severity,
        severity,
        sample_count: raw_severities.len(),
        applicable_advisories: outcome.matches.len(),
        advisory_recommendation: outcome.recommendation,
        raw_severities,
    }
}
