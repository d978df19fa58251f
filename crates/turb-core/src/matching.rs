//! Advisory applicability gating and severity recommendation.
//!
//! An advisory contributes to a scope (the whole route or one phase) only
//! when the scope touches US airspace, its altitude band overlaps the
//! scope's reference band, and it lies over the scope geometrically (or by
//! named region when it carries no polygon).

use serde::{Deserialize, Serialize};

use crate::models::{AdvisoryRecord, AltitudeBand, FlightPhase, Waypoint};
use crate::regions::{any_in_us_coverage, area_matches_region, region_for_points};
use crate::severity::{blend, SeverityLevel};
use crate::spatial::point_in_polygon;

/// Reference band for whole-route matching (union of the phase bands).
pub const ROUTE_REFERENCE_BAND: AltitudeBand = AltitudeBand {
    min_ft: 0.0,
    max_ft: 40_000.0,
};

/// Waypoints and reference altitude band an advisory is matched against.
#[derive(Debug, Clone, Copy)]
pub struct MatchScope<'a> {
    pub waypoints: &'a [Waypoint],
    pub reference: AltitudeBand,
}

impl<'a> MatchScope<'a> {
    pub fn route(waypoints: &'a [Waypoint]) -> Self {
        Self {
            waypoints,
            reference: ROUTE_REFERENCE_BAND,
        }
    }

    pub fn phase(phase: &'a FlightPhase) -> Self {
        Self {
            waypoints: &phase.waypoints,
            reference: phase.altitude_band,
        }
    }
}

/// How the horizontal gate was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// A waypoint lies inside the advisory polygon.
    Polygon,
    /// No polygon; the area label matched the scope's region label.
    Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryMatch {
    /// Index into the advisory slice that was matched.
    pub index: usize,
    pub kind: MatchKind,
    pub overlap_fraction: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub in_coverage: bool,
    pub matches: Vec<AdvisoryMatch>,
    pub total_weight: f64,
    /// Weighted blend of matched severities; `None` when nothing carries weight.
    pub recommendation: Option<SeverityLevel>,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Matched advisories, cloned out of `advisories` in match order.
    pub fn records(&self, advisories: &[AdvisoryRecord]) -> Vec<AdvisoryRecord> {
        self.matches
            .iter()
            .filter_map(|m| advisories.get(m.index).cloned())
            .collect()
    }
}

/// Horizontal gate for one advisory.
fn horizontal_match(
    advisory: &AdvisoryRecord,
    waypoints: &[Waypoint],
    region: &str,
) -> Option<MatchKind> {
    if advisory.has_polygon() {
        waypoints
            .iter()
            .any(|wp| point_in_polygon(wp.lat, wp.lon, &advisory.polygon))
            .then_some(MatchKind::Polygon)
    } else {
        area_matches_region(&advisory.area_label, region).then_some(MatchKind::Region)
    }
}

/// Run every gate over `advisories` and blend the survivors.
pub fn match_advisories(advisories: &[AdvisoryRecord], scope: MatchScope<'_>) -> MatchOutcome {
    if scope.waypoints.is_empty() || !any_in_us_coverage(scope.waypoints) {
        return MatchOutcome::default();
    }

    let region = region_for_points(scope.waypoints);
    let matches: Vec<AdvisoryMatch> = advisories
        .iter()
        .enumerate()
        .filter(|(_, advisory)| advisory.hazard_type.affects_turbulence())
        .filter(|(_, advisory)| advisory.altitude.overlaps(&scope.reference))
        .filter_map(|(index, advisory)| {
            let kind = horizontal_match(advisory, scope.waypoints, region)?;
            let overlap_fraction = advisory.altitude.overlap_fraction(&scope.reference);
            Some(AdvisoryMatch {
                index,
                kind,
                overlap_fraction,
                weight: advisory.severity.weight() * overlap_fraction,
            })
        })
        .collect();

    let weighted: Vec<(SeverityLevel, f64)> = matches
        .iter()
        .map(|m| (advisories[m.index].severity, m.weight))
        .collect();

    MatchOutcome {
        in_coverage: true,
        total_weight: weighted.iter().map(|(_, w)| w).sum(),
        recommendation: blend(&weighted),
        matches,
    }
}
