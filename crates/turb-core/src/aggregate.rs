//! Route-level severity aggregation.
//!
//! Two paths are kept side by side: the phase-weighted blend is what the
//! route reports, the population path is retained for diagnostics and for
//! callers that still compare against it.

use crate::models::PhaseAssessment;
use crate::severity::{blend, mode, SeverityLevel};

const SEVERE_SHARE: f64 = 0.2;
const MODERATE_TO_SEVERE_SHARE: f64 = 0.3;
const MODERATE_SHARE: f64 = 0.4;

/// Mode of every pooled raw severity, escalated by population share.
///
/// `None` when there is nothing to pool.
pub fn population_severity(raw: &[SeverityLevel]) -> Option<SeverityLevel> {
    let most_common = mode(raw)?;
    let total = raw.len() as f64;
    let share = |min: SeverityLevel| raw.iter().filter(|s| **s >= min).count() as f64 / total;

    let escalated = if share(SeverityLevel::Severe) > SEVERE_SHARE {
        SeverityLevel::Severe
    } else if share(SeverityLevel::ModerateToSevere) > MODERATE_TO_SEVERE_SHARE {
        SeverityLevel::ModerateToSevere
    } else if share(SeverityLevel::Moderate) > MODERATE_SHARE {
        SeverityLevel::Moderate
    } else {
        most_common
    };
    Some(escalated)
}

/// Legacy blend of a route-scope advisory recommendation into the
/// population severity.
///
/// Upgrades out of the two lowest levels are deliberately easier than
/// anywhere else on the scale.
pub fn blend_population_with_advisory(
    current: SeverityLevel,
    recommendation: Option<SeverityLevel>,
) -> SeverityLevel {
    let Some(recommended) = recommendation else {
        return current;
    };
    let current_value = f64::from(current.value());
    let recommended_value = f64::from(recommended.value());

    let adopt = match current {
        SeverityLevel::Light => recommended > current,
        SeverityLevel::LightToModerate if recommended >= SeverityLevel::Moderate => true,
        _ => {
            recommended_value > current_value + 0.2 || recommended_value < current_value - 0.8
        }
    };
    if adopt {
        recommended
    } else {
        current
    }
}

/// Phase severities blended by assumed share of flight time.
pub fn phase_weighted_severity(phases: &[PhaseAssessment]) -> Option<SeverityLevel> {
    let entries: Vec<(SeverityLevel, f64)> = phases
        .iter()
        .map(|p| (p.severity, p.phase.name.time_share()))
        .collect();
    blend(&entries)
}
