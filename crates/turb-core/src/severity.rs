//! Turbulence severity scale and the numeric blend/bucket helpers.
//!
//! Every blend of several severities goes through the numeric scale:
//! map to 1..=5, combine, then bucket back with [`SeverityLevel::from_value`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete turbulence label, ordered from calmest to roughest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    #[serde(rename = "Light")]
    Light,
    #[serde(rename = "Light to Moderate")]
    LightToModerate,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Moderate to Severe")]
    ModerateToSevere,
    #[serde(rename = "Severe")]
    Severe,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 5] = [
        SeverityLevel::Light,
        SeverityLevel::LightToModerate,
        SeverityLevel::Moderate,
        SeverityLevel::ModerateToSevere,
        SeverityLevel::Severe,
    ];

    /// Numeric position on the 1..=5 scale.
    pub fn value(self) -> u8 {
        match self {
            SeverityLevel::Light => 1,
            SeverityLevel::LightToModerate => 2,
            SeverityLevel::Moderate => 3,
            SeverityLevel::ModerateToSevere => 4,
            SeverityLevel::Severe => 5,
        }
    }

    /// Bucket a blended numeric value back onto the scale.
    ///
    /// Upper bounds are inclusive: `1.2` is still `Light`, `1.21` is not.
    pub fn from_value(value: f64) -> Self {
        if value <= 1.2 {
            SeverityLevel::Light
        } else if value <= 2.2 {
            SeverityLevel::LightToModerate
        } else if value <= 3.2 {
            SeverityLevel::Moderate
        } else if value <= 4.2 {
            SeverityLevel::ModerateToSevere
        } else {
            SeverityLevel::Severe
        }
    }

    /// Advisory impact weight used when blending advisory severities.
    pub fn weight(self) -> f64 {
        match self {
            SeverityLevel::Light => 0.6,
            SeverityLevel::LightToModerate => 0.8,
            SeverityLevel::Moderate => 1.0,
            SeverityLevel::ModerateToSevere => 1.3,
            SeverityLevel::Severe => 1.5,
        }
    }

    /// Next level up, saturating at `Severe`.
    pub fn step_up(self) -> Self {
        match self {
            SeverityLevel::Light => SeverityLevel::LightToModerate,
            SeverityLevel::LightToModerate => SeverityLevel::Moderate,
            SeverityLevel::Moderate => SeverityLevel::ModerateToSevere,
            SeverityLevel::ModerateToSevere | SeverityLevel::Severe => SeverityLevel::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeverityLevel::Light => "Light",
            SeverityLevel::LightToModerate => "Light to Moderate",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::ModerateToSevere => "Moderate to Severe",
            SeverityLevel::Severe => "Severe",
        }
    }

    /// Parse a human label ("Light to Moderate") or a variant name ("LightToModerate").
    pub fn parse(value: &str) -> Option<Self> {
        let compact: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "light" => Some(SeverityLevel::Light),
            "lighttomoderate" => Some(SeverityLevel::LightToModerate),
            "moderate" => Some(SeverityLevel::Moderate),
            "moderatetosevere" => Some(SeverityLevel::ModerateToSevere),
            "severe" => Some(SeverityLevel::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weight-normalised mean of `(severity, weight)` pairs on the numeric scale.
///
/// Returns `None` when the total weight is not positive.
pub fn weighted_mean(entries: &[(SeverityLevel, f64)]) -> Option<f64> {
    let total_weight: f64 = entries
        .iter()
        .map(|(_, weight)| weight.max(0.0))
        .sum();
    if total_weight <= 0.0 || !total_weight.is_finite() {
        return None;
    }
    let weighted: f64 = entries
        .iter()
        .map(|(level, weight)| f64::from(level.value()) * weight.max(0.0))
        .sum();
    Some(weighted / total_weight)
}

/// Weighted mean bucketed back onto the scale.
pub fn blend(entries: &[(SeverityLevel, f64)]) -> Option<SeverityLevel> {
    weighted_mean(entries).map(SeverityLevel::from_value)
}

/// Most frequent level. Ties go to the level seen first.
pub fn mode(levels: &[SeverityLevel]) -> Option<SeverityLevel> {
    let mut counts = [0usize; 5];
    let mut first_seen = [usize::MAX; 5];
    for (idx, level) in levels.iter().enumerate() {
        let slot = usize::from(level.value() - 1);
        counts[slot] += 1;
        if first_seen[slot] == usize::MAX {
            first_seen[slot] = idx;
        }
    }

    let mut best: Option<(usize, usize, SeverityLevel)> = None;
    for level in SeverityLevel::ALL {
        let slot = usize::from(level.value() - 1);
        let count = counts[slot];
        if count == 0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_count, best_first, _)) => {
                count > best_count || (count == best_count && first_seen[slot] < best_first)
            }
        };
        if better {
            best = Some((count, first_seen[slot], level));
        }
    }
    best.map(|(_, _, level)| level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_scale_is_strictly_ordered() {
        for pair in SeverityLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].value() < pair[1].value());
        }
    }

    #[test]
    fn bucket_boundaries_are_inclusive() {
        assert_eq!(SeverityLevel::from_value(1.2), SeverityLevel::Light);
        assert_eq!(SeverityLevel::from_value(1.21), SeverityLevel::LightToModerate);
        assert_eq!(SeverityLevel::from_value(2.2), SeverityLevel::LightToModerate);
        assert_eq!(SeverityLevel::from_value(3.2), SeverityLevel::Moderate);
        assert_eq!(SeverityLevel::from_value(4.2), SeverityLevel::ModerateToSevere);
        assert_eq!(SeverityLevel::from_value(4.21), SeverityLevel::Severe);
    }

    #[test]
    fn every_level_buckets_to_itself() {
        for level in SeverityLevel::ALL {
            assert_eq!(SeverityLevel::from_value(f64::from(level.value())), level);
        }
    }

    #[test]
    fn dominant_higher_weight_never_drops_below_lower_input() {
        for low in SeverityLevel::ALL {
            for high in SeverityLevel::ALL.iter().copied().filter(|h| *h >= low) {
                let blended = blend(&[(low, 1.0), (high, 3.0)]).unwrap();
                assert!(blended >= low, "{low} + {high} blended to {blended}");
                assert!(blended <= high);
            }
        }
    }

    #[test]
    fn zero_weight_blend_is_none() {
        assert_eq!(blend(&[(SeverityLevel::Severe, 0.0)]), None);
        assert_eq!(blend(&[]), None);
    }

    #[test]
    fn mode_prefers_first_seen_on_tie() {
        let levels = [
            SeverityLevel::Moderate,
            SeverityLevel::Light,
            SeverityLevel::Light,
            SeverityLevel::Moderate,
        ];
        assert_eq!(mode(&levels), Some(SeverityLevel::Moderate));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn step_up_saturates() {
        assert_eq!(SeverityLevel::Light.step_up(), SeverityLevel::LightToModerate);
        assert_eq!(SeverityLevel::Severe.step_up(), SeverityLevel::Severe);
    }

    #[test]
    fn labels_round_trip_through_serde() {
        let json = serde_json::to_string(&SeverityLevel::ModerateToSevere).unwrap();
        assert_eq!(json, "\"Moderate to Severe\"");
        assert_eq!(
            SeverityLevel::parse("light to moderate"),
            Some(SeverityLevel::LightToModerate)
        );
        assert_eq!(SeverityLevel::parse("ModerateToSevere"), Some(SeverityLevel::ModerateToSevere));
    }
}
