//! Confidence scoring.
//!
//! The score keeps its stochastic shape: a random base, several random
//! uncertainty terms and, when advisories apply, a deterministic boost.
//! All randomness comes from an injected [`NoiseSource`] so tests can pin it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::models::{AdvisoryRecord, AltitudeBand};
use crate::severity::SeverityLevel;

pub const MIN_CONFIDENCE: f64 = 0.30;
pub const MAX_CONFIDENCE: f64 = 0.98;
/// Cap on the advisory boost plus its variation term.
pub const MAX_ADVISORY_BOOST: f64 = 0.45;

/// Uniform samples in `[0, 1)`.
pub trait NoiseSource: Send + Sync {
    fn unit(&self) -> f64;
}

/// Thread-local RNG; the production source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadNoise;

impl NoiseSource for ThreadNoise {
    fn unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible sequence from a seed.
#[derive(Debug)]
pub struct SeededNoise {
    rng: Mutex<StdRng>,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn unit(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random::<f64>()
    }
}

/// Returns the same value every call. `0.5` zeroes every centred term.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn unit(&self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    /// Final clamped, rounded score.
    pub value: f64,
    pub base: f64,
    /// Sum of all random uncertainty terms.
    pub noise: f64,
    /// Deterministic advisory boost after the cap.
    pub advisory_boost: f64,
}

/// Advisory inputs to the confidence boost.
#[derive(Debug, Clone, Copy)]
pub struct AdvisorySupport<'a> {
    pub advisories: &'a [AdvisoryRecord],
    /// Sum of the match weights for `advisories`.
    pub total_weight: f64,
}

fn severity_term(severity: SeverityLevel) -> f64 {
    match severity {
        SeverityLevel::Light => 0.05,
        SeverityLevel::Moderate => 0.10,
        SeverityLevel::Severe => 0.20,
        _ => 0.08,
    }
}

/// Share of the 25,000-45,000 ft cruise envelope an advisory covers.
fn altitude_coverage(band: &AltitudeBand) -> f64 {
    ((band.max_ft.min(45_000.0) - band.min_ft.max(25_000.0)) / 20_000.0).clamp(0.0, 1.0)
}

fn area_specificity(area_label: &str) -> f64 {
    if area_label.contains("Central United States") || area_label.contains("Eastern United States") {
        0.08
    } else if area_label.contains("United States") {
        0.05
    } else {
        0.03
    }
}

fn count_term(count: usize) -> f64 {
    match count {
        0 | 1 => 0.02,
        2 => 0.05,
        _ => 0.08,
    }
}

fn mean<I: Iterator<Item = f64>>(values: I, count: usize) -> f64 {
    values.sum::<f64>() / count as f64
}

/// Deterministic part of the advisory boost, before the cap.
pub fn advisory_boost(support: &AdvisorySupport<'_>) -> f64 {
    let count = support.advisories.len();
    if count == 0 {
        return 0.0;
    }
    let avg_weight = support.total_weight / count as f64;
    let base = 0.15 + avg_weight * 0.15;

    let severity = mean(support.advisories.iter().map(|a| severity_term(a.severity)), count);
    let coverage = mean(support.advisories.iter().map(|a| altitude_coverage(&a.altitude)), count);
    let specificity = mean(support.advisories.iter().map(|a| area_specificity(&a.area_label)), count);

    base + severity + coverage * 0.12 + specificity + count_term(count)
}

fn centred(noise: &dyn NoiseSource, span: f64) -> f64 {
    (noise.unit() - 0.5) * span
}

/// Score the assessment, drawing every random term from `noise`.
pub fn estimate_confidence(
    support: Option<AdvisorySupport<'_>>,
    noise: &dyn NoiseSource,
) -> ConfidenceBreakdown {
    let base = 0.35 + noise.unit() * 0.4;
    let mut random = centred(noise, 0.20);
    let mut boost = 0.0;

    match support.filter(|s| !s.advisories.is_empty()) {
        Some(support) => {
            let freshness = noise.unit() * 0.05;
            let variation = centred(noise, 0.08);
            let deterministic = advisory_boost(&support);
            let applied = (deterministic + freshness + variation).min(MAX_ADVISORY_BOOST);
            boost = applied.min(deterministic).max(0.0);
            random += applied - boost;
        }
        None => random += centred(noise, 0.15),
    }

    for span in [0.20, 0.18, 0.16, 0.14] {
        random += centred(noise, span);
    }

    let raw = (base + random + boost).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    ConfidenceBreakdown {
        value: (raw * 100.0).round() / 100.0,
        base,
        noise: random,
        advisory_boost: boost,
    }
}
