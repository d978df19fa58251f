//! Passenger-facing text derived from a finished assessment.
//!
//! Nothing here feeds back into severity or confidence.

use serde::{Deserialize, Serialize};

use crate::models::{HazardType, RouteAssessment, WeatherSample};
use crate::severity::SeverityLevel;

/// Average block speed used for duration estimates.
pub const AVERAGE_SPEED_MPH: f64 = 500.0;
/// Routes longer than this get the long-flight recommendation.
pub const LONG_FLIGHT_MILES: f64 = 2_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub text: String,
}

impl Recommendation {
    fn new(category: &str, text: &str) -> Self {
        Self {
            category: category.to_string(),
            text: text.to_string(),
        }
    }
}

/// Format an estimated duration: `"45m"`, `"5h"`, `"5h 12m"`.
pub fn estimate_flight_time(distance_miles: f64) -> String {
    let total_minutes = (distance_miles.max(0.0) / AVERAGE_SPEED_MPH * 60.0).round() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

fn severity_factors(severity: SeverityLevel) -> [&'static str; 3] {
    match severity {
        SeverityLevel::Light => [
            "Stable high-altitude atmospheric conditions",
            "Normal cruising winds at 30,000+ feet",
            "Smooth flying conditions expected",
        ],
        SeverityLevel::LightToModerate => [
            "Some wind variations at cruising altitude",
            "Minor atmospheric instability",
            "Generally comfortable flying conditions",
        ],
        SeverityLevel::Moderate => [
            "Moderate wind speeds at cruising altitude",
            "Some atmospheric instability present",
            "Passengers may notice some movement",
        ],
        SeverityLevel::ModerateToSevere => [
            "Strong wind patterns at cruising altitude",
            "Significant atmospheric instability",
            "Pilots may consider route adjustments",
        ],
        SeverityLevel::Severe => [
            "High wind speeds and severe turbulence",
            "Major atmospheric disturbances",
            "Route diversion recommended if possible",
        ],
    }
}

fn flight_level(feet: f64) -> i64 {
    (feet / 100.0).round() as i64
}

/// Rule-based factors behind the route severity.
pub fn turbulence_factors(assessment: &RouteAssessment) -> Vec<String> {
    let mut factors: Vec<String> = severity_factors(assessment.route_severity)
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !assessment.has_advisories {
        factors.push(
            "No active G-AIRMET advisories (prediction based on weather models only)".to_string(),
        );
        return factors;
    }

    factors.push("Official G-AIRMET turbulence advisory in effect".to_string());
    if let Some(recommended) = assessment.advisory_recommendation {
        factors.push(format!("G-AIRMET analysis indicates {recommended} turbulence"));
    }
    for advisory in assessment
        .contributing_advisories
        .iter()
        .filter(|a| a.hazard_type == HazardType::Turbulence)
    {
        factors.push(format!(
            "G-AIRMET: {} turbulence in {} at FL{}-FL{}",
            advisory.severity,
            advisory.area_label,
            flight_level(advisory.altitude.min_ft),
            flight_level(advisory.altitude.max_ft)
        ));
    }

    let quality = if assessment.advisory_total_weight > 2.0 {
        "High-confidence G-AIRMET data (multiple high-quality advisories)"
    } else if assessment.advisory_total_weight > 1.5 {
        "Medium-confidence G-AIRMET data (good advisory coverage)"
    } else {
        "Limited G-AIRMET coverage (fewer advisories)"
    };
    factors.push(quality.to_string());
    factors
}

/// Passenger recommendations for the final severity.
pub fn recommendations(
    severity: SeverityLevel,
    distance_miles: f64,
    has_advisories: bool,
) -> Vec<Recommendation> {
    let mut items = vec![
        Recommendation::new(
            "Flight Info",
            "Your pilots are highly trained professionals who handle these conditions daily",
        ),
        Recommendation::new(
            "Safety",
            "Keep your seatbelt fastened when seated - this is standard safety practice",
        ),
    ];

    let level_items: &[(&str, &str)] = match severity {
        SeverityLevel::Light => &[
            ("What to Expect", "You may feel gentle movements - similar to driving on a slightly bumpy road"),
            ("Hydration", "Stay hydrated - this helps with any minor motion sensitivity"),
        ],
        SeverityLevel::LightToModerate => &[
            ("What to Expect", "Some noticeable movement - like driving on a country road with occasional bumps"),
            ("Comfort", "Listening to music or podcasts can help you relax during any bumps"),
        ],
        SeverityLevel::Moderate => &[
            ("What to Expect", "Moderate movement - similar to driving on a gravel road. This is normal and safe"),
            ("Relaxation", "Practice deep breathing - turbulence is temporary and your pilots are in control"),
            ("Distraction", "Reading or watching content can help take your mind off any movement"),
        ],
        SeverityLevel::ModerateToSevere => &[
            ("What to Expect", "More noticeable movement - like driving on a rough road. Still completely safe"),
            ("Pilot Expertise", "Your pilots may adjust altitude or route to find smoother air"),
            ("Comfort", "Focus on the fact that millions of flights handle this safely every day"),
        ],
        SeverityLevel::Severe => &[
            ("What to Expect", "Significant movement - pilots will actively work to minimize this"),
            ("Pilot Actions", "Your pilots will likely change altitude or route to find calmer conditions"),
            ("Safety First", "This is why we predict turbulence - so pilots can plan accordingly"),
        ],
    };
    items.extend(level_items.iter().map(|(c, t)| Recommendation::new(c, t)));

    if distance_miles > LONG_FLIGHT_MILES {
        items.push(Recommendation::new(
            "Long Flight",
            "On longer flights, pilots have more options to find optimal routes",
        ));
    }
    if has_advisories {
        items.push(Recommendation::new(
            "Advanced Warning",
            "G-AIRMET data gives pilots early warning to plan optimal routes",
        ));
    }
    items.push(Recommendation::new(
        "Remember",
        "Turbulence is normal weather - like bumps in the road. Airplanes are designed to handle all levels of turbulence",
    ));
    items
}

/// Everything the narrative generator is allowed to see.
///
/// `final_severity` is already decided; the generator only describes it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeContext {
    pub departure_code: String,
    pub departure_name: String,
    pub arrival_code: String,
    pub arrival_name: String,
    pub final_severity: SeverityLevel,
    pub distance_miles: f64,
    pub weather: Vec<WeatherSample>,
    pub advisory_lines: Vec<String>,
}

impl NarrativeContext {
    /// One line per contributing advisory for prompt embedding.
    pub fn describe_advisories(assessment: &RouteAssessment) -> Vec<String> {
        assessment
            .contributing_advisories
            .iter()
            .map(|a| {
                format!(
                    "{} ({}) {} in {} FL{}-FL{}",
                    a.raw_hazard,
                    match a.hazard_type {
                        HazardType::Turbulence => "turbulence",
                        HazardType::MountainWave => "mountain wave",
                        HazardType::Icing => "icing",
                        HazardType::LowLevelWindShear => "low-level wind shear",
                        HazardType::Unknown => "other",
                    },
                    a.severity,
                    a.area_label,
                    flight_level(a.altitude.min_ft),
                    flight_level(a.altitude.max_ft)
                )
            })
            .collect()
    }
}
