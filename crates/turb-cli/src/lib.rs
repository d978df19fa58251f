//! Turb CLI - command line client for the turbulence prediction server.
//!
//! Binaries:
//! - predict_route: request a route prediction and print a summary

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Write;
use std::time::Duration;

use turb_core::{RouteAssessment, SeverityLevel};

#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub code: String,
    pub name: String,
}

/// The parts of a route report the CLI prints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub departure: Endpoint,
    pub arrival: Endpoint,
    pub distance_miles: f64,
    pub estimated_duration: String,
    pub turbulence_level: SeverityLevel,
    pub confidence: f64,
    pub assessment: RouteAssessment,
    #[serde(default)]
    pub narrative: Option<String>,
    pub generated_at: DateTime<Utc>,
}

pub fn predict_url(server: &str) -> String {
    format!("{}/v1/turbulence/predict", server.trim_end_matches('/'))
}

/// POST a prediction request and return the raw JSON body.
pub fn request_prediction(server: &str, departure: &str, arrival: &str) -> Result<Value> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?;
    let response = client
        .post(predict_url(server))
        .json(&json!({ "departure": departure, "arrival": arrival }))
        .send()
        .with_context(|| format!("failed to reach {server}"))?;

    let status = response.status();
    let body: Value = response.json().context("server returned non-JSON body")?;
    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        let details = body
            .get("details")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default();
        if details.is_empty() {
            bail!("{status}: {message}");
        }
        bail!("{status}: {message} ({details})");
    }
    Ok(body)
}

pub fn format_summary(prediction: &Prediction) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}) -> {} ({})",
        prediction.departure.code,
        prediction.departure.name,
        prediction.arrival.code,
        prediction.arrival.name
    );
    let _ = writeln!(
        out,
        "  Distance: {:.0} mi, est. {}",
        prediction.distance_miles, prediction.estimated_duration
    );
    for phase in &prediction.assessment.phases {
        let _ = writeln!(
            out,
            "  {:<8} {:<20} ({} samples, {} advisories)",
            format!("{:?}", phase.phase.name),
            phase.severity.to_string(),
            phase.sample_count,
            phase.applicable_advisories
        );
    }
    let _ = writeln!(out, "  Route severity: {}", prediction.turbulence_level);
    let _ = writeln!(out, "  Confidence: {:.0}%", prediction.confidence * 100.0);
    let _ = writeln!(
        out,
        "  Advisories: {}",
        prediction.assessment.contributing_advisories.len()
    );
    if let Some(narrative) = &prediction.narrative {
        let _ = writeln!(out);
        let _ = writeln!(out, "{narrative}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> Value {
        json!({
            "id": "jfk-lax",
            "departure": {"code": "JFK", "name": "John F. Kennedy International Airport", "city": "New York", "country": "United States", "lat": 40.6413, "lon": -73.7781},
            "arrival": {"code": "LAX", "name": "Los Angeles International Airport", "city": "Los Angeles", "country": "United States", "lat": 33.9416, "lon": -118.4085},
            "distanceMiles": 2475.0,
            "estimatedDuration": "4h 57m",
            "turbulenceLevel": "Light",
            "confidence": 0.55,
            "assessment": {
                "phases": [{
                    "phase": {
                        "name": "Cruise",
                        "startIndex": 3,
                        "waypoints": [],
                        "altitudeBand": {"minFt": 30000.0, "maxFt": 40000.0},
                        "phaseType": "en_route"
                    },
                    "baseSeverity": "Light",
                    "severity": "Light",
                    "sampleCount": 10,
                    "applicableAdvisories": 0,
                    "advisoryRecommendation": null
                }],
                "routeSeverity": "Light",
                "populationSeverity": "Light",
                "confidence": 0.55,
                "confidenceBreakdown": {"value": 0.55, "base": 0.5, "noise": 0.05, "advisoryBoost": 0.0},
                "contributingAdvisories": [],
                "advisoryRecommendation": null,
                "advisoryTotalWeight": 0.0,
                "hasAdvisories": false
            },
            "narrative": null,
            "generatedAt": "2026-10-16T12:00:00Z"
        })
    }

    #[test]
    fn summary_lists_phases_and_route() {
        let prediction: Prediction = serde_json::from_value(sample_body()).unwrap();
        let summary = format_summary(&prediction);
        assert!(summary.starts_with("JFK (John F. Kennedy International Airport) -> LAX"));
        assert!(summary.contains("Cruise"));
        assert!(summary.contains("Route severity: Light"));
        assert!(summary.contains("Confidence: 55%"));
        assert!(summary.contains("Advisories: 0"));
    }

    #[test]
    fn predict_url_joins_cleanly() {
        assert_eq!(
            predict_url("http://localhost:3000/"),
            "http://localhost:3000/v1/turbulence/predict"
        );
    }
}
