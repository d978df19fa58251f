//! Per-request route pipeline: resolve, sample, fetch, assess, narrate.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use turb_core::regions::any_in_us_coverage;
use turb_core::{
    assess_route, distance_miles, estimate_flight_time, generate_great_circle_path,
    recommendations, split_at_antimeridian, turbulence_factors, AdvisoryRecord,
    NarrativeContext, NoiseSource, Recommendation, RouteAssessment, RouteError, SeverityLevel,
    ThreadNoise, Waypoint, WeatherSample,
};
use turb_feeds::{AdvisoryFeed, NarrativeGenerator, WeatherProvider, ALL_REGIONS};

use crate::airports::{Airport, AirportResolver};
use crate::config::Config;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Airport not found: {0}")]
    AirportNotFound(String),
    #[error("invalid route: {0}")]
    InvalidRoute(#[from] RouteError),
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub waypoint_count: usize,
    pub weather_concurrency: usize,
    pub weather_timeout: Duration,
    pub advisory_hours: u32,
    pub advisory_timeout: Duration,
    pub narrative_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            waypoint_count: config.waypoint_count.max(1),
            weather_concurrency: config.weather_concurrency.clamp(3, 5),
            weather_timeout: Duration::from_secs(config.weather_timeout_s),
            advisory_hours: config.advisory_hours,
            advisory_timeout: Duration::from_secs(config.advisory_overall_timeout_s),
            narrative_timeout: Duration::from_secs(config.narrative_timeout_s),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            waypoint_count: turb_core::DEFAULT_WAYPOINT_COUNT,
            weather_concurrency: 5,
            weather_timeout: Duration::from_secs(8),
            advisory_hours: 6,
            advisory_timeout: Duration::from_secs(8),
            narrative_timeout: Duration::from_secs(25),
        }
    }
}

/// Response body for a generated route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteReport {
    pub id: String,
    pub departure: Airport,
    pub arrival: Airport,
    pub distance_miles: f64,
    pub estimated_duration: String,
    pub waypoints: Vec<Waypoint>,
    /// `waypoints` split wherever the path crosses the antimeridian, for map display.
    pub display_segments: Vec<Vec<Waypoint>>,
    pub weather: Vec<WeatherSample>,
    pub turbulence_level: SeverityLevel,
    pub confidence: f64,
    /// Route severity from weather alone, before any advisory upgrade.
    pub weather_only_level: SeverityLevel,
    pub assessment: RouteAssessment,
    pub factors: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub narrative: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// `"jfk-lax"` style identifier.
pub fn route_id(departure: &str, arrival: &str) -> String {
    format!(
        "{}-{}",
        departure.trim().to_ascii_lowercase(),
        arrival.trim().to_ascii_lowercase()
    )
}

/// Split a `"dep-arr"` identifier back into its two codes.
pub fn parse_route_id(id: &str) -> Option<(String, String)> {
    let (dep, arr) = id.split_once('-')?;
    let (dep, arr) = (dep.trim(), arr.trim());
    if dep.is_empty() || arr.is_empty() || arr.contains('-') {
        return None;
    }
    Some((dep.to_ascii_uppercase(), arr.to_ascii_uppercase()))
}

pub struct RoutePipeline {
    airports: Arc<dyn AirportResolver>,
    weather: Arc<dyn WeatherProvider>,
    advisories: Arc<dyn AdvisoryFeed>,
    narrator: Option<Arc<dyn NarrativeGenerator>>,
    noise: Arc<dyn NoiseSource>,
    settings: PipelineSettings,
}

impl RoutePipeline {
    pub fn new(
        airports: Arc<dyn AirportResolver>,
        weather: Arc<dyn WeatherProvider>,
        advisories: Arc<dyn AdvisoryFeed>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            airports,
            weather,
            advisories,
            narrator: None,
            noise: Arc::new(ThreadNoise),
            settings,
        }
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn with_noise(mut self, noise: Arc<dyn NoiseSource>) -> Self {
        self.noise = noise;
        self
    }

    pub fn airports(&self) -> &Arc<dyn AirportResolver> {
        &self.airports
    }

    pub async fn generate_route(
        &self,
        departure: &str,
        arrival: &str,
    ) -> Result<RouteReport, PipelineError> {
        let dep = self
            .airports
            .resolve(departure)
            .ok_or_else(|| PipelineError::AirportNotFound(departure.trim().to_ascii_uppercase()))?;
        let arr = self
            .airports
            .resolve(arrival)
            .ok_or_else(|| PipelineError::AirportNotFound(arrival.trim().to_ascii_uppercase()))?;

        tracing::info!(departure = %dep.code, arrival = %arr.code, "generating route");

        let waypoints = generate_great_circle_path(
            Waypoint::new(dep.lat, dep.lon),
            Waypoint::new(arr.lat, arr.lon),
            self.settings.waypoint_count,
        )?;

        let (weather, advisories) =
            tokio::join!(self.sample_weather(&waypoints), self.fetch_advisories(&waypoints));

        let assessment = assess_route(&waypoints, &weather, &advisories, self.noise.as_ref());
        let weather_only = assess_route(&waypoints, &weather, &[], self.noise.as_ref());

        for phase in &assessment.phases {
            tracing::debug!(
                phase = ?phase.phase.name,
                base = %phase.base_severity,
                severity = %phase.severity,
                samples = phase.sample_count,
                advisories = phase.applicable_advisories,
                "phase classified"
            );
        }

        let distance = distance_miles(dep.lat, dep.lon, arr.lat, arr.lon);
        let narrative = self
            .narrate(&dep, &arr, &assessment, distance, &weather)
            .await;

        tracing::info!(
            route = %route_id(&dep.code, &arr.code),
            severity = %assessment.route_severity,
            confidence = assessment.confidence,
            samples = weather.len(),
            advisories = assessment.contributing_advisories.len(),
            "route generated"
        );

        Ok(RouteReport {
            id: route_id(&dep.code, &arr.code),
            distance_miles: distance.round(),
            estimated_duration: estimate_flight_time(distance),
            turbulence_level: assessment.route_severity,
            confidence: assessment.confidence,
            weather_only_level: weather_only.route_severity,
            factors: turbulence_factors(&assessment),
            recommendations: recommendations(
                assessment.route_severity,
                distance,
                assessment.has_advisories,
            ),
            departure: dep,
            arrival: arr,
            display_segments: split_at_antimeridian(&waypoints),
            waypoints,
            weather,
            assessment,
            narrative,
            generated_at: Utc::now(),
        })
    }

    /// Sample every waypoint in batches; failed or slow samples are dropped.
    async fn sample_weather(&self, waypoints: &[Waypoint]) -> Vec<WeatherSample> {
        let mut samples = Vec::with_capacity(waypoints.len());
        let indexed: Vec<(usize, Waypoint)> = waypoints.iter().copied().enumerate().collect();

        for batch in indexed.chunks(self.settings.weather_concurrency.max(1)) {
            let calls = batch.iter().map(|(index, point)| async move {
                let result = timeout(
                    self.settings.weather_timeout,
                    self.weather.sample(point.lat, point.lon),
                )
                .await;
                (*index, *point, result)
            });

            for (index, point, result) in join_all(calls).await {
                match result {
                    Ok(Ok(reading)) => samples.push(WeatherSample {
                        waypoint_index: index,
                        lat: point.lat,
                        lon: point.lon,
                        reading,
                    }),
                    Ok(Err(err)) => {
                        tracing::warn!(index, lat = point.lat, lon = point.lon, error = %err, "weather sample failed");
                    }
                    Err(_) => {
                        tracing::warn!(index, lat = point.lat, lon = point.lon, "weather sample timed out");
                    }
                }
            }
        }

        samples
    }

    async fn fetch_advisories(&self, waypoints: &[Waypoint]) -> Vec<AdvisoryRecord> {
        if !any_in_us_coverage(waypoints) {
            tracing::debug!("route outside advisory coverage, skipping fetch");
            return Vec::new();
        }

        match timeout(
            self.settings.advisory_timeout,
            self.advisories.fetch(ALL_REGIONS, self.settings.advisory_hours),
        )
        .await
        {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "advisory fetch failed, continuing without advisories");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_s = self.settings.advisory_timeout.as_secs(),
                    "advisory fetch timed out, continuing without advisories"
                );
                Vec::new()
            }
        }
    }

    async fn narrate(
        &self,
        departure: &Airport,
        arrival: &Airport,
        assessment: &RouteAssessment,
        distance: f64,
        weather: &[WeatherSample],
    ) -> Option<String> {
        let narrator = self.narrator.as_ref()?;
        let context = NarrativeContext {
            departure_code: departure.code.clone(),
            departure_name: departure.name.clone(),
            arrival_code: arrival.code.clone(),
            arrival_name: arrival.name.clone(),
            final_severity: assessment.route_severity,
            distance_miles: distance.round(),
            weather: weather.to_vec(),
            advisory_lines: NarrativeContext::describe_advisories(assessment),
        };

        match timeout(self.settings.narrative_timeout, narrator.summarize(&context)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "narrative generation failed");
                None
            }
            Err(_) => {
                tracing::warn!("narrative generation timed out");
                None
            }
        }
    }
}
