//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use turb_core::DEFAULT_WAYPOINT_COUNT;
use turb_feeds::{DEFAULT_ADVISORY_ENDPOINTS, DEFAULT_NARRATIVE_MODEL};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub openweather_api_key: String,
    pub weather_base_url: String,
    pub weather_timeout_s: u64,
    /// Weather calls in flight at once, clamped to 3..=5.
    pub weather_concurrency: usize,
    pub advisory_endpoints: Vec<String>,
    pub advisory_timeout_s: u64,
    pub advisory_overall_timeout_s: u64,
    pub advisory_hours: u32,
    pub narrative_endpoint: String,
    /// Narrative generation is skipped when unset.
    pub narrative_api_key: Option<String>,
    pub narrative_model: String,
    pub narrative_timeout_s: u64,
    pub waypoint_count: usize,
    pub airports_csv_path: Option<String>,
    pub airport_cache_ttl_s: u64,
    pub airport_cache_max_entries: usize,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("TURB_PORT", 3000),
            openweather_api_key: env::var("OPENWEATHER_API_KEY").unwrap_or_default(),
            weather_base_url: env::var("WEATHER_BASE_URL").unwrap_or_else(|_| {
                "https://api.openweathermap.org/data/2.5/weather".to_string()
            }),
            weather_timeout_s: env_or("WEATHER_TIMEOUT_S", 8),
            weather_concurrency: env_or("WEATHER_CONCURRENCY", 5usize).clamp(3, 5),
            advisory_endpoints: env_opt("ADVISORY_ENDPOINTS")
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|| {
                    DEFAULT_ADVISORY_ENDPOINTS
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
            advisory_timeout_s: env_or("ADVISORY_TIMEOUT_S", 5),
            advisory_overall_timeout_s: env_or("ADVISORY_OVERALL_TIMEOUT_S", 8),
            advisory_hours: env_or("ADVISORY_HOURS", 6),
            narrative_endpoint: env::var("NARRATIVE_ENDPOINT").unwrap_or_else(|_| {
                "https://api.openai.com/v1/chat/completions".to_string()
            }),
            narrative_api_key: env_opt("NARRATIVE_API_KEY"),
            narrative_model: env::var("NARRATIVE_MODEL")
                .unwrap_or_else(|_| DEFAULT_NARRATIVE_MODEL.to_string()),
            narrative_timeout_s: env_or("NARRATIVE_TIMEOUT_S", 25),
            waypoint_count: env_or("WAYPOINT_COUNT", DEFAULT_WAYPOINT_COUNT).max(1),
            airports_csv_path: env_opt("AIRPORTS_CSV_PATH"),
            airport_cache_ttl_s: env_or("AIRPORT_CACHE_TTL_S", 86_400),
            airport_cache_max_entries: env_or("AIRPORT_CACHE_MAX_ENTRIES", 1024),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_lists_drop_blanks() {
        assert_eq!(
            split_list(" https://a.example/x , ,https://b.example/y"),
            vec!["https://a.example/x".to_string(), "https://b.example/y".to_string()]
        );
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::from_env();
        assert!((3..=5).contains(&config.weather_concurrency));
        assert!(config.waypoint_count >= 1);
        assert!(!config.advisory_endpoints.is_empty());
    }
}
