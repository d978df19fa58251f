//! Surface weather provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use turb_core::WeatherReading;

use crate::error::FeedError;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current surface reading at a coordinate (mph, degrees F, hPa).
    async fn sample(&self, lat: f64, lon: f64) -> Result<WeatherReading, FeedError>;
}

/// OpenWeather current-weather client, imperial units.
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherResponse {
    #[serde(default)]
    wind: Option<OpenWeatherWind>,
    #[serde(default)]
    main: Option<OpenWeatherMain>,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherWind {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherMain {
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherCondition {
    description: Option<String>,
}

impl OpenWeatherResponse {
    fn into_reading(self) -> WeatherReading {
        let main = self.main.unwrap_or_default();
        WeatherReading {
            wind_speed_mph: self.wind.and_then(|w| w.speed).unwrap_or(0.0),
            temperature_f: main.temp.unwrap_or(0.0),
            humidity_pct: main.humidity.unwrap_or(0.0),
            pressure_hpa: main.pressure.unwrap_or(0.0),
            description: self
                .weather
                .into_iter()
                .next()
                .and_then(|c| c.description)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

impl OpenWeatherClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

pub(crate) fn map_send_error(err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::Timeout
    } else {
        FeedError::Http(err)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn sample(&self, lat: f64, lon: f64) -> Result<WeatherReading, FeedError> {
        if self.api_key.trim().is_empty() {
            return Err(FeedError::NotConfigured("OPENWEATHER_API_KEY"));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", format!("{lat:.4}")),
                ("lon", format!("{lon:.4}")),
                ("appid", self.api_key.clone()),
                ("units", "imperial".to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let payload: OpenWeatherResponse = response
            .json()
            .await
            .map_err(|err| FeedError::Parse(err.to_string()))?;
        Ok(payload.into_reading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn missing_fields_default() {
        let reading = OpenWeatherResponse::default().into_reading();
        assert_eq!(reading.wind_speed_mph, 0.0);
        assert_eq!(reading.description, "Unknown");
    }

    #[tokio::test]
    async fn sample_requests_imperial_units() {
        let router = Router::new().route(
            "/weather",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("units").map(String::as_str), Some("imperial"));
                assert_eq!(params.get("appid").map(String::as_str), Some("k"));
                Json(serde_json::json!({
                    "wind": {"speed": 12.5},
                    "main": {"temp": 68.0, "humidity": 40, "pressure": 1012},
                    "weather": [{"description": "scattered clouds"}]
                }))
            }),
        );
        let base = serve(router).await;
        let client = OpenWeatherClient::new(Client::new(), format!("{base}/weather"), "k", Duration::from_secs(2));

        let reading = client.sample(40.64, -73.78).await.unwrap();
        assert_eq!(reading.wind_speed_mph, 12.5);
        assert_eq!(reading.humidity_pct, 40.0);
        assert_eq!(reading.description, "scattered clouds");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let router = Router::new().route("/weather", get(|| async { StatusCode::UNAUTHORIZED }));
        let base = serve(router).await;
        let client = OpenWeatherClient::new(Client::new(), format!("{base}/weather"), "bad", Duration::from_secs(2));
        assert!(matches!(client.sample(0.0, 0.0).await, Err(FeedError::Status(401))));
    }

    #[tokio::test]
    async fn empty_key_is_not_configured() {
        let client = OpenWeatherClient::new(Client::new(), "http://127.0.0.1:9", "", Duration::from_secs(1));
        assert!(matches!(client.sample(0.0, 0.0).await, Err(FeedError::NotConfigured(_))));
    }
}
