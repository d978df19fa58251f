//! Hazard advisory feed with an ordered endpoint fallback chain.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use turb_core::{parse_feed, AdvisoryRecord};

use crate::error::FeedError;
use crate::weather::map_send_error;

/// Region name the aviation weather service uses for the whole feed.
pub const ALL_REGIONS: &str = "all";

pub const DEFAULT_ADVISORY_ENDPOINTS: [&str; 2] = [
    "https://aviationweather.gov/api/data/gairmet?format=xml",
    "https://aviationweather.gov/api/data/gairmet?format=json",
];

#[async_trait]
pub trait AdvisoryFeed: Send + Sync {
    /// Current advisories for `region` within the last `hours`.
    async fn fetch(&self, region: &str, hours: u32) -> Result<Vec<AdvisoryRecord>, FeedError>;
}

pub struct HttpAdvisoryFeed {
    client: Client,
    endpoints: Vec<String>,
    timeout: Duration,
}

impl HttpAdvisoryFeed {
    pub fn new(client: Client, endpoints: Vec<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoints: endpoints
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            timeout,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn fetch_endpoint(
        &self,
        endpoint: &str,
        region: &str,
        hours: u32,
    ) -> Result<Vec<AdvisoryRecord>, FeedError> {
        let response = self
            .client
            .get(endpoint)
            .query(&[("region", region.to_string()), ("hours", hours.to_string())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(map_send_error)?;
        Ok(parse_feed(&body, content_type.as_deref())?)
    }
}

#[async_trait]
impl AdvisoryFeed for HttpAdvisoryFeed {
    async fn fetch(&self, region: &str, hours: u32) -> Result<Vec<AdvisoryRecord>, FeedError> {
        if self.endpoints.is_empty() {
            return Err(FeedError::NotConfigured("ADVISORY_ENDPOINTS"));
        }

        for endpoint in &self.endpoints {
            match self.fetch_endpoint(endpoint, region, hours).await {
                Ok(records) => {
                    tracing::debug!(endpoint = %endpoint, count = records.len(), "Advisory feed fetched");
                    return Ok(records);
                }
                Err(err) => {
                    tracing::warn!(endpoint = %endpoint, error = %err, "Advisory endpoint failed, trying next");
                }
            }
        }
        Err(FeedError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use turb_core::{HazardType, SeverityLevel};

    const XML_BODY: &str = r#"<response><data>
        <GAIRMET>
          <valid_time>2024-03-01T15:00:00Z</valid_time>
          <product>TANGO</product>
          <hazard type="TURB-HI" severity="MOD"/>
          <altitude min_ft_msl="24000" max_ft_msl="39000"/>
        </GAIRMET>
    </data></response>"#;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn router() -> Router {
        Router::new()
            .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "[]"
                }),
            )
            .route(
                "/xml",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("hours").map(String::as_str), Some("6"));
                    ([(header::CONTENT_TYPE, "text/xml")], XML_BODY).into_response()
                }),
            )
            .route(
                "/html",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                        "<!DOCTYPE html><html><body>Scheduled maintenance</body></html>",
                    )
                        .into_response()
                }),
            )
            .route(
                "/json",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "application/json")],
                        r#"[{"hazard": "MTW", "severity": "SEV", "altitude": "FL180-FL450"}]"#,
                    )
                        .into_response()
                }),
            )
    }

    #[tokio::test]
    async fn falls_through_to_first_working_endpoint() {
        let base = serve(router()).await;
        let feed = HttpAdvisoryFeed::new(
            Client::new(),
            vec![format!("{base}/down"), format!("{base}/slow"), format!("{base}/xml"), format!("{base}/json")],
            Duration::from_millis(300),
        );
        let records = feed.fetch(ALL_REGIONS, 6).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hazard_type, HazardType::Turbulence);
        assert_eq!(records[0].product.as_deref(), Some("TANGO"));
    }

    #[tokio::test]
    async fn json_endpoint_is_parsed_by_content_type() {
        let base = serve(router()).await;
        let feed = HttpAdvisoryFeed::new(Client::new(), vec![format!("{base}/json")], Duration::from_secs(2));
        let records = feed.fetch(ALL_REGIONS, 6).await.unwrap();
        assert_eq!(records[0].hazard_type, HazardType::MountainWave);
        assert_eq!(records[0].severity, SeverityLevel::Severe);
    }

    #[tokio::test]
    async fn html_page_does_not_end_the_chain() {
        let base = serve(router()).await;
        let feed = HttpAdvisoryFeed::new(
            Client::new(),
            vec![format!("{base}/html"), format!("{base}/json")],
            Duration::from_secs(2),
        );
        let records = feed.fetch(ALL_REGIONS, 6).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, SeverityLevel::Severe);

        let html_only = HttpAdvisoryFeed::new(Client::new(), vec![format!("{base}/html")], Duration::from_secs(2));
        assert!(matches!(html_only.fetch(ALL_REGIONS, 6).await, Err(FeedError::Exhausted)));
    }

    #[tokio::test]
    async fn all_endpoints_failing_is_exhausted() {
        let base = serve(router()).await;
        let feed = HttpAdvisoryFeed::new(Client::new(), vec![format!("{base}/down")], Duration::from_secs(2));
        assert!(matches!(feed.fetch(ALL_REGIONS, 6).await, Err(FeedError::Exhausted)));

        let unconfigured = HttpAdvisoryFeed::new(Client::new(), vec![" ".to_string()], Duration::from_secs(1));
        assert!(unconfigured.endpoints().is_empty());
        assert!(matches!(unconfigured.fetch(ALL_REGIONS, 6).await, Err(FeedError::NotConfigured(_))));
    }
}
