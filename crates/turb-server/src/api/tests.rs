use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use turb_core::{AdvisoryRecord, FixedNoise, WeatherReading};
use turb_feeds::{AdvisoryFeed, FeedError, WeatherProvider};

use crate::airports::AirportDirectory;
use crate::api;
use crate::pipeline::{PipelineSettings, RoutePipeline};
use crate::state::AppState;

struct CalmWeather;

#[async_trait]
impl WeatherProvider for CalmWeather {
    async fn sample(&self, _lat: f64, _lon: f64) -> Result<WeatherReading, FeedError> {
        Ok(WeatherReading {
            wind_speed_mph: 10.0,
            temperature_f: 60.0,
            humidity_pct: 50.0,
            pressure_hpa: 1013.0,
            description: "clear sky".to_string(),
        })
    }
}

struct DownFeed;

#[async_trait]
impl AdvisoryFeed for DownFeed {
    async fn fetch(&self, _region: &str, _hours: u32) -> Result<Vec<AdvisoryRecord>, FeedError> {
        Err(FeedError::Exhausted)
    }
}

fn setup_app() -> axum::Router {
    let pipeline = RoutePipeline::new(
        Arc::new(AirportDirectory::with_fallback()),
        Arc::new(CalmWeather),
        Arc::new(DownFeed),
        PipelineSettings::default(),
    )
    .with_noise(Arc::new(FixedNoise(0.5)));
    api::routes().with_state(Arc::new(AppState::new(pipeline)))
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn predict_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/turbulence/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check() {
    let response = setup_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn predict_returns_route_report() {
    let response = setup_app()
        .oneshot(predict_request(json!({"departure": "jfk", "arrival": "LAX"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["id"], "jfk-lax");
    assert_eq!(body["departure"]["code"], "JFK");
    assert_eq!(body["turbulenceLevel"], "Light");
    assert_eq!(body["assessment"]["hasAdvisories"], false);
    assert_eq!(body["waypoints"].as_array().unwrap().len(), 16);
    assert_eq!(body["weather"].as_array().unwrap().len(), 16);
    assert_eq!(body["assessment"]["phases"].as_array().unwrap().len(), 3);
    assert!(body["narrative"].is_null());
    assert_eq!(body["confidence"], 0.55);
}

#[tokio::test]
async fn predict_validates_codes() {
    let response = setup_app()
        .oneshot(predict_request(json!({"departure": "JFKX"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Invalid request");
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);

    let response = setup_app()
        .oneshot(predict_request(json!({"departure": "JFK", "arrival": "jfk"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/turbulence/predict")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_airport_is_not_found() {
    let response = setup_app()
        .oneshot(predict_request(json!({"departure": "ZZZ", "arrival": "LAX"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Airport not found: ZZZ");
}

#[tokio::test]
async fn route_lookup_by_id() {
    let response = setup_app()
        .oneshot(
            Request::builder()
                .uri("/v1/routes/lhr-cdg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["id"], "lhr-cdg");
    assert_eq!(body["assessment"]["hasAdvisories"], false);

    let response = setup_app()
        .oneshot(
            Request::builder()
                .uri("/v1/routes/lhrcdg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn airport_lookup() {
    let response = setup_app()
        .oneshot(
            Request::builder()
                .uri("/v1/airports/sfo")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["code"], "SFO");

    let response = setup_app()
        .oneshot(
            Request::builder()
                .uri("/v1/airports/qqq")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
