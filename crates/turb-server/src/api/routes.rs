//! REST API routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::airports::{normalize_code, Airport, AirportResolver};
use crate::pipeline::{parse_route_id, PipelineError, RouteReport};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/turbulence/predict", post(predict))
        .route("/v1/routes/:route_id", get(get_route))
        .route("/v1/airports/:code", get(get_airport))
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub departure: Option<String>,
    pub arrival: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(Vec<String>),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request", "details": details })),
            )
                .into_response(),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to generate route" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::AirportNotFound(_) => ApiError::NotFound(err.to_string()),
            PipelineError::InvalidRoute(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Check a departure/arrival pair, returning normalised codes.
fn validate_codes(
    departure: Option<&str>,
    arrival: Option<&str>,
) -> Result<(String, String), ApiError> {
    let mut details = Vec::new();
    let mut check = |field: &str, value: Option<&str>| -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => {
                details.push(format!("{field} is required"));
                None
            }
            Some(code) if code.chars().count() != 3 => {
                details.push(format!("{field} must be a 3-letter airport code"));
                None
            }
            Some(code) => Some(normalize_code(code)),
        }
    };
    let dep = check("departure", departure);
    let arr = check("arrival", arrival);

    match (dep, arr) {
        (Some(dep), Some(arr)) if dep == arr => {
            details.push("departure and arrival must be different".to_string());
            Err(ApiError::Validation(details))
        }
        (Some(dep), Some(arr)) if details.is_empty() => Ok((dep, arr)),
        _ => Err(ApiError::Validation(details)),
    }
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<RouteReport>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))?;
    let (dep, arr) = validate_codes(request.departure.as_deref(), request.arrival.as_deref())?;
    let report = state.pipeline.generate_route(&dep, &arr).await?;
    Ok(Json(report))
}

async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> Result<Json<RouteReport>, ApiError> {
    let (dep, arr) = parse_route_id(&route_id).ok_or_else(|| {
        ApiError::Validation(vec![format!(
            "route id '{route_id}' must look like 'jfk-lax'"
        )])
    })?;
    let (dep, arr) = validate_codes(Some(&dep), Some(&arr))?;
    let report = state.pipeline.generate_route(&dep, &arr).await?;
    Ok(Json(report))
}

async fn get_airport(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Airport>, ApiError> {
    state
        .airports()
        .resolve(&code)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Airport not found: {}", normalize_code(&code))))
}
