//! Passenger-facing narrative from an OpenAI-compatible chat endpoint.
//!
//! The prompt carries the final severity and tells the model not to change
//! it; the reply is display text only.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use turb_core::NarrativeContext;

use crate::error::FeedError;
use crate::weather::map_send_error;

pub const DEFAULT_NARRATIVE_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are an aviation meteorologist explaining turbulence forecasts to an \
anxious passenger. Be accurate, calm and concise. Never change the turbulence level you are given.";

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn summarize(&self, context: &NarrativeContext) -> Result<String, FeedError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// User prompt for one route.
pub fn build_prompt(context: &NarrativeContext) -> String {
    let severity = context.final_severity;
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Route: {} ({}) to {} ({}), about {:.0} miles.",
        context.departure_name,
        context.departure_code,
        context.arrival_name,
        context.arrival_code,
        context.distance_miles
    );
    let _ = writeln!(prompt, "FINAL predicted turbulence level: {severity}.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Surface weather along the route:");
    for (i, sample) in context.weather.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "- waypoint {} ({:.2}, {:.2}): wind {:.0} mph, {:.0} F, {:.0} hPa, {}",
            i + 1,
            sample.lat,
            sample.lon,
            sample.reading.wind_speed_mph,
            sample.reading.temperature_f,
            sample.reading.pressure_hpa,
            sample.reading.description
        );
    }
    let _ = writeln!(prompt);
    if context.advisory_lines.is_empty() {
        let _ = writeln!(prompt, "No active G-AIRMET advisories.");
    } else {
        let _ = writeln!(prompt, "G-AIRMET advisories:");
        for line in &context.advisory_lines {
            let _ = writeln!(prompt, "- {line}");
        }
    }
    let _ = writeln!(prompt);
    let _ = write!(
        prompt,
        "The level {severity} is final and already includes advisory data; do not change it. \
In 4-5 sentences, state the level with full airport names, the main atmospheric factor, \
typical turbulence patterns for this route, and a short reassuring note for the passenger."
    );
    prompt
}

pub struct ChatCompletionsNarrator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsNarrator {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for ChatCompletionsNarrator {
    async fn summarize(&self, context: &NarrativeContext) -> Result<String, FeedError> {
        if self.api_key.trim().is_empty() {
            return Err(FeedError::NotConfigured("NARRATIVE_API_KEY"));
        }

        let prompt = build_prompt(context);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|err| FeedError::Parse(err.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| FeedError::Parse("chat response had no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use turb_core::SeverityLevel;

    fn context() -> NarrativeContext {
        NarrativeContext {
            departure_code: "JFK".to_string(),
            departure_name: "John F Kennedy International Airport".to_string(),
            arrival_code: "LAX".to_string(),
            arrival_name: "Los Angeles International Airport".to_string(),
            final_severity: SeverityLevel::LightToModerate,
            distance_miles: 2_470.0,
            weather: Vec::new(),
            advisory_lines: vec!["TURB-HI (turbulence) Moderate in Central United States FL240-FL390".to_string()],
        }
    }

    #[test]
    fn prompt_pins_final_severity() {
        let prompt = build_prompt(&context());
        assert!(prompt.contains("FINAL predicted turbulence level: Light to Moderate."));
        assert!(prompt.contains("do not change it"));
        assert!(prompt.contains("Central United States FL240-FL390"));
    }

    #[tokio::test]
    async fn summarize_returns_first_choice() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer secret")
                );
                assert_eq!(body["max_tokens"], 200);
                assert_eq!(body["messages"][0]["role"], "system");
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "  Expect a mostly smooth ride.  "}}]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let narrator = ChatCompletionsNarrator::new(
            Client::new(),
            format!("http://{addr}/v1/chat/completions"),
            "secret",
            DEFAULT_NARRATIVE_MODEL,
        );
        let text = narrator.summarize(&context()).await.unwrap();
        assert_eq!(text, "Expect a mostly smooth ride.");
    }

    #[tokio::test]
    async fn missing_key_disables_narrative() {
        let narrator = ChatCompletionsNarrator::new(Client::new(), "http://127.0.0.1:9", "", DEFAULT_NARRATIVE_MODEL);
        assert!(matches!(narrator.summarize(&context()).await, Err(FeedError::NotConfigured(_))));
    }
}
