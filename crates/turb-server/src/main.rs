//! Turb Server - route turbulence prediction over HTTP

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turb_feeds::{ChatCompletionsNarrator, HttpAdvisoryFeed, OpenWeatherClient};
use turb_server::airports::{AirportDirectory, CachedAirportResolver};
use turb_server::api;
use turb_server::config::Config;
use turb_server::pipeline::{PipelineSettings, RoutePipeline};
use turb_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("turb_server=debug".parse()?))
        .init();

    tracing::info!("Starting Turb Server...");

    let config = Config::from_env();
    let port = config.server_port;

    let mut directory = AirportDirectory::with_fallback();
    if let Some(path) = config.airports_csv_path.as_deref() {
        match directory.load_csv_file(path) {
            Ok(count) => tracing::info!(path, count, "loaded airport dataset"),
            Err(err) => tracing::warn!(path, error = %err, "airport dataset unavailable, using built-in table"),
        }
    }
    let airports = CachedAirportResolver::new(
        directory,
        Duration::from_secs(config.airport_cache_ttl_s),
        config.airport_cache_max_entries,
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("turb-server/", env!("CARGO_PKG_VERSION")))
        .build()?;
    if config.openweather_api_key.is_empty() {
        tracing::warn!("OPENWEATHER_API_KEY not set; weather samples will be unavailable");
    }
    let weather = OpenWeatherClient::new(
        client.clone(),
        config.weather_base_url.clone(),
        config.openweather_api_key.clone(),
        Duration::from_secs(config.weather_timeout_s),
    );
    let advisories = HttpAdvisoryFeed::new(
        client.clone(),
        config.advisory_endpoints.clone(),
        Duration::from_secs(config.advisory_timeout_s),
    );

    let mut pipeline = RoutePipeline::new(
        Arc::new(airports),
        Arc::new(weather),
        Arc::new(advisories),
        PipelineSettings::from_config(&config),
    );
    if let Some(key) = config.narrative_api_key.clone() {
        pipeline = pipeline.with_narrator(Arc::new(ChatCompletionsNarrator::new(
            client,
            config.narrative_endpoint.clone(),
            key,
            config.narrative_model.clone(),
        )));
    } else {
        tracing::info!("NARRATIVE_API_KEY not set; narratives disabled");
    }

    let state = Arc::new(AppState::new(pipeline));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
