//! Turb Feeds - clients for the external providers the pipeline consumes
//!
//! Weather sampling, hazard advisory feeds and the narrative generator, each
//! behind an `async_trait` seam so the server can swap in other sources.

pub mod advisories;
pub mod error;
pub mod narrative;
pub mod weather;

pub use advisories::{AdvisoryFeed, HttpAdvisoryFeed, ALL_REGIONS, DEFAULT_ADVISORY_ENDPOINTS};
pub use error::FeedError;
pub use narrative::{build_prompt, ChatCompletionsNarrator, NarrativeGenerator, DEFAULT_NARRATIVE_MODEL};
pub use weather::{OpenWeatherClient, WeatherProvider};
