//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::airports::AirportResolver;
use crate::pipeline::RoutePipeline;

pub struct AppState {
    pub pipeline: RoutePipeline,
}

impl AppState {
    pub fn new(pipeline: RoutePipeline) -> Self {
        Self { pipeline }
    }

    pub fn airports(&self) -> &Arc<dyn AirportResolver> {
        self.pipeline.airports()
    }
}
