//! API routes for the turbulence server.

mod routes;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub use routes::{ApiError, PredictRequest};

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

#[cfg(test)]
mod tests;
