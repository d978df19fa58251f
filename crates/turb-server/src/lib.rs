//! Turbulence prediction server: airport lookup, the route pipeline and the HTTP API.

pub mod airports;
pub mod api;
pub mod cache;
pub mod config;
pub mod pipeline;
pub mod state;
