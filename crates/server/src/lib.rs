//! HTTP and WebSocket surface for nutrisearch.

pub mod api;
pub mod metrics;
pub mod state;
