//! Web server module for the contact API.
//!
//! This module provides a small HTTP surface:
//! - `POST /api/contact` validates a submission and dispatches the emails
//! - `GET /health` reports liveness
//!
//! Browser access is governed by the configured CORS policy.

pub mod cors;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use cors::cors_layer;
pub use error::ApiError;
pub use handlers::{contact, health, AppState, ContactResponse, HealthResponse};

/// Build the application router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(contact))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
