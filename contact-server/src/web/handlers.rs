//! Contact endpoint handlers.
//!
//! The contact handler:
//! 1. Validates the submission
//! 2. Dispatches the admin notification and the auto-reply
//! 3. Responds either right away (eager) or after delivery (confirmed)

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::error::ApiError;
use crate::config::DispatchMode;
use crate::contact::ContactForm;
use crate::notify::Notifier;
use crate::Config;

pub const ACCEPTED_MESSAGE: &str = "Message received! Sending emails in background...";
pub const SENT_MESSAGE: &str = "Message sent successfully!";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config, notifier: Notifier) -> Self {
        Self {
            config: Arc::new(config),
            notifier,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Contact Form
// =============================================================================

/// Body returned by the contact endpoint, on success and on failure.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
}

impl ContactResponse {
    pub fn success(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failure(message: &'static str) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Contact form endpoint.
///
/// A body that is not a JSON object is treated as a form with every field
/// missing.
pub async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let form = match payload {
        Ok(Json(body)) => ContactForm::from_json(&body),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "contact_body_rejected");
            ContactForm::default()
        }
    };

    let submission = form.validate().map_err(|e| {
        warn!(error = %e, "contact_validation_failed");
        ApiError::from(e)
    })?;

    info!(
        has_subject = submission.subject.is_some(),
        message_length = submission.message.len(),
        dispatch_mode = %state.config.dispatch_mode,
        "contact_received"
    );

    match state.config.dispatch_mode {
        DispatchMode::EagerAck => {
            let notifier = state.notifier.clone();
            tokio::spawn(async move {
                // deliver logs its own failures.
                let _ = notifier.deliver(&submission).await;
            });

            Ok(Json(ContactResponse::success(ACCEPTED_MESSAGE)))
        }
        DispatchMode::Confirmed => {
            state.notifier.deliver(&submission).await?;
            Ok(Json(ContactResponse::success(SENT_MESSAGE)))
        }
    }
}
