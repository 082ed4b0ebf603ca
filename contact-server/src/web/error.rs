//! Mapping of contact failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::handlers::ContactResponse;
use crate::contact::ValidationError;
use crate::mail::MailError;

pub const VALIDATION_MESSAGE: &str = "All fields are required.";
pub const RELAY_MESSAGE: &str = "Failed to send email.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Relay(#[from] MailError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Callers only ever see the static text, never relay details.
        let (status, message) = match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, VALIDATION_MESSAGE),
            ApiError::Relay(_) => (StatusCode::INTERNAL_SERVER_ERROR, RELAY_MESSAGE),
        };

        (status, Json(ContactResponse::failure(message))).into_response()
    }
}
