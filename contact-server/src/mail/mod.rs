//! Outbound email: message model, delivery seam and SMTP relay transport.
//!
//! The handler never talks to lettre directly. It builds [`OutgoingEmail`]
//! values and hands them to a [`Mailer`], which in production is the pooled
//! [`SmtpMailer`] created once at startup.

pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use thiserror::Error;

pub use smtp::SmtpMailer;
pub use templates::{AdminNotification, AutoReply};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(&'static str),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// A single HTML email ready for delivery.
///
/// The sender address is owned by the mailer; only the display name
/// varies per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Async email delivery.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
