//! Contact relay - contact form endpoint backed by an SMTP relay.
//!
//! Each valid submission to `POST /api/contact` produces two emails: a
//! notification to the site administrator and an auto-reply to the
//! submitter. Both go out through a pooled SMTP transport shared by the
//! whole process.
//!
//! ## Architecture
//!
//! ```text
//! HTTP → web::contact → ContactForm::validate → Notifier::deliver → SmtpMailer → relay
//! ```

pub mod config;
pub mod contact;
pub mod mail;
pub mod notify;
pub mod web;

// Re-export commonly used types
pub use config::{Config, CorsPolicy, DispatchMode};
pub use contact::{ContactForm, ContactSubmission, ValidationError};
pub use mail::{MailError, Mailer, OutgoingEmail, SmtpMailer};
pub use notify::Notifier;
pub use web::AppState;
