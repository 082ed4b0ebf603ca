//! HTML cards for the two contact emails.
//!
//! Rendered with askama; every interpolated value is HTML-escaped, so
//! markup typed into the form shows up as text in the delivered email.

use askama::Template;
use chrono::Datelike;

use super::MailError;
use crate::contact::ContactSubmission;

/// Card delivered to the site administrator.
#[derive(Template)]
#[template(path = "emails/admin_notification.html")]
pub struct AdminNotification<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    pub year: i32,
}

/// Acknowledgment card delivered to the submitter.
#[derive(Template)]
#[template(path = "emails/auto_reply.html")]
pub struct AutoReply<'a> {
    pub name: &'a str,
    pub message: &'a str,
    pub operator_name: &'a str,
}

impl<'a> AdminNotification<'a> {
    pub fn new(submission: &'a ContactSubmission) -> Self {
        Self {
            name: &submission.name,
            email: &submission.email,
            subject: submission.subject.as_deref().unwrap_or("(No subject)"),
            message: &submission.message,
            year: chrono::Utc::now().year(),
        }
    }

    pub fn to_html(&self) -> Result<String, MailError> {
        self.render().map_err(|e| MailError::Build(e.to_string()))
    }
}

impl<'a> AutoReply<'a> {
    pub fn new(submission: &'a ContactSubmission, operator_name: &'a str) -> Self {
        Self {
            name: &submission.name,
            message: &submission.message,
            operator_name,
        }
    }

    pub fn to_html(&self) -> Result<String, MailError> {
        self.render().map_err(|e| MailError::Build(e.to_string()))
    }
}
