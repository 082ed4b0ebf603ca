//! Contact notification dispatch.
//!
//! Every valid submission produces exactly two emails:
//!
//! ```text
//! ContactSubmission ─┬─> admin notification (to RECEIVER_EMAIL, reply-to submitter)
//!                    └─> auto-reply        (to submitter)
//! ```
//!
//! Both are sent concurrently and both are always attempted. A failed send
//! is not retried.

use std::sync::Arc;

use futures::future::join;
use tracing::{error, info};

use crate::contact::ContactSubmission;
use crate::mail::{AdminNotification, AutoReply, MailError, Mailer, OutgoingEmail};
use crate::Config;

/// Subject line of the auto-reply.
pub const AUTO_REPLY_SUBJECT: &str = "Thank you for contacting us";

/// Composes and delivers the two contact emails.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    receiver: String,
    operator_name: String,
}

impl Notifier {
    /// Requires `RECEIVER_EMAIL` to be configured.
    pub fn new(config: &Config, mailer: Arc<dyn Mailer>) -> Result<Self, MailError> {
        let receiver = config
            .receiver_email
            .clone()
            .ok_or(MailError::MissingConfig("RECEIVER_EMAIL"))?;

        Ok(Self {
            mailer,
            receiver,
            operator_name: config.operator_name.clone(),
        })
    }

    /// Build the notification sent to the site administrator.
    pub fn admin_email(&self, submission: &ContactSubmission) -> Result<OutgoingEmail, MailError> {
        Ok(OutgoingEmail {
            from_name: submission.name.clone(),
            to: self.receiver.clone(),
            reply_to: Some(submission.email.clone()),
            subject: submission.admin_subject().to_string(),
            html: AdminNotification::new(submission).to_html()?,
        })
    }

    /// Build the acknowledgment sent back to the submitter.
    pub fn auto_reply(&self, submission: &ContactSubmission) -> Result<OutgoingEmail, MailError> {
        Ok(OutgoingEmail {
            from_name: self.operator_name.clone(),
            to: submission.email.clone(),
            reply_to: None,
            subject: AUTO_REPLY_SUBJECT.to_string(),
            html: AutoReply::new(submission, &self.operator_name).to_html()?,
        })
    }

    /// Send both emails concurrently.
    ///
    /// Returns the first failure, if any. Which of the two failed is only
    /// visible in the logs.
    pub async fn deliver(&self, submission: &ContactSubmission) -> Result<(), MailError> {
        let (admin, reply) = join(
            self.send_one("admin", self.admin_email(submission)),
            self.send_one("auto_reply", self.auto_reply(submission)),
        )
        .await;

        match admin.and(reply) {
            Ok(()) => {
                info!("contact_emails_sent");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "contact_emails_failed");
                Err(e)
            }
        }
    }

    async fn send_one(
        &self,
        kind: &'static str,
        email: Result<OutgoingEmail, MailError>,
    ) -> Result<(), MailError> {
        let result = match email {
            Ok(email) => self.mailer.send(&email).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!(kind = kind, error = %e, "contact_email_send_failed");
        }

        result
    }
}
