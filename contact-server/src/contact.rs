//! Contact form submission and validation.

use serde_json::{Map, Value};
use thiserror::Error;

/// Admin email subject used when the submitter leaves the subject blank.
pub const DEFAULT_SUBJECT: &str = "New Contact Form Message";

/// Raw contact form body as posted by the frontend.
///
/// Every field is optional here so that a missing field surfaces as a
/// validation failure instead of a deserialization rejection.
#[derive(Debug, Default, Clone)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    /// Used verbatim as reply-to and auto-reply recipient.
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl ContactForm {
    /// Read the form fields from a JSON object body.
    ///
    /// Fields that are absent or not strings are left unset.
    pub fn from_json(body: &Map<String, Value>) -> Self {
        let field = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            name: field("name"),
            email: field("email"),
            subject: field("subject"),
            message: field("message"),
        }
    }

    /// Check the required fields and produce a submission.
    pub fn validate(self) -> Result<ContactSubmission, ValidationError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let message = required(self.message, "message")?;

        Ok(ContactSubmission {
            name,
            email,
            subject: self.subject.filter(|s| !s.is_empty()),
            message,
        })
    }
}

impl ContactSubmission {
    /// Subject line of the admin notification.
    pub fn admin_subject(&self) -> &str {
        self.subject.as_deref().unwrap_or(DEFAULT_SUBJECT)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, subject: Option<&str>, message: &str) -> ContactForm {
        ContactForm {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            subject: subject.map(str::to_string),
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn test_validate_complete_form() {
        let submission = form("Alice", "alice@example.com", Some("Hi"), "Hello")
            .validate()
            .unwrap();

        assert_eq!(submission.name, "Alice");
        assert_eq!(submission.email, "alice@example.com");
        assert_eq!(submission.admin_subject(), "Hi");
        assert_eq!(submission.message, "Hello");
    }

    #[test]
    fn test_validate_without_subject_uses_default() {
        let submission = form("Alice", "alice@example.com", None, "Hello")
            .validate()
            .unwrap();
        assert_eq!(submission.subject, None);
        assert_eq!(submission.admin_subject(), DEFAULT_SUBJECT);

        let submission = form("Alice", "alice@example.com", Some(""), "Hello")
            .validate()
            .unwrap();
        assert_eq!(submission.admin_subject(), DEFAULT_SUBJECT);
    }

    #[test]
    fn test_validate_empty_fields() {
        assert_eq!(
            form("", "a@b.com", None, "hi").validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            form("Bob", "", None, "hi").validate(),
            Err(ValidationError::MissingField("email"))
        );
        assert_eq!(
            form("Bob", "a@b.com", None, "").validate(),
            Err(ValidationError::MissingField("message"))
        );
    }

    #[test]
    fn test_validate_missing_fields() {
        assert!(ContactForm::default().validate().is_err());

        let body: Map<String, Value> =
            serde_json::from_str(r#"{"name":"Bob","email":null,"message":"hi"}"#).unwrap();
        assert_eq!(
            ContactForm::from_json(&body).validate(),
            Err(ValidationError::MissingField("email"))
        );
    }

    #[test]
    fn test_from_json_ignores_non_string_fields() {
        let body: Map<String, Value> = serde_json::from_str(
            r#"{"name":42,"email":"a@b.com","subject":["x"],"message":"hi"}"#,
        )
        .unwrap();
        let form = ContactForm::from_json(&body);

        assert_eq!(form.name, None);
        assert_eq!(form.subject, None);
        assert_eq!(form.email.as_deref(), Some("a@b.com"));
        assert_eq!(form.validate(), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_email_format_not_checked() {
        let submission = form("Bob", "not-an-address", None, "hi").validate().unwrap();
        assert_eq!(submission.email, "not-an-address");
    }
}
