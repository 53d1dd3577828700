//! Contact form validation and mail composition.

use askama::Template;
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::i18n::Translator;
use crate::mail::OutgoingMail;
use crate::session::FormData;

pub const NAME_REQUIRED: &str = "Name is required.";
pub const EMAIL_INVALID: &str = "A valid email address is required.";
pub const MESSAGE_REQUIRED: &str = "Message is required.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please try again.";
pub const SENT: &str = "Thank you for your message. We will get back to you soon.";
pub const SEND_FAILED: &str = "Failed to send message. Please try again later.";

/// Raw form fields as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

/// A submission that passed validation, with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Loose syntactic email check: one `@`, no whitespace, a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("Invalid email regex")
    });
    regex.is_match(email)
}

impl ContactSubmission {
    /// Validate the submission, returning translated error messages on failure.
    pub fn validate(&self, translator: &Translator) -> Result<ContactMessage, Vec<String>> {
        let message = self.trimmed();
        let mut errors = Vec::new();

        if message.name.is_empty() {
            errors.push(translator.t(NAME_REQUIRED));
        }
        if message.email.is_empty() || !is_valid_email(&message.email) {
            errors.push(translator.t(EMAIL_INVALID));
        }
        if message.message.is_empty() {
            errors.push(translator.t(MESSAGE_REQUIRED));
        }

        if errors.is_empty() {
            Ok(message)
        } else {
            Err(errors)
        }
    }

    /// Trimmed field values, for re-populating the form after a failure.
    pub fn form_data(&self) -> FormData {
        let message = self.trimmed();
        let mut form = FormData::new();
        form.insert("name".to_string(), message.name);
        form.insert("email".to_string(), message.email);
        form.insert("message".to_string(), message.message);
        form
    }

    fn trimmed(&self) -> ContactMessage {
        ContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "mail/contact.html")]
struct ContactMailHtml<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
    locale: &'a str,
    received_at: &'a str,
}

impl ContactMessage {
    /// Compose the notification mail sent to the site owner.
    pub fn to_mail(&self, recipient: &str, locale: &str) -> askama::Result<OutgoingMail> {
        let received_at = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();

        let html_body = ContactMailHtml {
            name: &self.name,
            email: &self.email,
            message: &self.message,
            locale,
            received_at: &received_at,
        }
        .render()?;

        let text_body = format!(
            "Contact Form Submission\n\nName: {}\nEmail: {}\nLocale: {}\nReceived: {}\n\nMessage:\n{}\n",
            self.name, self.email, locale, received_at, self.message
        );

        Ok(OutgoingMail {
            to: recipient.to_string(),
            subject: format!("Contact Form Submission from {}", self.name),
            html_body,
            text_body,
            reply_to: Some(self.email.clone()),
        })
    }
}
