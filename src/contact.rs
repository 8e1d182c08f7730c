use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "ssr")]
use crate::config::SiteConfig;

const FALLBACK_SUCCESS: &str = "Message sent";
const FALLBACK_FAILURE: &str = "Failed to send email";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Email address doesn't look right")]
    InvalidEmail,
    #[error("Contact form is not configured: {0}")]
    NotConfigured(String),
    #[error("Couldn't reach the form service: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
}

impl ContactError {
    /// Validation errors are the visitor's to fix; everything else is a retry.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidEmail)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub project: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::MissingField("Name"));
        }
        if self.email.trim().is_empty() {
            return Err(ContactError::MissingField("Email"));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ContactError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::MissingField("Message"));
        }
        Ok(())
    }

    pub fn subject(&self) -> String {
        format!("New Project Inquiry from {}", self.name.trim())
    }
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels = domain.split('.').collect::<Vec<_>>();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Request body for the Web3Forms submit endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Web3FormsPayload<'a> {
    #[serde(flatten)]
    pub form: &'a ContactForm,
    pub access_key: &'a str,
    pub subject: String,
    pub from_name: &'a str,
    pub replyto: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<&'a str>,
}

impl<'a> Web3FormsPayload<'a> {
    pub fn new(form: &'a ContactForm, access_key: &'a str, to: Option<&'a str>) -> Self {
        Self {
            form,
            access_key,
            subject: form.subject(),
            from_name: form.name.trim(),
            replyto: form.email.trim(),
            to,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Web3FormsReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl Web3FormsReply {
    pub fn into_result(self) -> Result<String, ContactError> {
        let message = self.message.filter(|m| !m.trim().is_empty());
        if self.success {
            Ok(message.unwrap_or_else(|| FALLBACK_SUCCESS.to_string()))
        } else {
            Err(ContactError::Rejected(
                message.unwrap_or_else(|| FALLBACK_FAILURE.to_string()),
            ))
        }
    }
}

/// Validates `form` and posts it to the configured endpoint.
#[cfg(feature = "ssr")]
pub async fn submit(
    client: &reqwest::Client,
    config: &SiteConfig,
    form: &ContactForm,
) -> Result<String, ContactError> {
    form.validate()?;
    let payload = Web3FormsPayload::new(form, &config.access_key, config.contact_email.as_deref());

    let reply = client
        .post(&config.endpoint)
        .header(http::header::ACCEPT, "application/json")
        .json(&payload)
        .send()
        .await
        .map_err(|e| ContactError::Transport(e.to_string()))?
        .json::<Web3FormsReply>()
        .await
        .map_err(|e| ContactError::Transport(e.to_string()))?;

    let res = reply.into_result();
    match &res {
        Ok(_) => tracing::info!(from = %form.email.trim(), "contact form delivered"),
        Err(e) => tracing::warn!("contact form rejected: {e}"),
    }
    res
}
