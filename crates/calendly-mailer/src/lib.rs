//! Email delivery abstraction for booking invitations.
//!
//! One of three provider backends is selected at construction time and fixed
//! for the process lifetime. [`Mailer::send`] never fails past its own
//! boundary: every error, from a malformed address to a provider rejection,
//! is folded into a [`SendOutcome`] so that batch-style callers can inspect
//! success without error handling at every step.

mod resend;
mod sendgrid;
mod smtp;
mod template;

use serde::Serialize;
use tracing::{info, warn};

pub use template::{render_html, render_text};

/// One booking invitation, assembled per call.
#[derive(Debug, Clone)]
pub struct Invitation {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub event_name: String,
    pub duration_minutes: u64,
    pub available_days: Vec<String>,
    pub booking_link: String,
    pub custom_message: Option<String>,
    pub host_name: String,
    pub host_email: String,
}

/// Result of a single send attempt. Never retried automatically.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    fn delivered(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error),
        }
    }
}

/// Provider selection, resolved once from configuration.
#[derive(Debug, Clone)]
pub enum MailerConfig {
    Sendgrid {
        api_key: String,
        /// Override for the API base URL (tests).
        endpoint: Option<String>,
    },
    Resend {
        api_key: String,
        endpoint: Option<String>,
    },
    Smtp {
        host: String,
        port: u16,
        /// Implicit TLS when true, STARTTLS otherwise.
        secure: bool,
        username: String,
        password: String,
    },
}

/// Errors internal to the mailer. Construction surfaces them; `send` does
/// not.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MailerError {
    #[error("invalid provider endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("email provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email provider rejected the message ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

enum Provider {
    Sendgrid(sendgrid::Sendgrid),
    Resend(resend::Resend),
    Smtp(smtp::SmtpRelay),
}

/// Polymorphic sender over the three provider backends.
pub struct Mailer {
    provider: Provider,
    from_email: Option<String>,
}

impl Mailer {
    /// Builds the selected provider. SMTP constructs its persistent
    /// transport here; a bad relay host fails construction, not `send`.
    pub fn new(config: MailerConfig, from_email: Option<String>) -> Result<Self, MailerError> {
        let provider = match config {
            MailerConfig::Sendgrid { api_key, endpoint } => {
                Provider::Sendgrid(sendgrid::Sendgrid::new(api_key, endpoint.as_deref())?)
            }
            MailerConfig::Resend { api_key, endpoint } => {
                Provider::Resend(resend::Resend::new(api_key, endpoint.as_deref())?)
            }
            MailerConfig::Smtp {
                host,
                port,
                secure,
                username,
                password,
            } => Provider::Smtp(smtp::SmtpRelay::new(&host, port, secure, username, password)?),
        };
        Ok(Self {
            provider,
            from_email,
        })
    }

    pub fn provider_name(&self) -> &'static str {
        match &self.provider {
            Provider::Sendgrid(_) => "sendgrid",
            Provider::Resend(_) => "resend",
            Provider::Smtp(_) => "smtp",
        }
    }

    /// Renders both representations of the invitation and dispatches it.
    ///
    /// Failures are reported in the outcome, never raised.
    pub async fn send(&self, invitation: &Invitation) -> SendOutcome {
        let html = template::render_html(invitation);
        let text = template::render_text(invitation);
        let from = self
            .from_email
            .as_deref()
            .unwrap_or(&invitation.host_email);

        let result = match &self.provider {
            Provider::Sendgrid(provider) => provider.send(from, invitation, &html, &text).await,
            Provider::Resend(provider) => provider.send(from, invitation, &html, &text).await,
            Provider::Smtp(provider) => provider.send(from, invitation, &html, &text).await,
        };

        match result {
            Ok(message_id) => {
                info!(
                    provider = self.provider_name(),
                    to = %invitation.to_email,
                    "invitation sent"
                );
                SendOutcome::delivered(message_id)
            }
            Err(error) => {
                warn!(
                    provider = self.provider_name(),
                    to = %invitation.to_email,
                    %error,
                    "invitation send failed"
                );
                SendOutcome::failed(error.to_string())
            }
        }
    }
}

/// `"Name <addr>"` when a display name is present, bare address otherwise.
fn format_address(email: &str, name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => format!("{name} <{email}>"),
        _ => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_address_includes_display_name_when_present() {
        assert_eq!(
            format_address("a@b.co", Some("Ada Lovelace")),
            "Ada Lovelace <a@b.co>"
        );
        assert_eq!(format_address("a@b.co", None), "a@b.co");
        assert_eq!(format_address("a@b.co", Some("  ")), "a@b.co");
    }

    #[test]
    fn outcome_constructors_set_the_flag() {
        let ok = SendOutcome::delivered(Some("id-1".to_string()));
        assert!(ok.success);
        assert_eq!(ok.message_id.as_deref(), Some("id-1"));
        assert!(ok.error.is_none());

        let failed = SendOutcome::failed("boom".to_string());
        assert!(!failed.success);
        assert!(failed.message_id.is_none());
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
