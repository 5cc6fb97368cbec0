//! SMTP relay backend (lettre).

use std::time::{SystemTime, UNIX_EPOCH};

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{Invitation, MailerError};

pub(crate) struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    /// Builds the persistent transport. `secure` selects implicit TLS;
    /// otherwise the connection upgrades via STARTTLS.
    pub(crate) fn new(
        host: &str,
        port: u16,
        secure: bool,
        username: String,
        password: String,
    ) -> Result<Self, MailerError> {
        let builder = if secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };
        let transport = builder
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { transport })
    }

    pub(crate) async fn send(
        &self,
        from: &str,
        invitation: &Invitation,
        html: &str,
        text: &str,
    ) -> Result<Option<String>, MailerError> {
        let from_mailbox = mailbox(from, Some(&invitation.host_name))?;
        let to_mailbox = mailbox(&invitation.to_email, invitation.to_name.as_deref())?;

        let message_id = generate_message_id();
        let message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(invitation.subject.clone())
            .message_id(Some(message_id.clone()))
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))?;

        self.transport.send(message).await?;
        Ok(Some(message_id))
    }
}

fn mailbox(email: &str, name: Option<&str>) -> Result<Mailbox, MailerError> {
    let address = email.parse()?;
    let name = name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Ok(Mailbox::new(name, address))
}

fn generate_message_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("<{nanos}.{}@calendly-mcp>", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_parses_with_and_without_display_name() {
        let with_name = mailbox("ada@example.com", Some("Ada")).unwrap();
        assert_eq!(with_name.to_string(), "Ada <ada@example.com>");

        let bare = mailbox("ada@example.com", None).unwrap();
        assert_eq!(bare.to_string(), "ada@example.com");
    }

    #[test]
    fn mailbox_rejects_garbage_addresses() {
        assert!(mailbox("not-an-address", None).is_err());
    }

    #[test]
    fn message_ids_are_angle_bracketed_and_distinct() {
        let first = generate_message_id();
        let second = generate_message_id();
        assert!(first.starts_with('<') && first.ends_with('>'));
        assert_ne!(first, second);
    }
}
