//! SendGrid v3 mail send backend.

use std::time::Duration;

use reqwest::Url;
use serde_json::json;

use crate::{Invitation, MailerError};

const DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com";

pub(crate) struct Sendgrid {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl Sendgrid {
    pub(crate) fn new(api_key: String, endpoint: Option<&str>) -> Result<Self, MailerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let base_url = Url::parse(endpoint.unwrap_or(DEFAULT_ENDPOINT))?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Sends one message. The provider message id arrives in the
    /// `X-Message-Id` response header.
    pub(crate) async fn send(
        &self,
        from: &str,
        invitation: &Invitation,
        html: &str,
        text: &str,
    ) -> Result<Option<String>, MailerError> {
        let mut to = json!({ "email": invitation.to_email });
        if let Some(name) = &invitation.to_name {
            to["name"] = json!(name);
        }

        let body = json!({
            "personalizations": [{ "to": [to] }],
            "from": { "email": from, "name": invitation.host_name },
            "subject": invitation.subject,
            "content": [
                { "type": "text/plain", "value": text },
                { "type": "text/html", "value": html }
            ]
        });

        let url = self.base_url.join("/v3/mail/send")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok(message_id)
    }
}
