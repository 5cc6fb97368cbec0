//! Resend transactional email backend.

use std::time::Duration;

use reqwest::Url;
use serde_json::{Value, json};

use crate::{Invitation, MailerError, format_address};

const DEFAULT_ENDPOINT: &str = "https://api.resend.com";

/// Sentinel returned when the provider response omits an id.
const UNKNOWN_MESSAGE_ID: &str = "unknown";

pub(crate) struct Resend {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl Resend {
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

    /// Sends one message. The provider message id is the `id` field of the
    /// response body.
    pub(crate) async fn send(
        &self,
        from: &str,
        invitation: &Invitation,
        html: &str,
        text: &str,
    ) -> Result<Option<String>, MailerError> {
        let body = json!({
            "from": format_address(from, Some(&invitation.host_name)),
            "to": [invitation.to_email],
            "subject": invitation.subject,
            "html": html,
            "text": text
        });

        let url = self.base_url.join("/emails")?;
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

        let payload: Value = response.json().await?;
        let message_id = payload
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_MESSAGE_ID)
            .to_string();
        Ok(Some(message_id))
    }
}
