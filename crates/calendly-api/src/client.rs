//! Authenticated gateway to the Calendly REST API.
//!
//! One method per upstream capability. The gateway is intentionally
//! transparent: request bodies contain only the fields the caller supplied,
//! responses are returned as raw JSON, and non-2xx responses surface as
//! [`ApiError::Upstream`] with status and body unchanged.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::auth::CredentialStore;
use crate::error::ApiError;
use crate::types::{
    CreateOneOffEventType, Defaults, ListEventTypesParams, ListEventsParams, ListInviteesParams,
    ListMembershipsParams,
};

const DEFAULT_API_ENDPOINT: &str = "https://api.calendly.com";
const DEFAULT_CANCEL_REASON: &str = "No reason provided";

pub struct CalendlyClient {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<CredentialStore>,
    defaults: Defaults,
}

impl CalendlyClient {
    pub fn new(
        store: Arc<CredentialStore>,
        defaults: Defaults,
        base_url: Option<&str>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("calendly-mcp/0.1"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = Url::parse(base_url.unwrap_or(DEFAULT_API_ENDPOINT))?;

        Ok(Self {
            http,
            base_url,
            store,
            defaults,
        })
    }

    /// GET `/users/me`, the currently authenticated user.
    pub async fn current_user(&self) -> Result<Value, ApiError> {
        let url = self.url("/users/me")?;
        self.get(url).await
    }

    /// GET `/scheduled_events`.
    ///
    /// Scoped to the supplied user URI, or the configured default when the
    /// caller provides neither a user nor an organization.
    pub async fn list_events(&self, params: ListEventsParams) -> Result<Value, ApiError> {
        let mut url = self.url("/scheduled_events")?;
        {
            let mut query = url.query_pairs_mut();
            let user = params.user_uri.or_else(|| {
                if params.organization_uri.is_some() {
                    None
                } else {
                    self.defaults.user_uri.clone()
                }
            });
            if let Some(user) = user.as_deref() {
                query.append_pair("user", user);
            }
            if let Some(organization) = params.organization_uri.as_deref() {
                query.append_pair("organization", organization);
            }
            if let Some(status) = params.status.as_deref() {
                query.append_pair("status", status);
            }
            if let Some(min_start_time) = params.min_start_time.as_deref() {
                query.append_pair("min_start_time", min_start_time);
            }
            if let Some(max_start_time) = params.max_start_time.as_deref() {
                query.append_pair("max_start_time", max_start_time);
            }
            if let Some(count) = params.count {
                query.append_pair("count", &count.to_string());
            }
        }
        self.get(url).await
    }

    /// GET `/scheduled_events/{uuid}`.
    pub async fn get_event(&self, event_uuid: &str) -> Result<Value, ApiError> {
        validate_path_segment("event_uuid", event_uuid)?;
        let url = self.url(&format!("/scheduled_events/{event_uuid}"))?;
        self.get(url).await
    }

    /// GET `/scheduled_events/{uuid}/invitees`.
    pub async fn list_event_invitees(
        &self,
        event_uuid: &str,
        params: ListInviteesParams,
    ) -> Result<Value, ApiError> {
        validate_path_segment("event_uuid", event_uuid)?;
        let mut url = self.url(&format!("/scheduled_events/{event_uuid}/invitees"))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(status) = params.status.as_deref() {
                query.append_pair("status", status);
            }
            if let Some(email) = params.email.as_deref() {
                query.append_pair("email", email);
            }
            if let Some(count) = params.count {
                query.append_pair("count", &count.to_string());
            }
        }
        self.get(url).await
    }

    /// POST `/scheduled_events/{uuid}/cancellation`.
    ///
    /// The reason defaults to a fixed placeholder when the caller supplies
    /// none; Calendly requires the field.
    pub async fn cancel_event(
        &self,
        event_uuid: &str,
        reason: Option<&str>,
    ) -> Result<Value, ApiError> {
        validate_path_segment("event_uuid", event_uuid)?;
        let url = self.url(&format!("/scheduled_events/{event_uuid}/cancellation"))?;
        let body = json!({ "reason": reason.unwrap_or(DEFAULT_CANCEL_REASON) });
        self.post(url, &body).await
    }

    /// GET `/event_types`.
    pub async fn list_event_types(&self, params: ListEventTypesParams) -> Result<Value, ApiError> {
        let mut url = self.url("/event_types")?;
        {
            let mut query = url.query_pairs_mut();
            let user = params.user_uri.or_else(|| {
                if params.organization_uri.is_some() {
                    None
                } else {
                    self.defaults.user_uri.clone()
                }
            });
            if let Some(user) = user.as_deref() {
                query.append_pair("user", user);
            }
            if let Some(organization) = params.organization_uri.as_deref() {
                query.append_pair("organization", organization);
            }
            if let Some(active) = params.active {
                query.append_pair("active", &active.to_string());
            }
            if let Some(count) = params.count {
                query.append_pair("count", &count.to_string());
            }
        }
        self.get(url).await
    }

    /// GET `/event_types/{uuid}`.
    pub async fn get_event_type(&self, event_type_uuid: &str) -> Result<Value, ApiError> {
        validate_path_segment("event_type_uuid", event_type_uuid)?;
        let url = self.url(&format!("/event_types/{event_type_uuid}"))?;
        self.get(url).await
    }

    /// POST `/one_off_event_types`.
    pub async fn create_one_off_event_type(
        &self,
        request: CreateOneOffEventType,
    ) -> Result<Value, ApiError> {
        let host = request
            .host
            .or_else(|| self.defaults.user_uri.clone())
            .ok_or(ApiError::Configuration("CALENDLY_USER_URI"))?;

        let mut body = Map::new();
        body.insert("name".to_string(), Value::String(request.name));
        body.insert("host".to_string(), Value::String(host));
        if let Some(co_hosts) = request.co_hosts {
            body.insert("co_hosts".to_string(), co_hosts);
        }
        body.insert("duration".to_string(), Value::from(request.duration));
        body.insert("timezone".to_string(), Value::String(request.timezone));
        body.insert("date_setting".to_string(), request.date_setting);
        body.insert("location".to_string(), request.location);

        let url = self.url("/one_off_event_types")?;
        self.post(url, &Value::Object(body)).await
    }

    /// GET `/organization_memberships`.
    ///
    /// Falls back to the default user URI, then to the default organization
    /// URI, when the caller scopes by neither.
    pub async fn list_organization_memberships(
        &self,
        params: ListMembershipsParams,
    ) -> Result<Value, ApiError> {
        let mut url = self.url("/organization_memberships")?;
        {
            let mut query = url.query_pairs_mut();
            let explicit_scope = params.user_uri.is_some() || params.organization_uri.is_some();
            let user = params.user_uri.or_else(|| {
                if explicit_scope {
                    None
                } else {
                    self.defaults.user_uri.clone()
                }
            });
            let organization = params.organization_uri.or_else(|| {
                if explicit_scope || user.is_some() {
                    None
                } else {
                    self.defaults.organization_uri.clone()
                }
            });
            if let Some(user) = user.as_deref() {
                query.append_pair("user", user);
            }
            if let Some(organization) = organization.as_deref() {
                query.append_pair("organization", organization);
            }
            if let Some(email) = params.email.as_deref() {
                query.append_pair("email", email);
            }
            if let Some(count) = params.count {
                query.append_pair("count", &count.to_string());
            }
        }
        self.get(url).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get(&self, url: Url) -> Result<Value, ApiError> {
        let token = self.store.bearer_token().await?;
        debug!(%url, "GET");
        let response = self.http.get(url).bearer_auth(token).send().await?;
        parse_json_response(response).await
    }

    async fn post(&self, url: Url, body: &Value) -> Result<Value, ApiError> {
        let token = self.store.bearer_token().await?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        parse_json_response(response).await
    }
}

async fn parse_json_response(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    // Cancellation returns 201 with a body; some endpoints may return an
    // empty 2xx body.
    let text = response.text().await?;
    if text.is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(text)),
    }
}

fn validate_path_segment(name: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() || value.contains(['/', '?', '#']) {
        return Err(ApiError::InvalidPathSegment(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_reject_separators() {
        assert!(validate_path_segment("event_uuid", "ABC123").is_ok());
        assert!(validate_path_segment("event_uuid", "a/b").is_err());
        assert!(validate_path_segment("event_uuid", "a?b").is_err());
        assert!(validate_path_segment("event_uuid", "a#b").is_err());
        assert!(validate_path_segment("event_uuid", "  ").is_err());
    }
}
