//! OAuth credential store.
//!
//! Holds the process-wide bearer credential: either a static personal access
//! token or an OAuth access/refresh pair. The pair is mutated in place when a
//! code exchange or refresh succeeds. Tokens are never persisted here and
//! expiry is never tracked; refreshing is an explicit caller action.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ApiError;

const DEFAULT_AUTH_ENDPOINT: &str = "https://auth.calendly.com";

/// Startup configuration for the credential store.
///
/// Every field is optional: which authentication mode is usable is decided at
/// the first call that needs it, not at construction.
#[derive(Debug, Default, Clone)]
pub struct CredentialConfig {
    /// Static personal access token. Takes precedence over OAuth tokens.
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Override for the OAuth endpoint base URL (tests).
    pub auth_base_url: Option<String>,
}

/// The mutable access/refresh pair.
#[derive(Debug, Default, Clone)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Token endpoint response, returned to the caller in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Owned, single-writer store for the current bearer credential.
///
/// Token mutation happens under a write lock so that a concurrent reader can
/// never observe a half-updated access/refresh pair.
pub struct CredentialStore {
    api_key: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_base: Url,
    http: reqwest::Client,
    tokens: RwLock<TokenPair>,
}

impl CredentialStore {
    pub fn new(config: CredentialConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("calendly-mcp/0.1"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        let auth_base = Url::parse(
            config
                .auth_base_url
                .as_deref()
                .unwrap_or(DEFAULT_AUTH_ENDPOINT),
        )?;

        Ok(Self {
            api_key: config.api_key,
            client_id: config.client_id,
            client_secret: config.client_secret,
            auth_base,
            http,
            tokens: RwLock::new(TokenPair {
                access_token: config.access_token,
                refresh_token: config.refresh_token,
            }),
        })
    }

    /// Builds the authorization-code URL for the OAuth consent screen.
    ///
    /// Query parameter order is fixed: `client_id`, `response_type`,
    /// `redirect_uri`, then `state` when supplied.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: Option<&str>,
    ) -> Result<String, ApiError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(ApiError::Configuration("CALENDLY_CLIENT_ID"))?;

        let mut url = self.auth_base.join("/oauth/authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", client_id);
            query.append_pair("response_type", "code");
            query.append_pair("redirect_uri", redirect_uri);
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        Ok(url.into())
    }

    /// Exchanges an authorization code for a token pair and stores it.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, ApiError> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .await?;
        self.apply(&response).await;
        Ok(response)
    }

    /// Refreshes the access token.
    ///
    /// An explicitly supplied refresh token wins over the stored one. The
    /// stored pair is replaced on success.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenResponse, ApiError> {
        let token = match refresh_token {
            Some(token) => token.to_string(),
            None => self
                .tokens
                .read()
                .await
                .refresh_token
                .clone()
                .ok_or(ApiError::Configuration("CALENDLY_REFRESH_TOKEN"))?,
        };

        let response = self
            .token_request(&[("grant_type", "refresh_token"), ("refresh_token", &token)])
            .await?;
        self.apply(&response).await;
        Ok(response)
    }

    /// Returns the bearer token to attach to the next upstream request.
    ///
    /// Static key first, then the stored access token. Evaluated fresh on
    /// every call; expiry is the caller's concern.
    pub async fn bearer_token(&self) -> Result<String, ApiError> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        self.tokens
            .read()
            .await
            .access_token
            .clone()
            .ok_or(ApiError::Authentication)
    }

    /// Snapshot of the stored pair (diagnostics and tests).
    pub async fn token_pair(&self) -> TokenPair {
        self.tokens.read().await.clone()
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, ApiError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(ApiError::Configuration("CALENDLY_CLIENT_ID"))?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or(ApiError::Configuration("CALENDLY_CLIENT_SECRET"))?;

        let basic = BASE64.encode(format!("{client_id}:{client_secret}"));
        let url = self.auth_base.join("/oauth/token")?;

        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Basic {basic}"))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    async fn apply(&self, response: &TokenResponse) {
        let mut tokens = self.tokens.write().await;
        tokens.access_token = Some(response.access_token.clone());
        if let Some(refresh) = &response.refresh_token {
            tokens.refresh_token = Some(refresh.clone());
        }
        debug!("stored new OAuth token pair");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(config: CredentialConfig) -> CredentialStore {
        CredentialStore::new(config).expect("store should build")
    }

    #[test]
    fn authorization_url_query_is_order_stable() {
        let store = store(CredentialConfig {
            client_id: Some("abc".to_string()),
            ..CredentialConfig::default()
        });

        let url = store
            .authorization_url("https://cb", Some("xyz"))
            .expect("url should build");

        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        assert_eq!(
            query,
            "client_id=abc&response_type=code&redirect_uri=https%3A%2F%2Fcb&state=xyz"
        );
    }

    #[test]
    fn authorization_url_omits_state_when_absent() {
        let store = store(CredentialConfig {
            client_id: Some("abc".to_string()),
            ..CredentialConfig::default()
        });

        let url = store
            .authorization_url("https://cb", None)
            .expect("url should build");
        assert!(!url.contains("state="));
    }

    #[test]
    fn authorization_url_requires_client_id() {
        let store = store(CredentialConfig::default());
        let error = store
            .authorization_url("https://cb", None)
            .expect_err("missing client id should fail");
        assert!(matches!(error, ApiError::Configuration("CALENDLY_CLIENT_ID")));
    }

    #[tokio::test]
    async fn static_api_key_takes_precedence_over_access_token() {
        let store = store(CredentialConfig {
            api_key: Some("pat_123".to_string()),
            access_token: Some("oauth_456".to_string()),
            ..CredentialConfig::default()
        });

        assert_eq!(store.bearer_token().await.unwrap(), "pat_123");
    }

    #[tokio::test]
    async fn bearer_token_fails_without_any_credential() {
        let store = store(CredentialConfig::default());
        let error = store.bearer_token().await.expect_err("should fail");
        assert!(matches!(error, ApiError::Authentication));
    }

    #[tokio::test]
    async fn refresh_without_stored_or_explicit_token_is_a_config_error() {
        let store = store(CredentialConfig {
            client_id: Some("abc".to_string()),
            client_secret: Some("shh".to_string()),
            ..CredentialConfig::default()
        });

        let error = store.refresh(None).await.expect_err("should fail");
        assert!(matches!(
            error,
            ApiError::Configuration("CALENDLY_REFRESH_TOKEN")
        ));
    }
}
