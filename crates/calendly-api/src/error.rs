//! Error types shared by the credential store and the API gateway.

/// Errors produced by the credential store and the Calendly gateway.
///
/// Upstream failures are propagated verbatim: this layer does not translate
/// Calendly's error semantics, it only carries them to the dispatcher.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// A required credential or configuration value is missing. The caller
    /// must fix the environment; retrying will not help.
    #[error("missing configuration: {0}")]
    Configuration(&'static str),

    /// No usable bearer credential is available (neither a static API key
    /// nor an OAuth access token).
    #[error(
        "no access token available. Set CALENDLY_API_KEY or complete the OAuth flow \
         (get_oauth_url / exchange_code_for_tokens)"
    )]
    Authentication,

    /// A path parameter would corrupt the request URL.
    #[error("invalid {0}: expected a bare identifier")]
    InvalidPathSegment(&'static str),

    /// The Calendly API returned a non-2xx response. Status and body are
    /// carried unchanged.
    #[error("Calendly API request failed ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Transport-level HTTP failure (connection refused, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A base URL or joined path could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
