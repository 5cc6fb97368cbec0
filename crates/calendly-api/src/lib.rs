//! Calendly REST API client and OAuth credential store.
//!
//! Two pieces live here:
//!
//! - [`CredentialStore`]: the process-wide bearer credential (static personal
//!   access token or OAuth access/refresh pair) plus the authorization-code
//!   and refresh-token exchanges.
//! - [`CalendlyClient`]: a transparent gateway to the scheduling REST API.
//!   It marshals parameters, substitutes configured default user/organization
//!   URIs, and passes upstream responses and errors through unchanged.

mod auth;
mod client;
mod error;
mod types;

pub use auth::{CredentialConfig, CredentialStore, TokenPair, TokenResponse};
pub use client::CalendlyClient;
pub use error::ApiError;
pub use types::{
    CreateOneOffEventType, Defaults, ListEventTypesParams, ListEventsParams, ListInviteesParams,
    ListMembershipsParams,
};
