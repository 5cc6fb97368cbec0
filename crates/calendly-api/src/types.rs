//! Parameter objects for the gateway methods.
//!
//! Every optional field that is `None` is simply absent from the outgoing
//! request; the gateway never sends empty values.

use serde_json::Value;

/// Ambient default identifiers substituted when a call omits a scope.
#[derive(Debug, Default, Clone)]
pub struct Defaults {
    pub user_uri: Option<String>,
    pub organization_uri: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ListEventsParams {
    pub user_uri: Option<String>,
    pub organization_uri: Option<String>,
    pub status: Option<String>,
    pub min_start_time: Option<String>,
    pub max_start_time: Option<String>,
    pub count: Option<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct ListInviteesParams {
    pub status: Option<String>,
    pub email: Option<String>,
    pub count: Option<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct ListEventTypesParams {
    pub user_uri: Option<String>,
    pub organization_uri: Option<String>,
    pub active: Option<bool>,
    pub count: Option<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct ListMembershipsParams {
    pub user_uri: Option<String>,
    pub organization_uri: Option<String>,
    pub email: Option<String>,
    pub count: Option<u32>,
}

/// Request body for `POST /one_off_event_types`.
///
/// `date_setting` and `location` are passed through as raw JSON; Calendly
/// validates their shape.
#[derive(Debug, Clone)]
pub struct CreateOneOffEventType {
    pub name: String,
    /// Host user URI. Falls back to the configured default user URI.
    pub host: Option<String>,
    pub co_hosts: Option<Value>,
    pub duration: u64,
    pub timezone: String,
    pub date_setting: Value,
    pub location: Value,
}
