//! Advertised tool catalogue.
//!
//! The catalogue is fixed at startup. When no email provider is configured
//! the two email tools are left out entirely, so clients never see tools
//! they cannot call.

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde_json::{Value, json};

pub fn catalog(email_enabled: bool) -> Vec<Tool> {
    let mut tools = vec![
        tool(
            "get_oauth_url",
            "Build the Calendly OAuth authorization URL to send a user to the consent screen.",
            json!({
                "type": "object",
                "properties": {
                    "redirect_uri": { "type": "string", "description": "Registered OAuth redirect URI" },
                    "state": { "type": "string", "description": "Opaque CSRF state echoed back on the callback" }
                },
                "required": ["redirect_uri"]
            }),
        ),
        tool(
            "exchange_code_for_tokens",
            "Exchange an OAuth authorization code for an access/refresh token pair and store it.",
            json!({
                "type": "object",
                "properties": {
                    "code": { "type": "string", "description": "Authorization code from the OAuth callback" },
                    "redirect_uri": { "type": "string", "description": "The redirect URI used in the authorization request" }
                },
                "required": ["code", "redirect_uri"]
            }),
        ),
        tool(
            "refresh_access_token",
            "Refresh the Calendly access token. Uses the stored refresh token when none is supplied.",
            json!({
                "type": "object",
                "properties": {
                    "refresh_token": { "type": "string", "description": "Refresh token to use instead of the stored one" }
                }
            }),
        ),
        tool(
            "get_current_user",
            "Fetch the currently authenticated Calendly user.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            "list_events",
            "List scheduled events, scoped to a user or organization URI.",
            json!({
                "type": "object",
                "properties": {
                    "user_uri": { "type": "string", "description": "Scope to this user URI (defaults to the configured user)" },
                    "organization_uri": { "type": "string", "description": "Scope to this organization URI" },
                    "status": { "type": "string", "enum": ["active", "canceled"] },
                    "min_start_time": { "type": "string", "description": "ISO 8601 lower bound on start time" },
                    "max_start_time": { "type": "string", "description": "ISO 8601 upper bound on start time" },
                    "count": { "type": "integer", "minimum": 1, "maximum": 100 }
                }
            }),
        ),
        tool(
            "get_event",
            "Fetch one scheduled event by UUID.",
            json!({
                "type": "object",
                "properties": {
                    "event_uuid": { "type": "string", "description": "Scheduled event UUID" }
                },
                "required": ["event_uuid"]
            }),
        ),
        tool(
            "list_event_invitees",
            "List the invitees of a scheduled event.",
            json!({
                "type": "object",
                "properties": {
                    "event_uuid": { "type": "string", "description": "Scheduled event UUID" },
                    "status": { "type": "string", "enum": ["active", "canceled"] },
                    "email": { "type": "string", "description": "Filter by invitee email" },
                    "count": { "type": "integer", "minimum": 1, "maximum": 100 }
                },
                "required": ["event_uuid"]
            }),
        ),
        tool(
            "cancel_event",
            "Cancel a scheduled event, with an optional reason.",
            json!({
                "type": "object",
                "properties": {
                    "event_uuid": { "type": "string", "description": "Scheduled event UUID" },
                    "reason": { "type": "string", "description": "Cancellation reason shown to invitees" }
                },
                "required": ["event_uuid"]
            }),
        ),
        tool(
            "list_event_types",
            "List event types for a user or organization.",
            json!({
                "type": "object",
                "properties": {
                    "user_uri": { "type": "string", "description": "Scope to this user URI (defaults to the configured user)" },
                    "organization_uri": { "type": "string", "description": "Scope to this organization URI" },
                    "active": { "type": "boolean", "description": "Only active event types when true" },
                    "count": { "type": "integer", "minimum": 1, "maximum": 100 }
                }
            }),
        ),
        tool(
            "get_event_type",
            "Fetch one event type by UUID.",
            json!({
                "type": "object",
                "properties": {
                    "event_type_uuid": { "type": "string", "description": "Event type UUID (also accepted under the older event_uuid key)" }
                },
                "required": ["event_type_uuid"]
            }),
        ),
        tool(
            "create_one_off_event_type",
            "Create a one-off (ad hoc) event type with an explicit date range and location.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Event type name" },
                    "host": { "type": "string", "description": "Host user URI (defaults to the configured user)" },
                    "co_hosts": { "type": "array", "items": { "type": "string" }, "description": "Co-host user URIs" },
                    "duration": { "type": "integer", "description": "Duration in minutes" },
                    "timezone": { "type": "string", "description": "IANA timezone, e.g. America/New_York" },
                    "date_setting": { "type": "object", "description": "Calendly date_setting object (type, start_date, end_date)" },
                    "location": { "type": "object", "description": "Calendly location object (kind plus kind-specific fields)" }
                },
                "required": ["name", "duration", "timezone", "date_setting", "location"]
            }),
        ),
        tool(
            "list_organization_memberships",
            "List organization memberships, scoped to a user or organization URI.",
            json!({
                "type": "object",
                "properties": {
                    "user_uri": { "type": "string", "description": "Scope to this user URI" },
                    "organization_uri": { "type": "string", "description": "Scope to this organization URI" },
                    "email": { "type": "string", "description": "Filter by member email" },
                    "count": { "type": "integer", "minimum": 1, "maximum": 100 }
                }
            }),
        ),
    ];

    if email_enabled {
        tools.push(tool(
            "send_booking_invitation",
            "Email a booking invitation with a scheduling link via the configured provider.",
            json!({
                "type": "object",
                "properties": {
                    "to_email": { "type": "string", "description": "Recipient email address" },
                    "to_name": { "type": "string", "description": "Recipient display name" },
                    "event_name": { "type": "string", "description": "Name of the event being offered" },
                    "event_duration": { "type": "integer", "description": "Duration in minutes" },
                    "available_days": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Days offered to the invitee, e.g. [\"2026-09-01\", \"2026-09-02\"]"
                    },
                    "booking_link": { "type": "string", "description": "Scheduling link the invitee should open" },
                    "subject": { "type": "string", "description": "Override for the email subject" },
                    "custom_message": { "type": "string", "description": "Personal note included in the body" }
                },
                "required": ["to_email", "event_name", "event_duration", "available_days", "booking_link"]
            }),
        ));
        tools.push(tool(
            "create_and_invite_workflow",
            "Create a one-off event type and email the invitee a booking link in one step.",
            json!({
                "type": "object",
                "properties": {
                    "event_name": { "type": "string", "description": "Name of the event to create" },
                    "duration": { "type": "integer", "description": "Duration in minutes" },
                    "availability_days": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Days to offer, e.g. [\"2026-09-01\", \"2026-09-02\"]. Defaults to the next 90 days."
                    },
                    "invitee_email": { "type": "string", "description": "Invitee email address" },
                    "invitee_name": { "type": "string", "description": "Invitee display name" },
                    "event_description": { "type": "string", "description": "Description recorded on the event location" },
                    "custom_message": { "type": "string", "description": "Personal note included in the invitation email" },
                    "timezone": { "type": "string", "description": "IANA timezone (defaults to UTC)" }
                },
                "required": ["event_name", "duration", "invitee_email"]
            }),
        ));
    }

    tools
}

fn tool(name: &'static str, description: &'static str, schema: Value) -> Tool {
    Tool::new(name, description, Arc::new(object(schema)))
}

fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
