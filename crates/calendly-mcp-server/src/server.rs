//! Tool dispatcher and MCP server handler.
//!
//! [`CalendlyServer::dispatch`] is the routing table: one arm per advertised
//! tool, each one pulling its arguments out of the request object and
//! delegating to the gateway, the credential store, or the mailer. The
//! [`ServerHandler`] impl is a thin protocol shim over it.
//!
//! Error placement follows the two-layer taxonomy in [`crate::error`]:
//! protocol errors become MCP invalid-params errors, everything else is
//! reported inside the tool result where the calling model can read it.

use std::sync::Arc;

use calendly_api::{
    CalendlyClient, CreateOneOffEventType, CredentialStore, ListEventTypesParams, ListEventsParams,
    ListInviteesParams, ListMembershipsParams,
};
use calendly_mailer::{Invitation, Mailer};
use rmcp::{
    ErrorData, RoleServer,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use serde_json::{Value, json};
use tracing::debug;

use crate::catalog;
use crate::error::ToolError;
use crate::workflow::{self, WorkflowRequest};

#[derive(Clone)]
pub struct CalendlyServer {
    store: Arc<CredentialStore>,
    gateway: Arc<CalendlyClient>,
    mailer: Option<Arc<Mailer>>,
    tools: Arc<Vec<Tool>>,
}

impl CalendlyServer {
    pub fn new(
        store: Arc<CredentialStore>,
        gateway: Arc<CalendlyClient>,
        mailer: Option<Arc<Mailer>>,
    ) -> Self {
        let tools = Arc::new(catalog::catalog(mailer.is_some()));
        Self {
            store,
            gateway,
            mailer,
            tools,
        }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Routes one tool call to its handler.
    pub async fn dispatch(&self, name: &str, args: &JsonObject) -> Result<Value, ToolError> {
        debug!(tool = name, "dispatching tool call");
        match name {
            "get_oauth_url" => {
                let redirect_uri = require_str(args, "redirect_uri")?;
                let state = optional_str(args, "state");
                let url = self.store.authorization_url(&redirect_uri, state.as_deref())?;
                Ok(json!({ "authorization_url": url }))
            }
            "exchange_code_for_tokens" => {
                let code = require_str(args, "code")?;
                let redirect_uri = require_str(args, "redirect_uri")?;
                let response = self.store.exchange_code(&code, &redirect_uri).await?;
                Ok(serde_json::to_value(response).unwrap_or(Value::Null))
            }
            "refresh_access_token" => {
                // Falls back to the stored refresh token when none is given.
                let refresh_token = optional_str(args, "refresh_token");
                let response = self.store.refresh(refresh_token.as_deref()).await?;
                Ok(serde_json::to_value(response).unwrap_or(Value::Null))
            }
            "get_current_user" => Ok(self.gateway.current_user().await?),
            "list_events" => {
                let params = ListEventsParams {
                    user_uri: optional_str(args, "user_uri"),
                    organization_uri: optional_str(args, "organization_uri"),
                    status: optional_str(args, "status"),
                    min_start_time: optional_str(args, "min_start_time"),
                    max_start_time: optional_str(args, "max_start_time"),
                    count: optional_count(args, "count")?,
                };
                Ok(self.gateway.list_events(params).await?)
            }
            "get_event" => {
                let event_uuid = require_str(args, "event_uuid")?;
                Ok(self.gateway.get_event(&event_uuid).await?)
            }
            "list_event_invitees" => {
                let event_uuid = require_str(args, "event_uuid")?;
                let params = ListInviteesParams {
                    status: optional_str(args, "status"),
                    email: optional_str(args, "email"),
                    count: optional_count(args, "count")?,
                };
                Ok(self.gateway.list_event_invitees(&event_uuid, params).await?)
            }
            "cancel_event" => {
                let event_uuid = require_str(args, "event_uuid")?;
                let reason = optional_str(args, "reason");
                Ok(self
                    .gateway
                    .cancel_event(&event_uuid, reason.as_deref())
                    .await?)
            }
            "list_event_types" => {
                let params = ListEventTypesParams {
                    user_uri: optional_str(args, "user_uri"),
                    organization_uri: optional_str(args, "organization_uri"),
                    active: optional_bool(args, "active")?,
                    count: optional_count(args, "count")?,
                };
                Ok(self.gateway.list_event_types(params).await?)
            }
            "get_event_type" => {
                // Older clients send the id under `event_uuid`.
                let uuid = optional_str(args, "event_type_uuid")
                    .or_else(|| optional_str(args, "event_uuid"))
                    .ok_or(ToolError::MissingArgument("event_type_uuid"))?;
                Ok(self.gateway.get_event_type(&uuid).await?)
            }
            "create_one_off_event_type" => {
                let request = CreateOneOffEventType {
                    name: require_str(args, "name")?,
                    host: optional_str(args, "host"),
                    co_hosts: args.get("co_hosts").cloned().filter(|v| !v.is_null()),
                    duration: require_u64(args, "duration")?,
                    timezone: require_str(args, "timezone")?,
                    date_setting: require_value(args, "date_setting")?,
                    location: require_value(args, "location")?,
                };
                Ok(self.gateway.create_one_off_event_type(request).await?)
            }
            "list_organization_memberships" => {
                let params = ListMembershipsParams {
                    user_uri: optional_str(args, "user_uri"),
                    organization_uri: optional_str(args, "organization_uri"),
                    email: optional_str(args, "email"),
                    count: optional_count(args, "count")?,
                };
                Ok(self.gateway.list_organization_memberships(params).await?)
            }
            "send_booking_invitation" => self.send_booking_invitation(args).await,
            "create_and_invite_workflow" => {
                let mailer = self.mailer()?;
                let request = WorkflowRequest {
                    event_name: require_str(args, "event_name")?,
                    duration: require_u64(args, "duration")?,
                    availability_days: optional_string_array(args, "availability_days")?
                        .unwrap_or_default(),
                    invitee_email: require_str(args, "invitee_email")?,
                    invitee_name: optional_str(args, "invitee_name"),
                    event_description: optional_str(args, "event_description"),
                    custom_message: optional_str(args, "custom_message"),
                    timezone: optional_str(args, "timezone"),
                };
                Ok(workflow::create_and_invite(&self.gateway, mailer, request).await)
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    async fn send_booking_invitation(&self, args: &JsonObject) -> Result<Value, ToolError> {
        let mailer = self.mailer()?;
        let to_email = require_str(args, "to_email")?;
        let event_name = require_str(args, "event_name")?;
        let event_duration = require_u64(args, "event_duration")?;
        let available_days = optional_string_array(args, "available_days")?
            .ok_or(ToolError::MissingArgument("available_days"))?;
        let booking_link = require_str(args, "booking_link")?;

        // The sender identity comes from the authenticated Calendly user.
        let user = self.gateway.current_user().await?;
        let resource = &user["resource"];
        let host_name = resource["name"].as_str().unwrap_or("Your host").to_string();
        let host_email = resource["email"].as_str().unwrap_or_default().to_string();

        let invitation = Invitation {
            to_email: to_email.clone(),
            to_name: optional_str(args, "to_name"),
            subject: optional_str(args, "subject")
                .unwrap_or_else(|| format!("You're invited: {event_name}")),
            event_name,
            duration_minutes: event_duration,
            available_days,
            booking_link: booking_link.clone(),
            custom_message: optional_str(args, "custom_message"),
            host_name,
            host_email,
        };
        let outcome = mailer.send(&invitation).await;

        Ok(json!({
            "provider": mailer.provider_name(),
            "to": to_email,
            "booking_link": booking_link,
            "outcome": outcome,
        }))
    }

    fn mailer(&self) -> Result<&Mailer, ToolError> {
        self.mailer.as_deref().ok_or(ToolError::FeatureDisabled)
    }
}

impl ServerHandler for CalendlyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some(
                "Calendly scheduling tools: OAuth setup, event and event-type queries, \
                 cancellation, one-off event creation, and booking invitation emails."
                    .to_string(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        let tools = Arc::clone(&self.tools);
        async move { Ok(ListToolsResult::with_all_items(tools.as_ref().clone())) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let args = request.arguments.unwrap_or_default();
            match self.dispatch(&request.name, &args).await {
                Ok(value) => {
                    let text = serde_json::to_string_pretty(&value)
                        .unwrap_or_else(|_| value.to_string());
                    Ok(CallToolResult::success(vec![Content::text(text)]))
                }
                Err(error) if error.is_protocol_error() => {
                    Err(ErrorData::invalid_params(error.to_string(), None))
                }
                Err(error) => Ok(CallToolResult::error(vec![Content::text(
                    error.to_string(),
                )])),
            }
        }
    }
}

fn optional_str(args: &JsonObject, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn require_str(args: &JsonObject, key: &'static str) -> Result<String, ToolError> {
    optional_str(args, key).ok_or(ToolError::MissingArgument(key))
}

/// Accepts a JSON number or a numeric string.
fn require_u64(args: &JsonObject, key: &'static str) -> Result<u64, ToolError> {
    let value = args
        .get(key)
        .filter(|value| !value.is_null())
        .ok_or(ToolError::MissingArgument(key))?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or(ToolError::InvalidArgument {
            name: key,
            reason: "expected a non-negative integer",
        })
}

fn optional_count(args: &JsonObject, key: &'static str) -> Result<Option<u32>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .map(Some)
            .ok_or(ToolError::InvalidArgument {
                name: key,
                reason: "expected a non-negative integer",
            }),
    }
}

fn optional_bool(args: &JsonObject, key: &'static str) -> Result<Option<bool>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(Value::String(value)) => match value.to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ToolError::InvalidArgument {
                name: key,
                reason: "expected a boolean",
            }),
        },
        Some(_) => Err(ToolError::InvalidArgument {
            name: key,
            reason: "expected a boolean",
        }),
    }
}

/// Required structured argument, passed through as raw JSON.
fn require_value(args: &JsonObject, key: &'static str) -> Result<Value, ToolError> {
    args.get(key)
        .filter(|value| !value.is_null())
        .cloned()
        .ok_or(ToolError::MissingArgument(key))
}

/// Array of strings; a bare string is treated as a one-element array.
fn optional_string_array(
    args: &JsonObject,
    key: &'static str,
) -> Result<Option<Vec<String>>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(vec![value.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(ToolError::InvalidArgument {
                        name: key,
                        reason: "expected an array of strings",
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(ToolError::InvalidArgument {
            name: key,
            reason: "expected an array of strings",
        }),
    }
}
