//! Composite create-and-invite workflow.
//!
//! Three steps run in order: resolve the host user, create a one-off event
//! type, email the invitee a booking link. Each step is recorded in the
//! report as it completes. There is no rollback: an event type created
//! before a later step fails stays created, and the report says so.

use calendly_api::{CalendlyClient, CreateOneOffEventType};
use calendly_mailer::{Invitation, Mailer};
use chrono::{Days, Utc};
use serde_json::{Value, json};
use tracing::{info, warn};
use url::Url;

const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_RANGE_DAYS: u64 = 90;
/// Recorded on the event location when the caller supplies no description.
const DEFAULT_AVAILABILITY_NOTE: &str = "Available 09:00-17:00";
const FALLBACK_BOOKING_BASE: &str = "https://calendly.com/d/";

pub struct WorkflowRequest {
    pub event_name: String,
    pub duration: u64,
    pub availability_days: Vec<String>,
    pub invitee_email: String,
    pub invitee_name: Option<String>,
    pub event_description: Option<String>,
    pub custom_message: Option<String>,
    pub timezone: Option<String>,
}

/// Runs the workflow to the furthest reachable step and reports the result.
///
/// The report is always `Ok`-shaped JSON: `status` is `completed` when every
/// step succeeded, `partial` when the event type exists but the email did
/// not go out, and `failed` when no booking link was produced.
pub async fn create_and_invite(
    gateway: &CalendlyClient,
    mailer: &Mailer,
    request: WorkflowRequest,
) -> Value {
    let mut steps = Vec::new();

    // Step 1: resolve the host from the authenticated user.
    let user = match gateway.current_user().await {
        Ok(user) => user,
        Err(error) => {
            warn!(%error, "workflow could not resolve the host user");
            steps.push(step_failed("resolve_host", &error.to_string()));
            return report("failed", steps, None, None);
        }
    };
    let resource = &user["resource"];
    let host_uri = resource["uri"].as_str().map(str::to_string);
    let host_name = resource["name"].as_str().unwrap_or("Your host").to_string();
    let host_email = resource["email"].as_str().unwrap_or_default().to_string();
    steps.push(step_completed(
        "resolve_host",
        json!({ "host": host_uri, "name": host_name }),
    ));

    // Step 2: create the one-off event type.
    let (start_date, end_date) = date_range(&request.availability_days);
    let location_note = request
        .event_description
        .clone()
        .unwrap_or_else(|| DEFAULT_AVAILABILITY_NOTE.to_string());
    let created = gateway
        .create_one_off_event_type(CreateOneOffEventType {
            name: request.event_name.clone(),
            host: host_uri,
            co_hosts: None,
            duration: request.duration,
            timezone: request
                .timezone
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            date_setting: json!({
                "type": "date_range",
                "start_date": start_date,
                "end_date": end_date,
            }),
            location: json!({ "kind": "custom", "location": location_note }),
        })
        .await;
    let created = match created {
        Ok(created) => created,
        Err(error) => {
            warn!(%error, "workflow could not create the one-off event type");
            steps.push(step_failed("create_event_type", &error.to_string()));
            return report("failed", steps, None, None);
        }
    };
    let type_resource = &created["resource"];
    let event_type_uri = type_resource["uri"].as_str().unwrap_or_default().to_string();
    steps.push(step_completed(
        "create_event_type",
        json!({ "uri": event_type_uri, "name": request.event_name }),
    ));

    // Step 3: build the booking link and send the invitation.
    let booking_link = booking_link(
        type_resource["scheduling_url"].as_str(),
        &event_type_uri,
        &request.invitee_email,
    );
    let available_days = if request.availability_days.is_empty() {
        vec![format!("{start_date} to {end_date}")]
    } else {
        request.availability_days.clone()
    };
    let invitation = Invitation {
        to_email: request.invitee_email.clone(),
        to_name: request.invitee_name.clone(),
        subject: format!("You're invited: {}", request.event_name),
        event_name: request.event_name.clone(),
        duration_minutes: request.duration,
        available_days,
        booking_link: booking_link.clone(),
        custom_message: request.custom_message.clone(),
        host_name,
        host_email,
    };
    let outcome = mailer.send(&invitation).await;

    let status = if outcome.success {
        steps.push(step_completed(
            "send_invitation",
            json!({ "to": request.invitee_email, "message_id": outcome.message_id }),
        ));
        info!(to = %request.invitee_email, "workflow completed");
        "completed"
    } else {
        steps.push(step_failed(
            "send_invitation",
            outcome.error.as_deref().unwrap_or("send failed"),
        ));
        "partial"
    };
    report(status, steps, Some(booking_link), Some(event_type_uri))
}

/// Explicit days win; otherwise the range opens today and spans the default
/// window.
fn date_range(days: &[String]) -> (String, String) {
    let mut sorted: Vec<&String> = days.iter().collect();
    sorted.sort();
    match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => ((*first).clone(), (*last).clone()),
        _ => {
            let today = Utc::now().date_naive();
            let end = today
                .checked_add_days(Days::new(DEFAULT_RANGE_DAYS))
                .unwrap_or(today);
            (
                today.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
            )
        }
    }
}

/// Prefers the scheduling URL Calendly returned; otherwise reconstructs a
/// link from the event type id. The invitee email rides along as a query
/// parameter so the booking page can prefill it.
fn booking_link(scheduling_url: Option<&str>, event_type_uri: &str, email: &str) -> String {
    let base = scheduling_url.map_or_else(
        || {
            let id = event_type_uri.rsplit('/').next().unwrap_or_default();
            format!("{FALLBACK_BOOKING_BASE}{id}")
        },
        str::to_string,
    );
    match Url::parse(&base) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("email", email);
            url.into()
        }
        Err(_) => format!("{base}?email={email}"),
    }
}

fn step_completed(step: &str, detail: Value) -> Value {
    json!({ "step": step, "status": "completed", "detail": detail })
}

fn step_failed(step: &str, error: &str) -> Value {
    json!({ "step": step, "status": "failed", "error": error })
}

fn report(
    status: &str,
    steps: Vec<Value>,
    booking_link: Option<String>,
    event_type_uri: Option<String>,
) -> Value {
    json!({
        "workflow": "create_and_invite",
        "status": status,
        "steps": steps,
        "booking_link": booking_link,
        "event_type_uri": event_type_uri,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_days_bound_the_date_range() {
        let days = vec![
            "2026-09-03".to_string(),
            "2026-09-01".to_string(),
            "2026-09-02".to_string(),
        ];
        let (start, end) = date_range(&days);
        assert_eq!(start, "2026-09-01");
        assert_eq!(end, "2026-09-03");
    }

    #[test]
    fn empty_days_open_the_default_window_today() {
        let (start, end) = date_range(&[]);
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(start, today);
        assert!(end > start);
    }

    #[test]
    fn booking_link_prefers_the_scheduling_url() {
        let link = booking_link(
            Some("https://calendly.com/d/abc-def"),
            "https://api.calendly.com/one_off_event_types/XYZ",
            "guest@example.com",
        );
        assert_eq!(link, "https://calendly.com/d/abc-def?email=guest%40example.com");
    }

    #[test]
    fn booking_link_falls_back_to_the_event_type_id() {
        let link = booking_link(
            None,
            "https://api.calendly.com/one_off_event_types/XYZ",
            "guest@example.com",
        );
        assert_eq!(
            link,
            "https://calendly.com/d/XYZ?email=guest%40example.com"
        );
    }
}
