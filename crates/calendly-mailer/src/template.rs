//! Invitation rendering.
//!
//! Pure string formatting: both representations are produced from the same
//! invitation fields, with no side effects and no template engine.

use crate::Invitation;

pub fn render_html(invitation: &Invitation) -> String {
    let greeting_name = invitation
        .to_name
        .as_deref()
        .unwrap_or(&invitation.to_email);
    let days = invitation.available_days.join(", ");
    let custom_message = invitation
        .custom_message
        .as_deref()
        .map(|message| format!("<p>{message}</p>\n"))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<body style=\"font-family: sans-serif; color: #333;\">\n\
         <h2>You're invited: {event}</h2>\n\
         <p>Hi {greeting_name},</p>\n\
         <p>{host} has invited you to schedule <strong>{event}</strong> \
         ({duration} minutes).</p>\n\
         {custom_message}\
         <p>Available days: {days}</p>\n\
         <p><a href=\"{link}\" style=\"background: #006bff; color: #fff; \
         padding: 10px 18px; border-radius: 4px; text-decoration: none;\">\
         Pick a time</a></p>\n\
         <p>Or open this link: <a href=\"{link}\">{link}</a></p>\n\
         <p>&mdash; {host} ({host_email})</p>\n\
         </body>\n</html>\n",
        event = invitation.event_name,
        host = invitation.host_name,
        host_email = invitation.host_email,
        duration = invitation.duration_minutes,
        link = invitation.booking_link,
    )
}

pub fn render_text(invitation: &Invitation) -> String {
    let greeting_name = invitation
        .to_name
        .as_deref()
        .unwrap_or(&invitation.to_email);
    let days = invitation.available_days.join(", ");
    let custom_message = invitation
        .custom_message
        .as_deref()
        .map(|message| format!("{message}\n\n"))
        .unwrap_or_default();

    format!(
        "You're invited: {event}\n\n\
         Hi {greeting_name},\n\n\
         {host} has invited you to schedule {event} ({duration} minutes).\n\n\
         {custom_message}\
         Available days: {days}\n\n\
         Pick a time: {link}\n\n\
         -- {host} ({host_email})\n",
        event = invitation.event_name,
        host = invitation.host_name,
        host_email = invitation.host_email,
        duration = invitation.duration_minutes,
        link = invitation.booking_link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation() -> Invitation {
        Invitation {
            to_email: "guest@example.com".to_string(),
            to_name: Some("Grace".to_string()),
            subject: "You're invited: Intro Call".to_string(),
            event_name: "Intro Call".to_string(),
            duration_minutes: 30,
            available_days: vec!["2026-09-01".to_string(), "2026-09-02".to_string()],
            booking_link: "https://calendly.com/d/abc?email=guest%40example.com".to_string(),
            custom_message: Some("Looking forward to it!".to_string()),
            host_name: "Ada Host".to_string(),
            host_email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn html_and_text_render_the_same_fields() {
        let invitation = invitation();
        let html = render_html(&invitation);
        let text = render_text(&invitation);

        for rendered in [&html, &text] {
            assert!(rendered.contains("Intro Call"));
            assert!(rendered.contains("30"));
            assert!(rendered.contains("2026-09-01, 2026-09-02"));
            assert!(rendered.contains("Looking forward to it!"));
            assert!(rendered.contains("Ada Host"));
            assert!(rendered.contains(&invitation.booking_link));
        }
        assert!(html.contains("<html>"));
        assert!(!text.contains("<html>"));
    }

    #[test]
    fn greeting_falls_back_to_the_email_address() {
        let mut invitation = invitation();
        invitation.to_name = None;
        invitation.custom_message = None;

        let text = render_text(&invitation);
        assert!(text.contains("Hi guest@example.com"));
    }
}
