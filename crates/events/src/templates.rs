//! HTML email bodies.
//!
//! Every template wraps its content in the same branded layout. Text that
//! originates from users (names, titles) must pass through [`escape_html`]
//! before it is embedded; callers that build `message` for
//! [`notification`] are responsible for that.

use crate::delivery::OutgoingEmail;

/// Subject line of every notification email.
pub const NOTIFICATION_SUBJECT: &str = "Notification from Authors Haven";

pub const ACTIVATION_SUBJECT: &str = "Activate your Authors Haven account";

pub const PASSWORD_RESET_SUBJECT: &str = "Reset your Authors Haven password";

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(body: &str, action_url: &str, action_label: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html><body style=\"font-family: Helvetica, Arial, sans-serif; color: #333;\">\
         <h2 style=\"color: #1a1a1a;\">Authors Haven</h2>\
         <p>{body}</p>\
         <p><a href=\"{url}\" style=\"display: inline-block; padding: 10px 16px; \
         background: #1a73e8; color: #fff; text-decoration: none; border-radius: 4px;\">\
         {action_label}</a></p>\
         <p style=\"font-size: 12px; color: #888;\">You can turn these emails off from \
         your Authors Haven settings.</p>\
         </body></html>",
        url = escape_html(action_url),
    )
}

/// Notification email. `message` is trusted HTML.
pub fn notification(to: Vec<String>, message: &str, url: &str) -> OutgoingEmail {
    OutgoingEmail {
        to,
        subject: NOTIFICATION_SUBJECT.to_string(),
        html: layout(message, url, "View"),
    }
}

/// Account activation email.
pub fn activation(to: &str, first_name: &str, url: &str) -> OutgoingEmail {
    let body = format!(
        "Hi {}, welcome to Authors Haven. Confirm your email address to activate your account.",
        escape_html(first_name)
    );
    OutgoingEmail {
        to: vec![to.to_string()],
        subject: ACTIVATION_SUBJECT.to_string(),
        html: layout(&body, url, "Activate account"),
    }
}

/// Password reset email. The link expires after two hours.
pub fn password_reset(to: &str, first_name: &str, url: &str) -> OutgoingEmail {
    let body = format!(
        "Hi {}, we received a request to reset your password. The link below is valid \
         for two hours; ignore this email if you did not ask for it.",
        escape_html(first_name)
    );
    OutgoingEmail {
        to: vec![to.to_string()],
        subject: PASSWORD_RESET_SUBJECT.to_string(),
        html: layout(&body, url, "Reset password"),
    }
}
