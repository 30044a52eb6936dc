//! Verification email rendering

use chrono::Duration;

use super::types::EmailMessage;

/// Builds the email carrying a verification code
pub fn render_code_email(app_name: &str, to: &str, code: &str, ttl: Duration) -> EmailMessage {
    let minutes = ttl_minutes(ttl);
    let unit = if minutes == 1 { "minute" } else { "minutes" };

    let subject = format!("Your {} verification code", app_name);

    let text = format!(
        "Your {app} verification code is {code}.\n\n\
         This code expires in {minutes} {unit}. If you did not request it, \
         you can ignore this email.\n",
        app = app_name,
        code = code,
        minutes = minutes,
        unit = unit,
    );

    let html = format!(
        "<!DOCTYPE html>\
         <html><body style=\"font-family:sans-serif\">\
         <p>Your {app} verification code is:</p>\
         <p style=\"font-size:28px;font-weight:bold;letter-spacing:4px\">{code}</p>\
         <p>This code expires in {minutes} {unit}.</p>\
         <p style=\"color:#888\">If you did not request it, you can ignore this email.</p>\
         </body></html>",
        app = html_escape::encode_text(app_name),
        code = code,
        minutes = minutes,
        unit = unit,
    );

    EmailMessage {
        to: to.to_string(),
        subject,
        text,
        html,
    }
}

/// TTL rounded up to whole minutes, at least 1
fn ttl_minutes(ttl: Duration) -> i64 {
    ((ttl.num_seconds().max(0) + 59) / 60).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_code_and_ttl() {
        let message = render_code_email("HomeKeep", "a@x.com", "123456", Duration::minutes(5));

        assert_eq!(message.to, "a@x.com");
        assert_eq!(message.subject, "Your HomeKeep verification code");
        assert!(message.text.contains("123456"));
        assert!(message.text.contains("5 minutes"));
        assert!(message.html.contains("123456"));
        assert!(message.html.contains("5 minutes"));
    }

    #[test]
    fn test_single_minute_wording() {
        let message = render_code_email("HomeKeep", "a@x.com", "123456", Duration::seconds(45));
        assert!(message.text.contains("1 minute."));
    }

    #[test]
    fn test_app_name_is_escaped_in_html() {
        let message = render_code_email("<Home>", "a@x.com", "123456", Duration::minutes(5));
        assert!(message.html.contains("&lt;Home&gt;"));
        assert!(!message.html.contains("<Home>"));
    }

    #[test]
    fn test_ampersand_in_app_name() {
        let message = render_code_email("Home & Co", "a@x.com", "123456", Duration::minutes(5));
        assert!(message.html.contains("Home &amp; Co"));
        assert_eq!(message.subject, "Your Home & Co verification code");
    }
}
