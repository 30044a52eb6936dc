//! Mock email sender
//!
//! Logs messages through tracing instead of sending them and keeps the last
//! message around so tests and local development can read the code.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use hk_core::{EmailMessage, EmailSender};
use hk_shared::utils::email::mask_email;

/// Mock email sender for development and testing
#[derive(Clone, Default)]
pub struct MockEmailSender {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Last message accepted
    last_message: Arc<Mutex<Option<EmailMessage>>>,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Default::default()
        }
    }

    /// Get the total number of messages sent
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<EmailMessage> {
        self.last_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The six-digit code in the last message, if any
    pub fn last_code(&self) -> Option<String> {
        let message = self.last_message()?;
        message
            .text
            .split(|c: char| !c.is_ascii_digit())
            .find(|token| token.len() == hk_core::CODE_LENGTH)
            .map(str::to_string)
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, String> {
        let masked = mask_email(&message.to);

        if self.simulate_failure {
            warn!(
                target: "email_service",
                provider = "mock",
                to = %masked,
                "Mock email sender simulating failure"
            );
            return Err("Simulated email delivery failure".to_string());
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            target: "email_service",
            provider = "mock",
            to = %masked,
            message_id = %message_id,
            subject = %message.subject,
            count = count,
            "Email sent successfully (mock)"
        );
        debug!(target: "email_service", body = %message.text, "Mock email body");

        *self
            .last_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.clone());

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hk_core::render_code_email;

    #[tokio::test]
    async fn test_mock_send_records_message() {
        let sender = MockEmailSender::new();
        let message = render_code_email("HomeKeep", "a@x.com", "482913", Duration::minutes(5));

        let id = sender.send_email(&message).await.unwrap();

        assert!(id.starts_with("mock_"));
        assert_eq!(sender.message_count(), 1);
        assert_eq!(sender.last_message(), Some(message));
        assert_eq!(sender.last_code().as_deref(), Some("482913"));
    }

    #[tokio::test]
    async fn test_simulated_failure() {
        let sender = MockEmailSender::failing();
        let message = render_code_email("HomeKeep", "a@x.com", "482913", Duration::minutes(5));

        assert!(sender.send_email(&message).await.is_err());
        assert_eq!(sender.message_count(), 0);
        assert!(sender.last_code().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let sender = MockEmailSender::new();
        let clone = sender.clone();
        sender.message_count.fetch_add(1, Ordering::SeqCst);
        assert_eq!(clone.message_count(), 1);
    }
}
