//! Email delivery module
//!
//! Implementations of [`hk_core::EmailSender`]:
//! - HTTP transactional email API (production)
//! - Mock sender that logs instead of sending (development and tests)

mod http;
mod mock;

use std::sync::Arc;

use hk_core::EmailSender;
use hk_shared::config::{EmailConfig, EmailProvider};

use crate::InfrastructureError;

pub use http::HttpEmailSender;
pub use mock::MockEmailSender;

/// Create the email sender for the configured provider
pub fn create_email_sender(config: &EmailConfig) -> Result<Arc<dyn EmailSender>, InfrastructureError> {
    match config.provider {
        EmailProvider::Mock => {
            tracing::warn!("Using mock email sender; verification codes are logged, not delivered");
            Ok(Arc::new(MockEmailSender::new()))
        }
        EmailProvider::Http => Ok(Arc::new(HttpEmailSender::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_sender() {
        let sender = create_email_sender(&EmailConfig::default()).unwrap();
        assert_eq!(sender.provider_name(), "mock");
    }

    #[test]
    fn test_create_http_sender_requires_credentials() {
        let config = EmailConfig {
            provider: EmailProvider::Http,
            ..Default::default()
        };
        assert!(matches!(
            create_email_sender(&config),
            Err(InfrastructureError::Config(_))
        ));
    }

    #[test]
    fn test_create_http_sender() {
        let config = EmailConfig {
            provider: EmailProvider::Http,
            api_url: Some("https://api.mail.test/emails".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let sender = create_email_sender(&config).unwrap();
        assert_eq!(sender.provider_name(), "http");
    }
}
