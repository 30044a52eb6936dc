//! Email delivery configuration module

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use super::{check_duration, env_parse, env_string, ConfigError, MAX_DURATION_SECONDS};

/// Email delivery provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Log messages instead of sending them
    Mock,
    /// JSON HTTP API of a transactional email provider
    Http,
}

impl FromStr for EmailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" | "log" => Ok(EmailProvider::Mock),
            "http" | "api" => Ok(EmailProvider::Http),
            _ => Err(format!("Invalid email provider: {}", s)),
        }
    }
}

/// Email delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Delivery provider
    #[serde(default = "default_provider")]
    pub provider: EmailProvider,

    /// Provider endpoint receiving `POST` requests with the message JSON
    #[serde(default)]
    pub api_url: Option<String>,

    /// Bearer API key for the provider
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Sender address
    #[serde(default = "default_from")]
    pub from_address: String,

    /// Budget in seconds for one dispatch, retries included
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum delivery attempts for retryable provider failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff between attempts in milliseconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: None,
            api_key: None,
            from_address: default_from(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl EmailConfig {
    /// Timeout for a single provider request
    ///
    /// The dispatch budget is split evenly across attempts, so a timed-out
    /// attempt leaves room for a retry before the whole dispatch gives up.
    pub fn attempt_timeout(&self) -> Duration {
        let total_ms = self
            .timeout_seconds
            .min(MAX_DURATION_SECONDS)
            .saturating_mul(1_000);
        Duration::from_millis((total_ms / u64::from(self.max_retries.max(1))).max(1))
    }

    pub(crate) fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_parse("EMAIL_PROVIDER")? {
            self.provider = v;
        }
        if let Some(v) = env_string("EMAIL_API_URL") {
            self.api_url = Some(v);
        }
        if let Some(v) = env_string("EMAIL_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = env_string("EMAIL_FROM") {
            self.from_address = v;
        }
        if let Some(v) = env_parse("EMAIL_TIMEOUT_SECONDS")? {
            self.timeout_seconds = v;
        }
        if let Some(v) = env_parse("EMAIL_MAX_RETRIES")? {
            self.max_retries = v;
        }
        if let Some(v) = env_parse("EMAIL_RETRY_DELAY_MS")? {
            self.retry_delay_ms = v;
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_duration("email timeout_seconds", self.timeout_seconds)?;
        if self.provider == EmailProvider::Http {
            if self.api_url.is_none() {
                return Err(ConfigError::Missing {
                    key: "EMAIL_API_URL".to_string(),
                });
            }
            if self.api_key.is_none() {
                return Err(ConfigError::Missing {
                    key: "EMAIL_API_KEY".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn default_provider() -> EmailProvider {
    EmailProvider::Mock
}

fn default_from() -> String {
    String::from("HomeKeep <no-reply@homekeep.app>")
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_provider_requires_url_and_key() {
        let mut config = EmailConfig {
            provider: EmailProvider::Http,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing { key: "EMAIL_API_URL".to_string() })
        );

        config.api_url = Some("https://api.mail.test/emails".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing { key: "EMAIL_API_KEY".to_string() })
        );

        config.api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_attempt_timeout_splits_budget() {
        let config = EmailConfig::default();
        assert_eq!(config.attempt_timeout(), Duration::from_millis(3_333));

        let single = EmailConfig {
            max_retries: 1,
            ..Default::default()
        };
        assert_eq!(single.attempt_timeout(), Duration::from_secs(10));

        let zero = EmailConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(zero.attempt_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_mock_provider_needs_nothing() {
        assert!(EmailConfig::default().validate().is_ok());
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = EmailConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
