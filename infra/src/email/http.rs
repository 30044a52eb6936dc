//! Transactional email over a JSON HTTP API
//!
//! Posts `{from, to, subject, text, html}` to the configured endpoint with a
//! bearer API key. Rate limiting (429), server errors and timed-out attempts
//! are retried with exponential backoff; other client errors fail immediately.
//! Each attempt gets an even share of the dispatch timeout.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use hk_core::{EmailMessage, EmailSender};
use hk_shared::config::EmailConfig;
use hk_shared::utils::email::mask_email;

use crate::InfrastructureError;

/// Request body sent to the provider
#[derive(Debug, Serialize)]
struct SendEmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

/// Provider response; only the message id is of interest
#[derive(Debug, Default, Deserialize)]
struct SendEmailResponse {
    #[serde(default, alias = "messageId", alias = "message_id")]
    id: Option<String>,
}

/// Email sender backed by an HTTP transactional email API
pub struct HttpEmailSender {
    client: Client,
    api_url: String,
    api_key: String,
    from_address: String,
    max_retries: u32,
    retry_delay_ms: u64,
    attempt_timeout: Duration,
}

impl HttpEmailSender {
    /// Create a new sender from configuration
    ///
    /// Fails when the endpoint or API key is missing.
    pub fn new(config: &EmailConfig) -> Result<Self, InfrastructureError> {
        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| InfrastructureError::Config("EMAIL_API_URL not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| InfrastructureError::Config("EMAIL_API_KEY not set".to_string()))?;

        let attempt_timeout = config.attempt_timeout();
        let client = Client::builder().timeout(attempt_timeout).build()?;

        info!(
            api_url = %api_url,
            from = %config.from_address,
            attempt_timeout_ms = attempt_timeout.as_millis() as u64,
            "HTTP email sender initialized"
        );

        Ok(Self {
            client,
            api_url,
            api_key,
            from_address: config.from_address.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay_ms: config.retry_delay_ms,
            attempt_timeout,
        })
    }

    fn payload<'a>(&'a self, message: &'a EmailMessage) -> SendEmailPayload<'a> {
        SendEmailPayload {
            from: &self.from_address,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            html: &message.html,
        }
    }

    /// Send with retry logic
    async fn send_with_retry(&self, message: &EmailMessage) -> Result<String, InfrastructureError> {
        let masked = mask_email(&message.to);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                "Sending email attempt {}/{} to {} (timeout {:?})",
                attempts, self.max_retries, masked, self.attempt_timeout
            );

            let result = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&self.payload(message))
                .send()
                .await;

            let failure = match result {
                Ok(response) if response.status().is_success() => {
                    let body: SendEmailResponse = response.json().await.unwrap_or_default();
                    let message_id = body.id.unwrap_or_else(|| Uuid::new_v4().to_string());
                    info!(
                        to = %masked,
                        message_id = %message_id,
                        "Email sent successfully"
                    );
                    return Ok(message_id);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    if !is_retryable_status(status) {
                        error!(status = %status, to = %masked, "Email provider rejected request");
                        return Err(InfrastructureError::Email(format!(
                            "Provider rejected request with status {}: {}",
                            status, body
                        )));
                    }
                    format!("status {}: {}", status, body)
                }
                Err(e) if e.is_timeout() || e.is_connect() => e.to_string(),
                Err(e) => {
                    error!(error = %e, to = %masked, "Email request failed");
                    return Err(InfrastructureError::Http(e));
                }
            };

            if attempts >= self.max_retries {
                error!(
                    "Failed to send email after {} attempts: {}",
                    attempts, failure
                );
                return Err(InfrastructureError::Email(format!(
                    "Failed to send email after {} attempts: {}",
                    attempts, failure
                )));
            }

            warn!(
                "Email send failed (attempt {}/{}): {}. Retrying in {:?}",
                attempts, self.max_retries, failure, delay
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, String> {
        self.send_with_retry(message).await.map_err(|e| e.to_string())
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}

/// Rate limiting and server-side failures are worth another attempt
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
