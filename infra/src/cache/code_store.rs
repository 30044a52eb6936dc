//! Redis-backed verification record store
//!
//! Each record is a JSON string under `{prefix}:2fa:code:{sha256(identifier)}`.
//! Redis expiry is set past the point where the sweeper would delete the
//! record, so verification still observes `Expired` and `AlreadyUsed`
//! before the key disappears on its own.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::warn;

use hk_core::{CodeStore, VerificationRecord};

use super::{hash_key_component, RedisClient};
use crate::InfrastructureError;

pub struct RedisCodeStore {
    client: Arc<RedisClient>,
    key_prefix: String,
    /// Retention of used records, mirrored from the verifier's grace window
    used_grace: Duration,
}

impl RedisCodeStore {
    pub fn new(client: Arc<RedisClient>, key_prefix: &str, used_grace: Duration) -> Self {
        Self {
            client,
            key_prefix: key_prefix.to_string(),
            used_grace,
        }
    }

    fn key(&self, identifier: &str) -> String {
        format!("{}:2fa:code:{}", self.key_prefix, hash_key_component(identifier))
    }

    fn pattern(&self) -> String {
        format!("{}:2fa:code:*", self.key_prefix)
    }

    /// Seconds Redis should keep a record
    fn expiry_seconds(&self, record: &VerificationRecord) -> u64 {
        let mut keep_until = record.expires_at;
        if let Some(used_at) = record.used_at {
            keep_until = keep_until.max(used_at + self.used_grace);
        }
        let remaining = (keep_until + self.used_grace - Utc::now()).num_seconds();
        u64::try_from(remaining).unwrap_or(0).max(1)
    }

    async fn load(&self, key: &str) -> Result<Option<VerificationRecord>, InfrastructureError> {
        match self.client.get(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn get(&self, identifier: &str) -> Result<Option<VerificationRecord>, String> {
        self.load(&self.key(identifier)).await.map_err(|e| e.to_string())
    }

    async fn put(&self, record: &VerificationRecord) -> Result<(), String> {
        let json = serde_json::to_string(record).map_err(|e| e.to_string())?;
        self.client
            .set_with_expiry(&self.key(&record.identifier), &json, self.expiry_seconds(record))
            .await
            .map_err(|e| e.to_string())
    }

    async fn delete(&self, identifier: &str) -> Result<bool, String> {
        self.client
            .delete(&self.key(identifier))
            .await
            .map_err(|e| e.to_string())
    }

    async fn scan(&self) -> Result<Vec<VerificationRecord>, String> {
        let keys = self
            .client
            .scan_keys(&self.pattern())
            .await
            .map_err(|e| e.to_string())?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            match self.load(&key).await {
                Ok(Some(record)) => records.push(record),
                // Expired between SCAN and GET
                Ok(None) => {}
                Err(InfrastructureError::Serialization(e)) => {
                    warn!(key = %key, error = %e, "Skipping malformed verification record");
                }
                Err(e) => return Err(e.to_string()),
            }
        }
        Ok(records)
    }
}
