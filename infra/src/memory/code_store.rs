//! DashMap-backed verification record store

use async_trait::async_trait;
use dashmap::DashMap;

use hk_core::{CodeStore, VerificationRecord};

/// Verification records keyed by identifier
#[derive(Debug, Default)]
pub struct InMemoryCodeStore {
    records: DashMap<String, VerificationRecord>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn get(&self, identifier: &str) -> Result<Option<VerificationRecord>, String> {
        Ok(self.records.get(identifier).map(|r| r.value().clone()))
    }

    async fn put(&self, record: &VerificationRecord) -> Result<(), String> {
        self.records
            .insert(record.identifier.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<bool, String> {
        Ok(self.records.remove(identifier).is_some())
    }

    async fn scan(&self) -> Result<Vec<VerificationRecord>, String> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }
}
