//! Verification service facade wiring issuer, verifier and sweeper together

use std::sync::Arc;

use crate::errors::VerificationResult;
use crate::services::clock::{Clock, SystemClock};

use super::config::VerificationServiceConfig;
use super::issuer::Issuer;
use super::locks::KeyedLocks;
use super::sweeper::{Sweeper, SweeperHandle};
use super::traits::{CodeStore, EmailSender, RateLimiter};
use super::types::{IssueRequest, IssuedCode, VerifiedCode};
use super::verifier::Verifier;

/// Two-factor code lifecycle over a shared store and lock table
pub struct VerificationService {
    issuer: Issuer,
    verifier: Verifier,
    store: Arc<dyn CodeStore>,
    rate_limiter: Arc<dyn RateLimiter>,
    locks: Arc<KeyedLocks>,
    clock: Arc<dyn Clock>,
    config: VerificationServiceConfig,
}

impl VerificationService {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `store` - Verification record storage
    /// * `rate_limiter` - Issuance admission control
    /// * `email` - Email delivery implementation
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<dyn CodeStore>,
        rate_limiter: Arc<dyn RateLimiter>,
        email: Arc<dyn EmailSender>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self::with_clock(store, rate_limiter, email, config, Arc::new(SystemClock))
    }

    /// Create a service reading time from `clock`
    pub fn with_clock(
        store: Arc<dyn CodeStore>,
        rate_limiter: Arc<dyn RateLimiter>,
        email: Arc<dyn EmailSender>,
        config: VerificationServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let locks = Arc::new(KeyedLocks::new());

        let issuer = Issuer::new(
            Arc::clone(&store),
            Arc::clone(&rate_limiter),
            email,
            Arc::clone(&locks),
            Arc::clone(&clock),
            config.clone(),
        );
        let verifier = Verifier::new(
            Arc::clone(&store),
            Arc::clone(&locks),
            Arc::clone(&clock),
            config.clone(),
        );

        Self {
            issuer,
            verifier,
            store,
            rate_limiter,
            locks,
            clock,
            config,
        }
    }

    /// Issue a code and deliver it by email
    pub async fn issue(&self, request: IssueRequest) -> VerificationResult<IssuedCode> {
        self.issuer.issue(request).await
    }

    /// Verify a submitted code
    pub async fn verify(&self, identifier: &str, code: &str) -> VerificationResult<VerifiedCode> {
        self.verifier.verify(identifier, code).await
    }

    /// Sweeper sharing this service's store, rate limiter, locks and clock
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(
            Arc::clone(&self.store),
            Arc::clone(&self.rate_limiter),
            Arc::clone(&self.locks),
            Arc::clone(&self.clock),
            self.config.used_grace,
            self.config.sweep_interval,
        )
    }

    /// Start the background sweeper
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        Arc::new(self.sweeper()).spawn()
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }
}
