//! Periodic removal of expired and spent verification records
//!
//! Verification enforces expiry lazily; the sweeper bounds how long dead
//! records linger in the store when nobody submits a code for them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{VerificationError, VerificationResult};
use crate::services::clock::Clock;

use super::locks::KeyedLocks;
use super::traits::{CodeStore, RateLimiter};
use super::types::SweepReport;

/// Background cleanup of the code store
pub struct Sweeper {
    store: Arc<dyn CodeStore>,
    rate_limiter: Arc<dyn RateLimiter>,
    locks: Arc<KeyedLocks>,
    clock: Arc<dyn Clock>,
    used_grace: ChronoDuration,
    interval: Duration,
    completed_sweeps: Arc<AtomicU64>,
}

impl Sweeper {
    pub fn new(
        store: Arc<dyn CodeStore>,
        rate_limiter: Arc<dyn RateLimiter>,
        locks: Arc<KeyedLocks>,
        clock: Arc<dyn Clock>,
        used_grace: ChronoDuration,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            rate_limiter,
            locks,
            clock,
            used_grace,
            interval,
            completed_sweeps: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run a single sweep
    ///
    /// Removes records past `expires_at` (used or not) and used records past
    /// their grace window. Each candidate is re-read under its identifier lock
    /// and only deleted if it is still the same purgeable record, so a code
    /// re-issued mid-sweep survives. Idle rate limit windows are pruned first,
    /// even when the store scan fails.
    pub async fn sweep_once(&self) -> VerificationResult<SweepReport> {
        let pruned_keys = match self.rate_limiter.prune().await {
            Ok(pruned) => pruned,
            Err(e) => {
                warn!(error = %e, "Failed to prune idle rate limit windows");
                0
            }
        };

        let records = self.store.scan().await.map_err(|e| {
            VerificationError::store(format!("failed to scan verification records: {}", e))
        })?;

        let now = self.clock.now();
        let mut report = SweepReport {
            scanned: records.len(),
            pruned_keys,
            ..Default::default()
        };

        for candidate in records
            .into_iter()
            .filter(|r| r.is_purgeable_at(now, self.used_grace))
        {
            let _guard = self.locks.lock(&candidate.identifier).await;

            let current = match self.store.get(&candidate.identifier).await {
                Ok(Some(current)) => current,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        identifier = %candidate.identifier,
                        error = %e,
                        "Failed to re-read verification record during sweep"
                    );
                    report.failed += 1;
                    continue;
                }
            };

            if current.id != candidate.id
                || !current.is_purgeable_at(self.clock.now(), self.used_grace)
            {
                continue;
            }

            match self.store.delete(&candidate.identifier).await {
                Ok(_) => report.removed += 1,
                Err(e) => {
                    warn!(
                        identifier = %candidate.identifier,
                        error = %e,
                        "Failed to delete verification record during sweep"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.removed > 0 || report.failed > 0 || report.pruned_keys > 0 {
            info!(
                scanned = report.scanned,
                removed = report.removed,
                failed = report.failed,
                pruned_keys = report.pruned_keys,
                event = "otp_sweep",
                "Verification sweep completed"
            );
        } else {
            debug!(scanned = report.scanned, event = "otp_sweep", "Nothing to sweep");
        }

        Ok(report)
    }

    /// Number of sweep ticks finished since the sweeper was created
    pub fn completed_sweeps(&self) -> u64 {
        self.completed_sweeps.load(Ordering::Acquire)
    }

    /// Start the sweeper as a background task
    ///
    /// The first sweep runs one interval after start. Errors are logged and
    /// the next tick tries again.
    pub fn spawn(self: Arc<Self>) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let completed = Arc::clone(&self.completed_sweeps);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                "Verification sweeper started"
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep_once().await {
                            error!(error = %e, "Verification sweep failed");
                        }
                        self.completed_sweeps.fetch_add(1, Ordering::AcqRel);
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Verification sweeper stopped");
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            task,
            completed,
        }
    }
}

/// Handle to a running sweeper task
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    completed: Arc<AtomicU64>,
}

impl SweeperHandle {
    /// Number of sweep ticks the task has finished
    pub fn completed_sweeps(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Signal the task to stop and wait for it
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Verification sweeper task ended abnormally");
        }
    }
}
