//! Credential pool
//!
//! Owns the process-wide health state of every backend credential and hands
//! them out one borrower at a time.
//!
//! # Selection
//!
//! [`CredentialPool::acquire`] picks the least-recently-used credential that
//! is not borrowed and is usable now. A cooldown that has elapsed is cleared
//! during that check; there is no background timer. When nothing qualifies
//! the call returns [`PoolError::Empty`] immediately.
//!
//! # Health transitions
//!
//! | Outcome       | Failure counter | Health                                   |
//! |---------------|-----------------|------------------------------------------|
//! | `Success`     | reset to 0      | `Healthy`                                |
//! | `QuotaOrAuth` | +1              | `Cooldown` (30s doubling, capped at 10m) |
//! | `Transport`   | +1              | unchanged                                |
//! | `Abandoned`   | unchanged       | unchanged                                |
//!
//! Once the counter reaches the failure threshold the credential becomes
//! `Exhausted` and stays so until [`CredentialPool::reset`] or a restart.

use crate::config::PoolPolicy;
use quorum_domain::{CallOutcome, Credential, CredentialHealth, CredentialId};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Errors returned by [`CredentialPool::acquire`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// No credential is currently usable. Retryable later.
    #[error("no usable credential available")]
    Empty,
}

#[derive(Debug)]
struct Entry {
    credential: Credential,
    health: CredentialHealth,
    consecutive_failures: u32,
    last_used: Option<Instant>,
    in_use: bool,
}

impl Entry {
    fn reset(&mut self) {
        self.health = CredentialHealth::Healthy;
        self.consecutive_failures = 0;
    }
}

/// Point-in-time view of one credential, for display and diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStatus {
    pub id: CredentialId,
    pub health: CredentialHealth,
    pub consecutive_failures: u32,
    pub in_use: bool,
}

/// Pool of backend credentials with health tracking
///
/// All state sits behind a single lock; acquire and release are atomic
/// transitions on it. The set of credentials is fixed at construction.
#[derive(Debug)]
pub struct CredentialPool {
    entries: Mutex<Vec<Entry>>,
    policy: PoolPolicy,
}

impl CredentialPool {
    pub fn new(credentials: Vec<Credential>, policy: PoolPolicy) -> Self {
        let entries = credentials
            .into_iter()
            .map(|credential| Entry {
                credential,
                health: CredentialHealth::default(),
                consecutive_failures: 0,
                last_used: None,
                in_use: false,
            })
            .collect();
        Self {
            entries: Mutex::new(entries),
            policy,
        }
    }

    /// Seed the health of one credential, e.g. for tests that need a pool
    /// in a known state.
    pub fn with_health(self, id: &CredentialId, health: CredentialHealth) -> Self {
        {
            let threshold = self.policy.failure_threshold;
            let mut entries = self.lock();
            for entry in entries.iter_mut().filter(|e| e.credential.id() == id) {
                entry.health = health;
                if health == CredentialHealth::Exhausted {
                    entry.consecutive_failures = threshold;
                }
            }
        }
        self
    }

    pub fn policy(&self) -> &PoolPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Borrow the least-recently-used usable credential.
    ///
    /// The returned lease must be released with the call outcome; dropping
    /// it releases the credential as abandoned.
    pub fn acquire(self: &Arc<Self>) -> Result<CredentialLease, PoolError> {
        let now = Instant::now();
        let mut entries = self.lock();

        for entry in entries.iter_mut() {
            if matches!(entry.health, CredentialHealth::Cooldown { .. })
                && entry.health.is_usable_at(now.into_std())
            {
                debug!("Credential {} cooldown elapsed", entry.credential.id());
                entry.health = CredentialHealth::Healthy;
            }
        }

        // Never-used credentials (None) sort first; ties keep pool order.
        let index = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.in_use && e.health == CredentialHealth::Healthy)
            .min_by_key(|(_, e)| e.last_used)
            .map(|(index, _)| index)
            .ok_or(PoolError::Empty)?;

        let entry = &mut entries[index];
        entry.in_use = true;
        entry.last_used = Some(now);
        debug!("Acquired credential {}", entry.credential.id());

        Ok(CredentialLease {
            pool: Arc::clone(self),
            index,
            credential: entry.credential.clone(),
            released: false,
        })
    }

    /// Current state of every credential, in pool order
    pub fn snapshot(&self) -> Vec<CredentialStatus> {
        self.lock()
            .iter()
            .map(|e| CredentialStatus {
                id: e.credential.id().clone(),
                health: e.health,
                consecutive_failures: e.consecutive_failures,
                in_use: e.in_use,
            })
            .collect()
    }

    /// Operator reset of one credential back to `Healthy`.
    ///
    /// Returns `false` if no credential has that id.
    pub fn reset(&self, id: &CredentialId) -> bool {
        let mut found = false;
        for entry in self.lock().iter_mut().filter(|e| e.credential.id() == id) {
            entry.reset();
            found = true;
        }
        if found {
            info!("Credential {} reset to healthy", id);
        }
        found
    }

    /// Operator reset of every credential back to `Healthy`.
    pub fn reset_all(&self) {
        for entry in self.lock().iter_mut() {
            entry.reset();
        }
        info!("All credentials reset to healthy");
    }

    fn release_at(&self, index: usize, outcome: CallOutcome) {
        let now = Instant::now();
        let threshold = self.policy.failure_threshold;
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(index) else {
            return;
        };
        entry.in_use = false;

        match outcome {
            CallOutcome::Abandoned => return,
            CallOutcome::Success => {
                entry.reset();
                return;
            }
            CallOutcome::QuotaOrAuth | CallOutcome::Transport => {
                entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
            }
        }

        let id = entry.credential.id();
        if entry.consecutive_failures >= threshold {
            warn!(
                "Credential {} exhausted after {} consecutive failures",
                id, entry.consecutive_failures
            );
            entry.health = CredentialHealth::Exhausted;
        } else if outcome == CallOutcome::QuotaOrAuth {
            let cooldown = self.policy.cooldown_for(entry.consecutive_failures);
            warn!("Credential {} cooling down for {:?}", id, cooldown);
            entry.health = CredentialHealth::Cooldown {
                until: (now + cooldown).into_std(),
            };
        } else {
            debug!(
                "Credential {} transport failure ({} in a row)",
                id, entry.consecutive_failures
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A borrowed credential
///
/// Exactly one lease exists per borrowed credential. Consuming it with
/// [`release`](Self::release) reports the call outcome; dropping it
/// unreleased (e.g. a cancelled runner) returns the credential untouched.
#[derive(Debug)]
pub struct CredentialLease {
    pool: Arc<CredentialPool>,
    index: usize,
    credential: Credential,
    released: bool,
}

impl CredentialLease {
    pub fn id(&self) -> &CredentialId {
        self.credential.id()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Return the credential with the outcome of the call made with it
    pub fn release(mut self, outcome: CallOutcome) {
        self.released = true;
        self.pool.release_at(self.index, outcome);
    }
}

impl Drop for CredentialLease {
    fn drop(&mut self) {
        if !self.released {
            self.pool.release_at(self.index, CallOutcome::Abandoned);
        }
    }
}
