//! Quota Session
//!
//! The caller's view of the tracker: one identity, one snapshot, and the rule
//! that no permission is decided before the snapshot is ready.

use crate::application::tracker::EntitlementTracker;
use crate::domain::clock::Clock;
use crate::domain::identity::Identity;
use crate::domain::repository::QuotaRepository;
use crate::domain::value_objects::{QuotaSnapshot, Remaining};
use crate::error::{QuotaError, QuotaResult};

#[derive(Debug, Clone)]
pub struct QuotaSession {
    identity: Identity,
    snapshot: QuotaSnapshot,
}

impl QuotaSession {
    /// Session whose snapshot has not been loaded yet
    pub fn pending(identity: Identity) -> Self {
        let remaining = if identity.is_paid() {
            Remaining::Unbounded
        } else {
            Remaining::Limited(0)
        };
        Self {
            identity,
            snapshot: QuotaSnapshot::pending(remaining),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        self.snapshot
    }

    pub async fn load<R, C>(
        &mut self,
        tracker: &EntitlementTracker<R, C>,
    ) -> QuotaResult<QuotaSnapshot>
    where
        R: QuotaRepository + Send + Sync,
        C: Clock,
    {
        self.snapshot = tracker.initialize(&self.identity).await?;
        Ok(self.snapshot)
    }

    /// Like [`load`](Self::load), but leaves storage untouched until the first spend.
    pub async fn preview<R, C>(
        &mut self,
        tracker: &EntitlementTracker<R, C>,
    ) -> QuotaResult<QuotaSnapshot>
    where
        R: QuotaRepository + Send + Sync,
        C: Clock,
    {
        self.snapshot = tracker.preview(&self.identity).await?;
        Ok(self.snapshot)
    }

    /// Change identity (sign-in, sign-out, tier change) and reload.
    ///
    /// Counts are never carried between classes.
    pub async fn switch_identity<R, C>(
        &mut self,
        identity: Identity,
        tracker: &EntitlementTracker<R, C>,
    ) -> QuotaResult<QuotaSnapshot>
    where
        R: QuotaRepository + Send + Sync,
        C: Clock,
    {
        *self = Self::pending(identity);
        self.load(tracker).await
    }

    /// Gate before generation
    pub fn check_permission(&self) -> QuotaResult<()> {
        if !self.snapshot.ready {
            return Err(QuotaError::NotReady);
        }
        if crate::domain::services::may_proceed(&self.identity, self.snapshot.remaining) {
            return Ok(());
        }
        match self.identity.class() {
            Some(class) => Err(QuotaError::QuotaExhausted(class)),
            None => Ok(()),
        }
    }

    /// Spend one generation after a success the caller still wants
    pub async fn record_success<R, C>(
        &mut self,
        tracker: &EntitlementTracker<R, C>,
    ) -> QuotaResult<Remaining>
    where
        R: QuotaRepository + Send + Sync,
        C: Clock,
    {
        let remaining = tracker.decrement(&self.identity).await?;
        self.snapshot = QuotaSnapshot::resolved(remaining);
        Ok(remaining)
    }
}
