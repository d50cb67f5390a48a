//! Entitlement Tracker
//!
//! Owns the remaining-use counters of one storage scope. All reads and writes
//! of a scope run under one keyed lock, so a period reset can never interleave
//! with a decrement of either class.

use std::sync::Arc;

use platform::lock::KeyedLocks;

use crate::application::config::QuotaConfig;
use crate::domain::clock::Clock;
use crate::domain::identity::{Identity, QuotaClass};
use crate::domain::repository::QuotaRepository;
use crate::domain::services;
use crate::domain::value_objects::{PeriodKey, QuotaSnapshot, Remaining};
use crate::error::QuotaResult;

pub struct EntitlementTracker<R, C>
where
    R: QuotaRepository,
    C: Clock,
{
    repo: Arc<R>,
    clock: Arc<C>,
    config: Arc<QuotaConfig>,
    locks: KeyedLocks,
}

impl<R, C> EntitlementTracker<R, C>
where
    R: QuotaRepository + Send + Sync,
    C: Clock,
{
    pub fn new(repo: Arc<R>, clock: Arc<C>, config: Arc<QuotaConfig>, locks: KeyedLocks) -> Self {
        Self {
            repo,
            clock,
            config,
            locks,
        }
    }

    pub fn scope(&self) -> &str {
        self.repo.scope()
    }

    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    fn lock_key(&self) -> String {
        format!("{}/quota", self.repo.scope())
    }

    /// Resolve the remaining count for `identity`.
    ///
    /// Paid identities never touch storage. The returned snapshot is always ready.
    pub async fn initialize(&self, identity: &Identity) -> QuotaResult<QuotaSnapshot> {
        let Some(class) = identity.class() else {
            return Ok(QuotaSnapshot::resolved(Remaining::Unbounded));
        };

        let _guard = self.locks.lock(&self.lock_key()).await;
        let remaining = self.resolve(class).await?;

        tracing::debug!(
            scope = %self.repo.scope(),
            class = ?class,
            remaining = remaining,
            "Quota initialized"
        );

        Ok(QuotaSnapshot::resolved(Remaining::Limited(remaining)))
    }

    /// Same answer as [`initialize`](Self::initialize), but nothing is written.
    ///
    /// A scope is only persisted once it spends a generation.
    pub async fn preview(&self, identity: &Identity) -> QuotaResult<QuotaSnapshot> {
        let Some(class) = identity.class() else {
            return Ok(QuotaSnapshot::resolved(Remaining::Unbounded));
        };

        let _guard = self.locks.lock(&self.lock_key()).await;
        let remaining = match self.read(class).await? {
            Stored::Current(remaining) => remaining,
            Stored::Missing | Stored::Stale { .. } => self.config.allotment(class),
        };

        Ok(QuotaSnapshot::resolved(Remaining::Limited(remaining)))
    }

    pub fn may_proceed(&self, identity: &Identity, remaining: Remaining) -> bool {
        services::may_proceed(identity, remaining)
    }

    /// Spend one generation. Call only after a confirmed success.
    pub async fn decrement(&self, identity: &Identity) -> QuotaResult<Remaining> {
        let Some(class) = identity.class() else {
            return Ok(Remaining::Unbounded);
        };

        let _guard = self.locks.lock(&self.lock_key()).await;
        let current = self.resolve(class).await?;
        let next = services::next_remaining(current);
        self.repo.save_remaining(class, next).await?;

        tracing::info!(
            scope = %self.repo.scope(),
            class = ?class,
            remaining = next,
            "Quota decremented"
        );

        Ok(Remaining::Limited(next))
    }

    /// What storage holds for `class`. Caller holds the lock.
    async fn read(&self, class: QuotaClass) -> QuotaResult<Stored> {
        let current = self.clock.current_period();
        let stored = self.repo.load_period().await?;

        if stored.as_ref() != Some(&current) {
            return Ok(Stored::Stale {
                from: stored,
                to: current,
            });
        }

        let allotment = self.config.allotment(class);
        Ok(match self.repo.load_remaining(class, allotment).await? {
            Some(remaining) => Stored::Current(remaining),
            None => Stored::Missing,
        })
    }

    /// Current count for `class`, repairing storage first. Caller holds the lock.
    async fn resolve(&self, class: QuotaClass) -> QuotaResult<u32> {
        let allotment = self.config.allotment(class);

        match self.read(class).await? {
            Stored::Current(remaining) => Ok(remaining),
            Stored::Missing => {
                self.repo.save_remaining(class, allotment).await?;
                Ok(allotment)
            }
            Stored::Stale { from, to } => {
                // the marker is shared, so every class restarts together;
                // other classes restart by dropping their record
                for other in QuotaClass::ALL.into_iter().filter(|each| *each != class) {
                    self.repo.clear_remaining(other).await?;
                }
                self.repo.save_remaining(class, allotment).await?;
                self.repo.save_period(&to).await?;

                tracing::info!(
                    scope = %self.repo.scope(),
                    from = ?from.as_ref().map(|p| p.as_str()),
                    to = %to,
                    "Quota period reset"
                );

                Ok(allotment)
            }
        }
    }
}

/// Stored state of one class before any repair
enum Stored {
    /// Marker is current and the count is usable
    Current(u32),
    /// Marker is current, the count is absent or corrupt
    Missing,
    /// Marker is absent or from an earlier period
    Stale {
        from: Option<PeriodKey>,
        to: PeriodKey,
    },
}
