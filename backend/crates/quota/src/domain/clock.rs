//! Clock Port
//!
//! The tracker only needs the current reset period.

use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::domain::value_objects::PeriodKey;

pub trait Clock: Send + Sync {
    fn current_period(&self) -> PeriodKey;
}

/// Wall clock, UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_period(&self) -> PeriodKey {
        PeriodKey::from_datetime(Utc::now())
    }
}

/// Settable clock for tests and replays. Clones share the period.
#[derive(Debug, Clone)]
pub struct FixedClock {
    period: Arc<RwLock<PeriodKey>>,
}

impl FixedClock {
    pub fn new(period: &str) -> Self {
        Self {
            period: Arc::new(RwLock::new(PeriodKey::from_stored(period))),
        }
    }

    pub fn set(&self, period: &str) {
        if let Ok(mut current) = self.period.write() {
            *current = PeriodKey::from_stored(period);
        }
    }
}

impl Clock for FixedClock {
    fn current_period(&self) -> PeriodKey {
        match self.period.read() {
            Ok(period) => period.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
