use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use chrono::{Datelike, Days, Local, NaiveDate};

/// Source of "today" as a calendar date. Time of day never matters.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A settable date. Clones share the same underlying day, so a test can keep
/// a handle while the `Store` owns another.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<AtomicI32>);

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self(Arc::new(AtomicI32::new(today.num_days_from_ce())))
    }

    pub fn set(&self, today: NaiveDate) {
        self.0.store(today.num_days_from_ce(), Ordering::Relaxed);
    }

    pub fn advance_days(&self, days: u64) {
        let next = self.today().checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(self.0.load(Ordering::Relaxed)).unwrap_or_default()
    }
}
