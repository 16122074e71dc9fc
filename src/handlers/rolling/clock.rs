//! Date sources for log file names.

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

/// Supplies the UTC calendar date stamped into log file names.
pub trait Clock: Send + Sync {
    fn today_utc(&self) -> NaiveDate;
}

/// Wall-clock UTC date.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today_utc(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock whose date only changes when [`ManualClock::set`] is called.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }

    /// Move the date forward by one day, saturating at the maximum date.
    pub fn advance_day(&self) {
        let mut today = self.today.lock();
        if let Some(next) = today.succ_opt() {
            *today = next;
        }
    }
}

impl Clock for ManualClock {
    fn today_utc(&self) -> NaiveDate {
        *self.today.lock()
    }
}
