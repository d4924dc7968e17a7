//! Injectable time source.
//!
//! Timetable slots live in naive local wall-clock time while persisted
//! session records are stamped in UTC, so the clock exposes both views.
//! Production code uses [`SystemClock`]; tests and simulations drive a
//! [`ManualClock`].

use std::cell::Cell;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Time source for the timer and the schedule driver.
pub trait Clock {
    /// Current instant in UTC (persistence timestamps).
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current local wall-clock time (slot boundaries, "today").
    fn now_local(&self) -> NaiveDateTime;
}

/// Wall-clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Local and UTC views share one instant, which keeps slot boundaries and
/// persisted timestamps comparable in scenarios.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, to: NaiveDateTime) {
        self.now.set(to);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + chrono::Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.now.get())
    }

    fn now_local(&self) -> NaiveDateTime {
        self.now.get()
    }
}
