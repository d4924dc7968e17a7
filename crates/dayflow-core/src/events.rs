//! Event model and the single-threaded event bus.
//!
//! Every observable state change produces an [`Event`]. The shell (CLI,
//! tray, tests) drains the bus; nothing in the core blocks on delivery.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// The shell polls the bus for events; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_id: i64,
        activity_id: i64,
        at: DateTime<Utc>,
    },
    /// Elapsed seconds, delivered about once per second while running.
    TimerTick {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        session_id: i64,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateChanged {
        state: TimerState,
        at: DateTime<Utc>,
    },
    /// A timetable slot boundary fired and its start was dispatched.
    SlotStarted {
        activity_id: Option<i64>,
        at: DateTime<Utc>,
    },
    SlotEnded {
        activity_id: Option<i64>,
        at: DateTime<Utc>,
    },
    /// The last start reminder was rescheduled for a delayed replay.
    ReminderSnoozed {
        due_in_secs: u64,
        at: DateTime<Utc>,
    },
    DndChanged {
        enabled: bool,
        at: DateTime<Utc>,
    },
}

/// Shared single-threaded event queue.
///
/// The Rust rendition of the original's signal wiring: producers publish in
/// dispatch order, the embedding drains. Cloning hands out another handle to
/// the same queue.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    queue: Rc<RefCell<VecDeque<Event>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: Event) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Remove and return all queued events in publish order.
    pub fn drain(&self) -> Vec<Event> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}
