//! # Dayflow Core Library
//!
//! Core business logic for Dayflow, a personal activity tracker and daily
//! timetable reminder tool. All operations are available through this
//! library and the standalone CLI binary; any GUI shell is a thin layer over
//! the same core.
//!
//! ## Architecture
//!
//! - **Elapsed Timer**: a wall-clock state machine tracking one live session;
//!   the caller invokes `tick()` periodically for progress events
//! - **Schedule Builder**: derives the day's ordered start/end event list
//!   from timetable entries
//! - **Reminder Engine**: single-pending-timer driver plus the policy that
//!   auto-starts/stops the timer and surfaces notifications (snooze and
//!   do-not-disturb aware)
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerService`]: elapsed-time state machine
//! - [`NotificationCenter`]: schedule dispatch and reminder policy
//! - [`Database`]: activities, timetables, sessions, settings
//! - [`EventBus`]: single-threaded event queue drained by the shell

pub mod clock;
pub mod error;
pub mod events;
pub mod model;
pub mod reminder;
pub mod schedule;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, TimerError};
pub use events::{Event, EventBus};
pub use model::{Activity, SessionRecord, Timetable, TimetableEntry, TimetableMode};
pub use reminder::{
    LogSink, NotificationCenter, NotificationSink, ScheduleDriver, CHAIN_EPSILON_SECS, DND_KEY,
};
pub use schedule::{build_day_events, parse_hhmm, SlotEvent, SlotEventKind};
pub use storage::{Config, Database};
pub use timer::{TimerService, TimerSession, TimerSnapshot, TimerState};
