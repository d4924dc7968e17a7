//! Elapsed-time tracking service.
//!
//! A wall-clock state machine over one live session:
//!
//! ```text
//! idle -> running -> paused -> running ... -> idle
//! ```
//!
//! Duration is accumulation-based: `accum_secs` holds the total running time
//! up to the last state transition, and the interval since `last_resume` is
//! added only while running. Ticks never mutate the accumulator, so repeated
//! pause/resume cycles cannot drift or double count.
//!
//! The service has no internal thread; the caller invokes `tick()` about
//! once per second for progress events.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{Result, TimerError};
use crate::events::{Event, EventBus};
use crate::model::SessionRecord;
use crate::storage::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
        }
    }
}

/// Bookkeeping for the one live session.
///
/// Serializable so a shell can persist timer state between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSession {
    pub activity_id: i64,
    /// Row id of the open session record created on start.
    pub session_id: i64,
    pub started_at: DateTime<Utc>,
    /// Running seconds folded in up to the last pause/stop transition.
    pub accum_secs: u64,
    /// Set while running; `None` while paused.
    pub last_resume: Option<DateTime<Utc>>,
}

/// Serializable state + session pair for shells that outlive a process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub session: Option<TimerSession>,
}

/// Elapsed timer state machine. At most one session is live at a time.
pub struct TimerService {
    db: Rc<Database>,
    clock: Rc<dyn Clock>,
    bus: EventBus,
    state: TimerState,
    session: Option<TimerSession>,
}

impl TimerService {
    pub fn new(db: Rc<Database>, clock: Rc<dyn Clock>, bus: EventBus) -> Self {
        Self {
            db,
            clock,
            bus,
            state: TimerState::Idle,
            session: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn current_activity_id(&self) -> Option<i64> {
        self.session.as_ref().map(|s| s.activity_id)
    }

    pub fn current_session_id(&self) -> Option<i64> {
        self.session.as_ref().map(|s| s.session_id)
    }

    /// Whole seconds elapsed in the live session, pause gaps excluded.
    pub fn elapsed_secs(&self) -> u64 {
        let Some(session) = self.session.as_ref() else {
            return 0;
        };
        let running = match (self.state, session.last_resume) {
            (TimerState::Running, Some(last)) => delta_secs(last, self.clock.now_utc()),
            _ => 0,
        };
        session.accum_secs + running
    }

    /// Fetch the persisted record for a session id.
    pub fn session(&self, id: i64) -> Result<Option<SessionRecord>> {
        Ok(self.db.get_session(id)?)
    }

    /// Serializable snapshot of the live state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            session: self.session.clone(),
        }
    }

    /// Restore a snapshot taken earlier. Emits nothing.
    pub fn restore(&mut self, snapshot: TimerSnapshot) {
        self.state = snapshot.state;
        self.session = snapshot.session;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin tracking `activity_id`. Legal only from idle.
    ///
    /// Persists an open-ended session record and returns its id.
    ///
    /// # Errors
    /// [`TimerError::AlreadyActive`] if a session is running or paused;
    /// storage errors if the session record cannot be created.
    pub fn start(&mut self, activity_id: i64) -> Result<i64> {
        if self.state != TimerState::Idle {
            return Err(TimerError::AlreadyActive {
                active_id: self.current_activity_id().unwrap_or(activity_id),
            }
            .into());
        }
        let now = self.clock.now_utc();
        let session_id = self.db.create_session(activity_id, now)?;
        self.session = Some(TimerSession {
            activity_id,
            session_id,
            started_at: now,
            accum_secs: 0,
            last_resume: Some(now),
        });
        self.set_state(TimerState::Running, now);
        self.bus.publish(Event::TimerStarted {
            session_id,
            activity_id,
            at: now,
        });
        self.bus.publish(Event::TimerTick {
            elapsed_secs: 0,
            at: now,
        });
        Ok(session_id)
    }

    /// Suspend the running session; no-op unless running.
    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        let now = self.clock.now_utc();
        if let Some(session) = self.session.as_mut() {
            if let Some(last) = session.last_resume.take() {
                session.accum_secs += delta_secs(last, now);
            }
        }
        self.set_state(TimerState::Paused, now);
        self.bus.publish(Event::TimerPaused {
            elapsed_secs: self.elapsed_secs(),
            at: now,
        });
    }

    /// Continue a paused session; no-op unless paused.
    pub fn resume(&mut self) {
        if self.state != TimerState::Paused {
            return;
        }
        let now = self.clock.now_utc();
        if let Some(session) = self.session.as_mut() {
            session.last_resume = Some(now);
        }
        self.set_state(TimerState::Running, now);
        self.bus.publish(Event::TimerResumed {
            elapsed_secs: self.elapsed_secs(),
            at: now,
        });
    }

    /// Finish the live session, persisting its end time and duration.
    ///
    /// Returns the finalized session id, or `None` when idle (safe to call
    /// repeatedly; a second stop writes nothing).
    ///
    /// # Errors
    /// Storage errors from the finalize write. The session is kept live so a
    /// later stop can retry.
    pub fn stop(&mut self) -> Result<Option<i64>> {
        if self.state == TimerState::Idle {
            return Ok(None);
        }
        let now = self.clock.now_utc();
        let was_running = self.state == TimerState::Running;
        if was_running {
            if let Some(session) = self.session.as_mut() {
                if let Some(last) = session.last_resume.take() {
                    session.accum_secs += delta_secs(last, now);
                }
            }
        }
        let Some(session) = self.session.take() else {
            self.set_state(TimerState::Idle, now);
            return Ok(None);
        };
        let duration = session.accum_secs;
        if let Err(err) = self.db.finalize_session(session.session_id, now, duration) {
            // Keep the session live; everything up to `now` is already in
            // accum_secs, so accumulation restarts from here.
            let mut session = session;
            if was_running {
                session.last_resume = Some(now);
            }
            self.session = Some(session);
            return Err(err.into());
        }
        let session_id = session.session_id;
        self.set_state(TimerState::Idle, now);
        self.bus.publish(Event::TimerStopped {
            session_id,
            duration_secs: duration,
            at: now,
        });
        Ok(Some(session_id))
    }

    /// Emit an elapsed-time tick. No-op unless running.
    pub fn tick(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        self.bus.publish(Event::TimerTick {
            elapsed_secs: self.elapsed_secs(),
            at: self.clock.now_utc(),
        });
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_state(&mut self, new_state: TimerState, at: DateTime<Utc>) {
        if new_state != self.state {
            self.state = new_state;
            self.bus.publish(Event::StateChanged {
                state: new_state,
                at,
            });
        }
    }
}

/// Whole-second delta, clamped so clock skew can never subtract time.
fn delta_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}
