//! Timetable reminders: slot start/end dispatch, timer automation, snooze,
//! and do-not-disturb.
//!
//! The [`NotificationCenter`] is the reminder policy around the
//! [`ScheduleDriver`]:
//!
//! - Slot start: show a reminder, auto-start the elapsed timer if idle.
//! - Slot end: auto-stop the timer if it is tracking that slot's activity;
//!   when the next slot begins at (effectively) the same moment, its start
//!   is chained into the same dispatch turn so tracking never gaps.
//! - Snooze replays the last start reminder after a delay; only one replay
//!   can be outstanding.
//! - Do-not-disturb suppresses the visible notification surface only; the
//!   auto start/stop automation always runs.
//!
//! Timer failures during automation are swallowed and logged; a storage
//! hiccup must never stall event dispatch.

mod driver;

pub use driver::{ScheduleDriver, CHAIN_EPSILON_SECS};

use std::rc::Rc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::{Event, EventBus};
use crate::schedule::{build_day_events, SlotEvent, SlotEventKind};
use crate::storage::{Config, Database};
use crate::timer::{TimerService, TimerState};

/// Settings key under which the do-not-disturb flag is persisted ("1"/"0").
pub const DND_KEY: &str = "notifications.dnd";

/// Visible notification surface (tray balloon/toast in a GUI shell).
pub trait NotificationSink {
    fn notify(&mut self, message: &str);
}

/// Sink that routes reminders to the log. The headless default.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, message: &str) {
        tracing::info!(target: "dayflow::reminder", "{message}");
    }
}

/// Reminder policy and schedule driver for today's timetable.
///
/// Owns the elapsed timer; it is the only component that commands it in
/// reaction to schedule events. User-initiated timer actions go through
/// [`NotificationCenter::timer_mut`].
pub struct NotificationCenter {
    db: Rc<Database>,
    clock: Rc<dyn Clock>,
    bus: EventBus,
    timer: TimerService,
    driver: ScheduleDriver,
    sink: Box<dyn NotificationSink>,
    last_start: Option<SlotEvent>,
    snooze_due: Option<NaiveDateTime>,
    snooze_delay_secs: u64,
}

impl NotificationCenter {
    pub fn new(
        db: Rc<Database>,
        clock: Rc<dyn Clock>,
        bus: EventBus,
        timer: TimerService,
        sink: Box<dyn NotificationSink>,
        config: &Config,
    ) -> Self {
        Self {
            db,
            clock,
            bus,
            timer,
            driver: ScheduleDriver::new(),
            sink,
            last_start: None,
            snooze_due: None,
            snooze_delay_secs: config.snooze_delay_secs(),
        }
    }

    pub fn timer(&self) -> &TimerService {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut TimerService {
        &mut self.timer
    }

    /// Recompute today's event list from storage and re-arm the driver.
    ///
    /// The previous list is abandoned wholesale; events already in the past
    /// are treated as missed.
    pub fn rebuild_schedule(&mut self) -> Result<()> {
        let now = self.clock.now_local();
        let today = now.date();
        let mut events = Vec::new();
        if let Some(timetable) = self.db.get_timetable_by_date(today)? {
            let entries = self.db.list_timetable_entries(timetable.id)?;
            events = build_day_events(today, &entries);
        }
        debug!(count = events.len(), "rebuilt today's slot events");
        self.driver.rearm(events, now);
        Ok(())
    }

    /// Instant of the next pending wake-up (slot event or snooze replay).
    pub fn next_wakeup(&self) -> Option<NaiveDateTime> {
        match (self.driver.next_wakeup(), self.snooze_due) {
            (Some(event), Some(snooze)) => Some(event.min(snooze)),
            (Some(event), None) => Some(event),
            (None, snooze) => snooze,
        }
    }

    /// Dispatch everything that has come due.
    ///
    /// Due events are processed strictly in schedule order; a back-to-back
    /// End/Start pair is handled in one turn. Never panics on collaborator
    /// failure.
    pub fn poll(&mut self) {
        let now = self.clock.now_local();
        if self.snooze_due.is_some_and(|due| due <= now) {
            self.snooze_due = None;
            if let Some(ev) = self.last_start.clone() {
                self.show_start_notification(&ev);
            }
        }
        while let Some(ev) = self.driver.pop_due(now) {
            match ev.kind {
                SlotEventKind::Start => self.handle_slot_start(ev),
                SlotEventKind::End => self.handle_slot_end(ev),
            }
        }
    }

    /// Replay the last start reminder after the configured delay.
    ///
    /// Re-triggering replaces the outstanding replay. Visual-only: the timer
    /// automation already ran when the slot started. No-op before the first
    /// start reminder.
    pub fn snooze(&mut self) {
        if self.last_start.is_none() {
            return;
        }
        let delay = self.snooze_delay_secs;
        self.snooze_due = Some(self.clock.now_local() + chrono::Duration::seconds(delay as i64));
        self.notify(
            &format!("Snoozed reminder for {} minutes", delay / 60),
            false,
        );
        self.bus.publish(Event::ReminderSnoozed {
            due_in_secs: delay,
            at: self.clock.now_utc(),
        });
    }

    /// Whether do-not-disturb is on. Read fresh from settings every time so
    /// toggles from another process are honored.
    pub fn dnd(&self) -> bool {
        match self.db.get_setting(DND_KEY) {
            Ok(value) => value.as_deref() == Some("1"),
            Err(err) => {
                warn!(%err, "failed to read do-not-disturb flag");
                false
            }
        }
    }

    /// Persist the do-not-disturb flag. The confirmation itself is always
    /// shown, even when turning DND on.
    pub fn set_dnd(&mut self, enabled: bool) -> Result<()> {
        self.db
            .set_setting(DND_KEY, if enabled { "1" } else { "0" })?;
        self.notify(
            if enabled {
                "Do Not Disturb ON"
            } else {
                "Do Not Disturb OFF"
            },
            true,
        );
        self.bus.publish(Event::DndChanged {
            enabled,
            at: self.clock.now_utc(),
        });
        Ok(())
    }

    // ── Event handlers ───────────────────────────────────────────────

    fn handle_slot_start(&mut self, ev: SlotEvent) {
        self.show_start_notification(&ev);
        if self.timer.state() == TimerState::Idle {
            if let Some(activity_id) = ev.activity_id {
                // Best-effort: a double start or storage hiccup must not
                // take down the dispatch loop.
                if let Err(err) = self.timer.start(activity_id) {
                    warn!(%err, activity_id, "auto-start failed");
                }
            }
        }
        self.bus.publish(Event::SlotStarted {
            activity_id: ev.activity_id,
            at: self.clock.now_utc(),
        });
        self.last_start = Some(ev);
    }

    fn handle_slot_end(&mut self, ev: SlotEvent) {
        let tracking_this_slot = ev.activity_id.is_some()
            && self.timer.current_activity_id() == ev.activity_id
            && matches!(self.timer.state(), TimerState::Running | TimerState::Paused);
        if tracking_this_slot {
            if let Err(err) = self.timer.stop() {
                warn!(%err, "auto-stop failed");
            }
        }
        let title = self.activity_title(ev.activity_id);
        self.notify(&format!("Slot ended: {title}"), false);
        // An immediately following start belongs to this dispatch turn.
        if let Some(next) = self.driver.pop_chained_start(&ev) {
            self.handle_slot_start(next);
        }
        self.bus.publish(Event::SlotEnded {
            activity_id: ev.activity_id,
            at: self.clock.now_utc(),
        });
    }

    // ── Notification helpers ─────────────────────────────────────────

    fn show_start_notification(&mut self, ev: &SlotEvent) {
        let title = self.activity_title(ev.activity_id);
        let message = if ev.notes.is_empty() {
            format!("Slot starting: {title}")
        } else {
            format!("Slot starting: {title} ({})", ev.notes)
        };
        self.notify(&message, false);
    }

    fn activity_title(&self, activity_id: Option<i64>) -> String {
        let Some(id) = activity_id else {
            return "Unassigned".to_string();
        };
        match self.db.get_activity(id) {
            Ok(Some(activity)) => activity.title,
            Ok(None) => format!("Activity {id}"),
            Err(err) => {
                warn!(%err, id, "activity lookup failed");
                format!("Activity {id}")
            }
        }
    }

    fn notify(&mut self, message: &str, force: bool) {
        if !force && self.dnd() {
            debug!(message, "notification suppressed by do-not-disturb");
            return;
        }
        self.sink.notify(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use crate::clock::ManualClock;

    #[derive(Default, Clone)]
    struct RecordingSink {
        messages: Rc<RefCell<Vec<String>>>,
    }

    impl NotificationSink for RecordingSink {
        fn notify(&mut self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    fn center() -> (NotificationCenter, Rc<ManualClock>, Rc<RefCell<Vec<String>>>) {
        let db = Rc::new(Database::open_memory().expect("in-memory database"));
        let clock = Rc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        ));
        let bus = EventBus::new();
        let timer = TimerService::new(db.clone(), clock.clone(), bus.clone());
        let sink = RecordingSink::default();
        let messages = sink.messages.clone();
        let center = NotificationCenter::new(
            db,
            clock.clone(),
            bus,
            timer,
            Box::new(sink),
            &Config::default(),
        );
        (center, clock, messages)
    }

    #[test]
    fn dnd_defaults_to_off() {
        let (center, _clock, _messages) = center();
        assert!(!center.dnd());
    }

    #[test]
    fn set_dnd_confirmation_bypasses_suppression() {
        let (mut center, _clock, messages) = center();
        center.set_dnd(true).unwrap();
        assert!(center.dnd());
        assert_eq!(messages.borrow().as_slice(), ["Do Not Disturb ON"]);
    }

    #[test]
    fn snooze_without_a_start_reminder_is_a_noop() {
        let (mut center, _clock, messages) = center();
        center.snooze();
        assert!(center.next_wakeup().is_none());
        assert!(messages.borrow().is_empty());
    }

    #[test]
    fn empty_timetable_arms_nothing() {
        let (mut center, _clock, _messages) = center();
        center.rebuild_schedule().unwrap();
        assert!(center.next_wakeup().is_none());
        center.poll();
        assert_eq!(center.timer().state(), TimerState::Idle);
    }
}
