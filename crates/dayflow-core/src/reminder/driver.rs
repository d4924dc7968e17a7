//! Single-pending-timer queue over the day's remaining slot events.
//!
//! Only the chronologically-next event is ever "armed": the embedding asks
//! for [`ScheduleDriver::next_wakeup`], sleeps, then pops due events one at
//! a time. Rearming replaces the whole list atomically, so a stale event can
//! never fire after a rebuild.

use std::collections::VecDeque;

use chrono::NaiveDateTime;

use crate::schedule::{SlotEvent, SlotEventKind};

/// Two slot boundaries closer than this are treated as back-to-back.
pub const CHAIN_EPSILON_SECS: i64 = 1;

#[derive(Debug, Default)]
pub struct ScheduleDriver {
    events: VecDeque<SlotEvent>,
}

impl ScheduleDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the event list wholesale and drop already-elapsed events.
    ///
    /// Events with `when <= now` are missed, not fired retroactively.
    pub fn rearm(&mut self, events: Vec<SlotEvent>, now: NaiveDateTime) {
        self.events = events.into();
        while self
            .events
            .front()
            .is_some_and(|ev| ev.when <= now)
        {
            self.events.pop_front();
        }
    }

    /// Instant the next event fires at; `None` when the driver is idle.
    pub fn next_wakeup(&self) -> Option<NaiveDateTime> {
        self.events.front().map(|ev| ev.when)
    }

    pub fn is_idle(&self) -> bool {
        self.events.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// Pop the head event if its time has come.
    pub fn pop_due(&mut self, now: NaiveDateTime) -> Option<SlotEvent> {
        if self.events.front().is_some_and(|ev| ev.when <= now) {
            self.events.pop_front()
        } else {
            None
        }
    }

    /// Pop the head event if it is a Start back-to-back with `ended`.
    ///
    /// Models "slot N ends exactly when slot N+1 begins" without a one-second
    /// tracking gap: the chained Start is dispatched in the same turn as the
    /// End, even if its own timestamp is marginally in the future.
    pub fn pop_chained_start(&mut self, ended: &SlotEvent) -> Option<SlotEvent> {
        let head = self.events.front()?;
        if head.kind == SlotEventKind::Start
            && (head.when - ended.when).num_seconds().abs() < CHAIN_EPSILON_SECS
        {
            self.events.pop_front()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn event(when: NaiveDateTime, kind: SlotEventKind, entry_id: i64) -> SlotEvent {
        SlotEvent {
            when,
            kind,
            entry_id,
            activity_id: Some(entry_id),
            start_time: String::new(),
            end_time: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn rearm_drops_elapsed_events() {
        let mut driver = ScheduleDriver::new();
        driver.rearm(
            vec![
                event(at(9, 0, 0), SlotEventKind::Start, 1),
                event(at(10, 0, 0), SlotEventKind::End, 1),
                event(at(14, 0, 0), SlotEventKind::Start, 2),
            ],
            at(12, 0, 0),
        );
        assert_eq!(driver.remaining(), 1);
        assert_eq!(driver.next_wakeup(), Some(at(14, 0, 0)));
    }

    #[test]
    fn all_past_events_leave_driver_idle() {
        let mut driver = ScheduleDriver::new();
        driver.rearm(
            vec![event(at(9, 0, 0), SlotEventKind::Start, 1)],
            at(23, 0, 0),
        );
        assert!(driver.is_idle());
        assert_eq!(driver.next_wakeup(), None);
    }

    #[test]
    fn pop_due_respects_the_clock() {
        let mut driver = ScheduleDriver::new();
        driver.rearm(
            vec![event(at(9, 0, 0), SlotEventKind::Start, 1)],
            at(8, 0, 0),
        );
        assert!(driver.pop_due(at(8, 59, 59)).is_none());
        assert!(driver.pop_due(at(9, 0, 0)).is_some());
        assert!(driver.pop_due(at(9, 0, 0)).is_none());
    }

    #[test]
    fn chained_start_within_epsilon_pops() {
        let mut driver = ScheduleDriver::new();
        let ended = event(at(10, 0, 0), SlotEventKind::End, 1);
        driver.rearm(
            vec![event(at(10, 0, 0), SlotEventKind::Start, 2)],
            at(9, 0, 0),
        );
        let chained = driver.pop_chained_start(&ended).unwrap();
        assert_eq!(chained.entry_id, 2);
        assert!(driver.is_idle());
    }

    #[test]
    fn chaining_rejects_gaps_of_a_second_or_more() {
        let mut driver = ScheduleDriver::new();
        let ended = event(at(10, 0, 0), SlotEventKind::End, 1);
        driver.rearm(
            vec![event(at(10, 0, 1), SlotEventKind::Start, 2)],
            at(9, 0, 0),
        );
        assert!(driver.pop_chained_start(&ended).is_none());
        assert_eq!(driver.remaining(), 1);
    }

    #[test]
    fn chaining_never_pops_an_end_event() {
        let mut driver = ScheduleDriver::new();
        let ended = event(at(10, 0, 0), SlotEventKind::End, 1);
        driver.rearm(
            vec![event(at(10, 0, 0), SlotEventKind::End, 2)],
            at(9, 0, 0),
        );
        assert!(driver.pop_chained_start(&ended).is_none());
    }

    #[test]
    fn rearm_replaces_previous_schedule() {
        let mut driver = ScheduleDriver::new();
        driver.rearm(
            vec![event(at(9, 0, 0), SlotEventKind::Start, 1)],
            at(8, 0, 0),
        );
        driver.rearm(
            vec![event(at(11, 0, 0), SlotEventKind::Start, 9)],
            at(8, 0, 0),
        );
        assert_eq!(driver.remaining(), 1);
        assert_eq!(driver.pop_due(at(11, 0, 0)).unwrap().entry_id, 9);
    }
}
