//! Derives the day's ordered start/end event list from timetable entries.
//!
//! Building is a pure function over the entries: invalid or overnight slots
//! are dropped silently, every surviving slot contributes one Start and one
//! End event, and the result is sorted ascending by timestamp with ties kept
//! in input order. The list is rebuilt wholesale on every refresh; nothing
//! is patched incrementally.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::TimetableEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotEventKind {
    Start,
    End,
}

/// A discrete slot boundary on the day's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotEvent {
    /// Absolute local wall-clock instant the boundary fires at.
    pub when: NaiveDateTime,
    pub kind: SlotEventKind,
    pub entry_id: i64,
    pub activity_id: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    pub notes: String,
}

/// Parse an "HH:MM" string into a time of day.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let (hh, mm) = value.split_once(':')?;
    let hour: u32 = hh.parse().ok()?;
    let minute: u32 = mm.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Build the ordered event list for `date` from its timetable entries.
///
/// Slots with unparseable times or `end <= start` (zero-length or overnight)
/// are skipped. The sort is stable, so events at the same instant keep the
/// order their slots were listed in.
pub fn build_day_events(date: NaiveDate, entries: &[TimetableEntry]) -> Vec<SlotEvent> {
    let mut events = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        let (Some(start), Some(end)) = (
            parse_hhmm(&entry.start_time),
            parse_hhmm(&entry.end_time),
        ) else {
            debug!(
                entry_id = entry.id,
                start = %entry.start_time,
                end = %entry.end_time,
                "skipping slot with unparseable time"
            );
            continue;
        };
        let start_dt = date.and_time(start);
        let end_dt = date.and_time(end);
        if end_dt <= start_dt {
            debug!(entry_id = entry.id, "skipping zero-length or overnight slot");
            continue;
        }
        events.push(slot_event(entry, start_dt, SlotEventKind::Start));
        events.push(slot_event(entry, end_dt, SlotEventKind::End));
    }
    events.sort_by_key(|ev| ev.when);
    events
}

fn slot_event(entry: &TimetableEntry, when: NaiveDateTime, kind: SlotEventKind) -> SlotEvent {
    SlotEvent {
        when,
        kind,
        entry_id: entry.id,
        activity_id: entry.activity_id,
        start_time: entry.start_time.clone(),
        end_time: entry.end_time.clone(),
        notes: entry.notes.clone().unwrap_or_default(),
    }
}
