//! Integration tests for the elapsed timer against real (in-memory) storage.

use std::rc::Rc;

use chrono::NaiveDate;
use dayflow_core::{Database, Event, EventBus, ManualClock, TimerService, TimerState};

fn setup() -> (TimerService, Rc<ManualClock>, EventBus, Rc<Database>, i64) {
    let db = Rc::new(Database::open_memory().expect("in-memory database"));
    let activity = db.create_activity("Focus work", None, 5).unwrap();
    let clock = Rc::new(ManualClock::new(
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    ));
    let bus = EventBus::new();
    let timer = TimerService::new(db.clone(), clock.clone(), bus.clone());
    (timer, clock, bus, db, activity.id)
}

fn tick_values(events: &[Event]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|ev| match ev {
            Event::TimerTick { elapsed_secs, .. } => Some(*elapsed_secs),
            _ => None,
        })
        .collect()
}

#[test]
fn pause_gap_is_excluded_from_the_persisted_duration() {
    let (mut timer, clock, bus, db, activity_id) = setup();

    let session_id = timer.start(activity_id).unwrap();
    assert_eq!(tick_values(&bus.drain()), vec![0]);

    clock.advance_secs(5);
    timer.tick();
    assert_eq!(tick_values(&bus.drain()), vec![5]);

    timer.pause();
    bus.drain();
    clock.advance_secs(10);
    timer.tick();
    assert!(bus.drain().is_empty(), "no ticks while paused");

    timer.resume();
    bus.drain();
    clock.advance_secs(3);
    timer.tick();
    assert_eq!(tick_values(&bus.drain()), vec![8]);

    assert_eq!(timer.stop().unwrap(), Some(session_id));
    let record = db.get_session(session_id).unwrap().unwrap();
    assert_eq!(record.duration_seconds, Some(8));
    assert!(record.end_time.is_some());
}

#[test]
fn many_pause_resume_cycles_do_not_drift() {
    let (mut timer, clock, _bus, db, activity_id) = setup();

    let session_id = timer.start(activity_id).unwrap();
    for _ in 0..10 {
        clock.advance_secs(2);
        timer.pause();
        clock.advance_secs(30);
        timer.resume();
    }
    clock.advance_secs(4);
    timer.stop().unwrap();

    let record = db.get_session(session_id).unwrap().unwrap();
    assert_eq!(record.duration_seconds, Some(10 * 2 + 4));
}

#[test]
fn stop_is_idempotent_and_never_double_writes() {
    let (mut timer, clock, _bus, db, activity_id) = setup();

    let session_id = timer.start(activity_id).unwrap();
    clock.advance_secs(60);
    assert_eq!(timer.stop().unwrap(), Some(session_id));
    assert_eq!(timer.stop().unwrap(), None);
    assert_eq!(timer.state(), TimerState::Idle);

    let rows: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    let record = db.get_session(session_id).unwrap().unwrap();
    assert_eq!(record.duration_seconds, Some(60));
}

#[test]
fn session_row_opens_on_start_and_finalizes_on_stop() {
    let (mut timer, clock, _bus, db, activity_id) = setup();

    let session_id = timer.start(activity_id).unwrap();
    let open = db.get_session(session_id).unwrap().unwrap();
    assert_eq!(open.activity_id, activity_id);
    assert!(open.end_time.is_none());
    assert!(open.duration_seconds.is_none());

    clock.advance_secs(90);
    timer.stop().unwrap();
    let done = db.get_session(session_id).unwrap().unwrap();
    assert_eq!(done.duration_seconds, Some(90));
}
