pub mod activity;
pub mod dnd;
pub mod schedule;
pub mod stats;
pub mod timer;
pub mod timetable;

use std::rc::Rc;

use chrono::{Local, NaiveDate};
use dayflow_core::{Clock, Database, EventBus, TimerService, TimerSnapshot};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Settings key holding the serialized timer snapshot between invocations.
pub const TIMER_STATE_KEY: &str = "timer.state";

/// Settings keys a running `schedule watch` loop polls for requests queued
/// by other invocations.
pub const REFRESH_REQUEST_KEY: &str = "reminder.refresh_requested";
pub const SNOOZE_REQUEST_KEY: &str = "reminder.snooze_requested";

pub fn open_db() -> Result<Rc<Database>, Box<dyn std::error::Error>> {
    Ok(Rc::new(Database::open()?))
}

/// Resolve a `--date` argument; `None` and `"today"` mean the local date.
pub fn parse_date(value: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match value {
        None | Some("today") => Ok(Local::now().date_naive()),
        Some(raw) => Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?),
    }
}

/// Build a timer restored from the snapshot persisted by the last invocation.
pub fn load_timer(db: &Rc<Database>, clock: Rc<dyn Clock>, bus: EventBus) -> TimerService {
    let mut timer = TimerService::new(db.clone(), clock, bus);
    if let Ok(Some(json)) = db.get_setting(TIMER_STATE_KEY) {
        if let Ok(snapshot) = serde_json::from_str::<TimerSnapshot>(&json) {
            timer.restore(snapshot);
        }
    }
    timer
}

pub fn save_timer(db: &Database, timer: &TimerService) -> CmdResult {
    let json = serde_json::to_string(&timer.snapshot())?;
    db.set_setting(TIMER_STATE_KEY, &json)?;
    Ok(())
}

/// Print all queued events, one JSON object per line.
pub fn print_events(bus: &EventBus) -> CmdResult {
    for event in bus.drain() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

/// Format whole seconds as `HH:MM:SS`.
pub fn fmt_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
