use std::rc::Rc;

use clap::Subcommand;
use dayflow_core::{
    build_day_events, Clock, Config, Database, Event, EventBus, NotificationCenter,
    NotificationSink, SlotEventKind, SystemClock,
};

use super::{
    load_timer, open_db, parse_date, save_timer, CmdResult, REFRESH_REQUEST_KEY,
    SNOOZE_REQUEST_KEY,
};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show the derived start/end event list for a date
    Show {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Run the reminder loop in the foreground
    Watch,
    /// Ask a running watch loop to rebuild its schedule
    Refresh,
    /// Ask a running watch loop to replay the last start reminder
    Snooze,
}

/// Sink that prints reminders to the console.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&mut self, message: &str) {
        println!("[reminder] {message}");
    }
}

pub fn run(action: ScheduleAction) -> CmdResult {
    match action {
        ScheduleAction::Show { date, json } => show(date.as_deref(), json),
        ScheduleAction::Watch => watch(),
        ScheduleAction::Refresh => request(REFRESH_REQUEST_KEY),
        ScheduleAction::Snooze => request(SNOOZE_REQUEST_KEY),
    }
}

fn show(date: Option<&str>, json: bool) -> CmdResult {
    let db = open_db()?;
    let date = parse_date(date)?;
    let Some(timetable) = db.get_timetable_by_date(date)? else {
        println!("no timetable for {date}");
        return Ok(());
    };
    let entries = db.list_timetable_entries(timetable.id)?;
    let events = build_day_events(date, &entries);
    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }
    for event in &events {
        let kind = match event.kind {
            SlotEventKind::Start => "start",
            SlotEventKind::End => "end",
        };
        let title = match event.activity_id {
            Some(id) => db
                .get_activity(id)?
                .map(|a| a.title)
                .unwrap_or_else(|| format!("Activity {id}")),
            None => "-".to_string(),
        };
        println!("{}  {kind:<5}  {title}", event.when);
    }
    Ok(())
}

fn watch() -> CmdResult {
    let db = open_db()?;
    let config = Config::load_or_default();
    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let bus = EventBus::new();
    let timer = load_timer(&db, clock.clone(), bus.clone());
    let mut center = NotificationCenter::new(
        db.clone(),
        clock,
        bus.clone(),
        timer,
        Box::new(ConsoleSink),
        &config,
    );
    center.rebuild_schedule()?;
    println!("watching today's schedule; Ctrl-C to quit");

    let interval = std::time::Duration::from_secs(config.timer.tick_interval_secs.max(1));
    loop {
        if take_request(&db, REFRESH_REQUEST_KEY) {
            center.rebuild_schedule()?;
        }
        if take_request(&db, SNOOZE_REQUEST_KEY) {
            center.snooze();
        }
        center.poll();
        center.timer_mut().tick();

        // Ticks are progress chatter; a line per second would flood the
        // console, so only discrete events are echoed.
        let mut dirty = false;
        for event in bus.drain() {
            if matches!(event, Event::TimerTick { .. }) {
                continue;
            }
            println!("{}", serde_json::to_string(&event)?);
            dirty = true;
        }
        if dirty {
            save_timer(&db, center.timer())?;
        }
        std::thread::sleep(interval);
    }
}

fn request(key: &str) -> CmdResult {
    let db = open_db()?;
    db.set_setting(key, "1")?;
    println!("request queued for the watch loop");
    Ok(())
}

fn take_request(db: &Database, key: &str) -> bool {
    match db.get_setting(key) {
        Ok(Some(value)) if value == "1" => {
            let _ = db.set_setting(key, "0");
            true
        }
        _ => false,
    }
}
