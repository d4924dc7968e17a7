use std::rc::Rc;

use clap::Subcommand;
use dayflow_core::{EventBus, SystemClock, TimerState};

use super::{load_timer, open_db, print_events, save_timer, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start tracking an activity
    Start { activity_id: i64 },
    /// Pause elapsed time tracking
    Pause,
    /// Resume a paused session
    Resume,
    /// Stop tracking and persist the session
    Stop,
    /// Print current timer state as JSON
    Status,
}

#[derive(serde::Serialize)]
struct TimerStatus {
    state: TimerState,
    activity_id: Option<i64>,
    session_id: Option<i64>,
    elapsed_secs: u64,
}

pub fn run(action: TimerAction) -> CmdResult {
    let db = open_db()?;
    let bus = EventBus::new();
    let mut timer = load_timer(&db, Rc::new(SystemClock), bus.clone());

    match action {
        TimerAction::Start { activity_id } => {
            if db.get_activity(activity_id)?.is_none() {
                return Err(format!("no activity with id {activity_id}").into());
            }
            let session_id = timer.start(activity_id)?;
            println!("session {session_id} started");
        }
        TimerAction::Pause => timer.pause(),
        TimerAction::Resume => timer.resume(),
        TimerAction::Stop => match timer.stop()? {
            Some(session_id) => println!("session {session_id} stopped"),
            None => println!("timer is idle"),
        },
        TimerAction::Status => {
            let status = TimerStatus {
                state: timer.state(),
                activity_id: timer.current_activity_id(),
                session_id: timer.current_session_id(),
                elapsed_secs: timer.elapsed_secs(),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    print_events(&bus)?;
    save_timer(&db, &timer)?;
    Ok(())
}
