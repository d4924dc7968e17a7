use clap::Subcommand;

use super::{fmt_hms, open_db, parse_date, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Tracked time summary for a date
    Summary {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List tracked sessions for a date
    Sessions {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(serde::Serialize)]
struct Summary {
    date: String,
    tracked_secs: u64,
    sessions: usize,
}

pub fn run(action: StatsAction) -> CmdResult {
    let db = open_db()?;
    match action {
        StatsAction::Summary { date, json } => {
            let date = parse_date(date.as_deref())?;
            let tracked_secs = db.tracked_secs_for_day(date)?;
            let sessions = db.list_sessions_by_day(date)?.len();
            if json {
                let summary = Summary {
                    date: date.to_string(),
                    tracked_secs,
                    sessions,
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{date}: {} tracked across {sessions} session(s)",
                    fmt_hms(tracked_secs)
                );
            }
        }
        StatsAction::Sessions { date, json } => {
            let date = parse_date(date.as_deref())?;
            let sessions = db.list_sessions_by_day(date)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }
            for session in &sessions {
                let title = db
                    .get_activity(session.activity_id)?
                    .map(|a| a.title)
                    .unwrap_or_else(|| format!("Activity {}", session.activity_id));
                let duration = session
                    .duration_seconds
                    .map(fmt_hms)
                    .unwrap_or_else(|| "open".to_string());
                println!(
                    "{:>4}  {}  {}  {}",
                    session.id,
                    session.start_time.format("%H:%M:%S"),
                    duration,
                    title
                );
            }
        }
    }
    Ok(())
}
