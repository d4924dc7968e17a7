use clap::Subcommand;
use dayflow_core::{parse_hhmm, TimetableMode};

use super::{open_db, parse_date, CmdResult};

#[derive(Subcommand)]
pub enum TimetableAction {
    /// Create a timetable for a date
    New {
        /// YYYY-MM-DD, or "today"
        #[arg(long)]
        date: Option<String>,
        /// chill or locked-in
        #[arg(long, default_value = "chill")]
        mode: String,
    },
    /// Add a slot to a date's timetable (created on demand)
    Add {
        /// Slot start, HH:MM
        start: String,
        /// Slot end, HH:MM
        end: String,
        #[arg(long)]
        date: Option<String>,
        /// Activity id to track during this slot
        #[arg(long)]
        activity: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show a date's timetable
    Show {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TimetableAction) -> CmdResult {
    let db = open_db()?;
    match action {
        TimetableAction::New { date, mode } => {
            let date = parse_date(date.as_deref())?;
            let mode = TimetableMode::parse(&mode)
                .ok_or("invalid mode; expected chill or locked-in")?;
            if db.get_timetable_by_date(date)?.is_some() {
                return Err(format!("timetable for {date} already exists").into());
            }
            let timetable = db.create_timetable(date, mode)?;
            println!("Timetable created for {} (id {})", timetable.date, timetable.id);
        }
        TimetableAction::Add {
            start,
            end,
            date,
            activity,
            notes,
        } => {
            let start = parse_hhmm(&start)
                .ok_or_else(|| format!("invalid start time {start:?}; expected HH:MM"))?;
            let end = parse_hhmm(&end)
                .ok_or_else(|| format!("invalid end time {end:?}; expected HH:MM"))?;
            let date = parse_date(date.as_deref())?;
            let timetable = match db.get_timetable_by_date(date)? {
                Some(timetable) => timetable,
                None => db.create_timetable(date, TimetableMode::Chill)?,
            };
            // Stored zero-padded so entries order chronologically.
            let entry = db.create_timetable_entry(
                timetable.id,
                activity,
                &start.format("%H:%M").to_string(),
                &end.format("%H:%M").to_string(),
                notes.as_deref(),
            )?;
            println!("Slot added: {}-{} (id {})", entry.start_time, entry.end_time, entry.id);
        }
        TimetableAction::Show { date, json } => {
            let date = parse_date(date.as_deref())?;
            let Some(timetable) = db.get_timetable_by_date(date)? else {
                println!("no timetable for {date}");
                return Ok(());
            };
            let entries = db.list_timetable_entries(timetable.id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{} ({})", timetable.date, timetable.mode.as_str());
                for entry in &entries {
                    let title = match entry.activity_id {
                        Some(id) => db
                            .get_activity(id)?
                            .map(|a| a.title)
                            .unwrap_or_else(|| format!("Activity {id}")),
                        None => "-".to_string(),
                    };
                    let notes = entry.notes.as_deref().unwrap_or("");
                    println!(
                        "  {}-{}  {}  {}",
                        entry.start_time, entry.end_time, title, notes
                    );
                }
            }
        }
    }
    Ok(())
}
