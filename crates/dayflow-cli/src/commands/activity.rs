use clap::Subcommand;

use super::{open_db, CmdResult};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Create a new activity
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Subjective effort, 1-10
        #[arg(long, default_value_t = 5)]
        effort: i64,
    },
    /// List activities
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete an activity
    Rm { id: i64 },
}

pub fn run(action: ActivityAction) -> CmdResult {
    let db = open_db()?;
    match action {
        ActivityAction::Add {
            title,
            description,
            effort,
        } => {
            let activity = db.create_activity(&title, description.as_deref(), effort)?;
            println!("Activity created: {} (id {})", activity.title, activity.id);
        }
        ActivityAction::List { json } => {
            let activities = db.list_activities()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&activities)?);
            } else {
                for activity in &activities {
                    println!(
                        "{:>4}  {}  (effort {})",
                        activity.id, activity.title, activity.effort_level
                    );
                }
            }
        }
        ActivityAction::Rm { id } => {
            db.delete_activity(id)?;
            println!("Activity {id} deleted");
        }
    }
    Ok(())
}
