use clap::Subcommand;
use dayflow_core::DND_KEY;

use super::{open_db, CmdResult};

#[derive(Subcommand)]
pub enum DndAction {
    /// Suppress visible reminders (automation keeps running)
    On,
    /// Show reminders again
    Off,
    /// Print the current state
    Status,
}

pub fn run(action: DndAction) -> CmdResult {
    let db = open_db()?;
    match action {
        DndAction::On => {
            db.set_setting(DND_KEY, "1")?;
            println!("Do Not Disturb ON");
        }
        DndAction::Off => {
            db.set_setting(DND_KEY, "0")?;
            println!("Do Not Disturb OFF");
        }
        DndAction::Status => {
            let on = db.get_setting(DND_KEY)?.as_deref() == Some("1");
            println!("{}", if on { "on" } else { "off" });
        }
    }
    Ok(())
}
