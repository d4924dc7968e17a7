//! Persistence: SQLite database, versioned migrations, TOML configuration.

mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns the data directory, honoring overrides:
///
/// - `DAYFLOW_DATA_DIR` points at an explicit directory (tests, portable use)
/// - `DAYFLOW_ENV=dev` switches to `~/.config/dayflow-dev/`
/// - default is `~/.config/dayflow/`
///
/// The directory is created if missing.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = if let Ok(explicit) = std::env::var("DAYFLOW_DATA_DIR") {
        PathBuf::from(explicit)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("DAYFLOW_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("dayflow-dev")
        } else {
            base_dir.join("dayflow")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
