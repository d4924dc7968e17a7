//! Domain entities persisted by the storage layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined activity that time is tracked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Subjective effort on a 1-10 scale; 5 is the default.
    pub effort_level: i64,
    pub created_at: DateTime<Utc>,
}

/// Planning mode of a day's timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimetableMode {
    #[serde(rename = "CHILL")]
    Chill,
    #[serde(rename = "LOCKED_IN")]
    LockedIn,
}

impl TimetableMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimetableMode::Chill => "CHILL",
            TimetableMode::LockedIn => "LOCKED_IN",
        }
    }

    /// Parse a mode from user or database input. Case-insensitive,
    /// accepting `locked-in`/`locked_in` spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().replace('-', "_").as_str() {
            "CHILL" => Some(TimetableMode::Chill),
            "LOCKED_IN" => Some(TimetableMode::LockedIn),
            _ => None,
        }
    }
}

/// One day's planned timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timetable {
    pub id: i64,
    pub date: NaiveDate,
    pub mode: TimetableMode,
    pub created_at: DateTime<Utc>,
}

/// A time-boxed block on a timetable, optionally linked to an activity.
///
/// Start and end are kept as the "HH:MM" strings the user entered; the
/// schedule builder parses and validates them when deriving events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: i64,
    pub timetable_id: i64,
    pub activity_id: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
}

/// One tracked interval of time against an activity.
///
/// Created open-ended when the timer starts; `end_time` and
/// `duration_seconds` are filled in on stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub activity_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_accepts_spellings() {
        assert_eq!(TimetableMode::parse("chill"), Some(TimetableMode::Chill));
        assert_eq!(
            TimetableMode::parse("LOCKED_IN"),
            Some(TimetableMode::LockedIn)
        );
        assert_eq!(
            TimetableMode::parse("locked-in"),
            Some(TimetableMode::LockedIn)
        );
        assert_eq!(TimetableMode::parse("busy"), None);
    }

    #[test]
    fn mode_roundtrips_through_as_str() {
        for mode in [TimetableMode::Chill, TimetableMode::LockedIn] {
            assert_eq!(TimetableMode::parse(mode.as_str()), Some(mode));
        }
    }
}
