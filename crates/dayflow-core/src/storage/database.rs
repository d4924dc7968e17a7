//! SQLite-backed storage for activities, timetables, tracked sessions, and
//! the key-value settings store.
//!
//! All dates are stored as `YYYY-MM-DD` strings and instants as RFC 3339
//! UTC strings, so range queries can compare lexicographically.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::DatabaseError;
use crate::model::{Activity, SessionRecord, Timetable, TimetableEntry, TimetableMode};

use super::{data_dir, migrations};

/// SQLite database handle.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/dayflow.db`, creating the file and
    /// migrating the schema as needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> crate::error::Result<Self> {
        let path = data_dir()?.join("dayflow.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        Ok(Self::init(conn)?)
    }

    /// Open an in-memory database (primarily for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, DatabaseError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", 1)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        migrations::migrate(&conn)
            .map_err(|err| DatabaseError::MigrationFailed(err.to_string()))?;
        Ok(Self { conn })
    }

    // ── Activities ───────────────────────────────────────────────────

    pub fn create_activity(
        &self,
        title: &str,
        description: Option<&str>,
        effort_level: i64,
    ) -> Result<Activity, DatabaseError> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO activities (title, description, effort_level, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![title, description, effort_level, created_at.to_rfc3339()],
        )?;
        Ok(Activity {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            description: description.map(str::to_string),
            effort_level,
            created_at,
        })
    }

    pub fn get_activity(&self, id: i64) -> Result<Option<Activity>, DatabaseError> {
        let activity = self
            .conn
            .query_row(
                "SELECT id, title, description, effort_level, created_at
                 FROM activities WHERE id = ?1",
                params![id],
                map_activity,
            )
            .optional()?;
        Ok(activity)
    }

    pub fn list_activities(&self) -> Result<Vec<Activity>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, effort_level, created_at
             FROM activities ORDER BY id",
        )?;
        let rows = stmt.query_map([], map_activity)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn update_activity(&self, activity: &Activity) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE activities SET title = ?1, description = ?2, effort_level = ?3
             WHERE id = ?4",
            params![
                activity.title,
                activity.description,
                activity.effort_level,
                activity.id
            ],
        )?;
        Ok(())
    }

    pub fn delete_activity(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Timetables ───────────────────────────────────────────────────

    pub fn create_timetable(
        &self,
        date: NaiveDate,
        mode: TimetableMode,
    ) -> Result<Timetable, DatabaseError> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO timetables (date, mode, created_at) VALUES (?1, ?2, ?3)",
            params![
                date.format("%Y-%m-%d").to_string(),
                mode.as_str(),
                created_at.to_rfc3339()
            ],
        )?;
        Ok(Timetable {
            id: self.conn.last_insert_rowid(),
            date,
            mode,
            created_at,
        })
    }

    pub fn get_timetable_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<Timetable>, DatabaseError> {
        let timetable = self
            .conn
            .query_row(
                "SELECT id, date, mode, created_at FROM timetables WHERE date = ?1",
                params![date.format("%Y-%m-%d").to_string()],
                map_timetable,
            )
            .optional()?;
        Ok(timetable)
    }

    pub fn delete_timetable(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM timetables WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn create_timetable_entry(
        &self,
        timetable_id: i64,
        activity_id: Option<i64>,
        start_time: &str,
        end_time: &str,
        notes: Option<&str>,
    ) -> Result<TimetableEntry, DatabaseError> {
        self.conn.execute(
            "INSERT INTO timetable_entries
                 (timetable_id, activity_id, start_time, end_time, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                timetable_id,
                activity_id,
                start_time,
                end_time,
                notes,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(TimetableEntry {
            id: self.conn.last_insert_rowid(),
            timetable_id,
            activity_id,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            notes: notes.map(str::to_string),
        })
    }

    /// Entries ordered by start time, ties by insertion order.
    pub fn list_timetable_entries(
        &self,
        timetable_id: i64,
    ) -> Result<Vec<TimetableEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timetable_id, activity_id, start_time, end_time, notes
             FROM timetable_entries WHERE timetable_id = ?1
             ORDER BY start_time, id",
        )?;
        let rows = stmt.query_map(params![timetable_id], |row| {
            Ok(TimetableEntry {
                id: row.get(0)?,
                timetable_id: row.get(1)?,
                activity_id: row.get(2)?,
                start_time: row.get(3)?,
                end_time: row.get(4)?,
                notes: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Create an open-ended session record; returns its id.
    pub fn create_session(
        &self,
        activity_id: i64,
        start_time: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (activity_id, start_time, created_at)
             VALUES (?1, ?2, ?3)",
            params![
                activity_id,
                start_time.to_rfc3339(),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fill in the end time and final duration of an open session.
    pub fn finalize_session(
        &self,
        id: i64,
        end_time: DateTime<Utc>,
        duration_seconds: u64,
    ) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET end_time = ?1, duration_seconds = ?2 WHERE id = ?3",
            params![end_time.to_rfc3339(), duration_seconds as i64, id],
        )?;
        if changed == 0 {
            return Err(DatabaseError::QueryFailed(format!("session {id} not found")));
        }
        Ok(())
    }

    pub fn get_session(&self, id: i64) -> Result<Option<SessionRecord>, DatabaseError> {
        let session = self
            .conn
            .query_row(
                "SELECT id, activity_id, start_time, end_time, duration_seconds
                 FROM sessions WHERE id = ?1",
                params![id],
                map_session,
            )
            .optional()?;
        Ok(session)
    }

    pub fn list_sessions_by_day(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<SessionRecord>, DatabaseError> {
        let (from, to) = day_bounds(date);
        let mut stmt = self.conn.prepare(
            "SELECT id, activity_id, start_time, end_time, duration_seconds
             FROM sessions WHERE start_time >= ?1 AND start_time < ?2
             ORDER BY start_time",
        )?;
        let rows = stmt.query_map(params![from, to], map_session)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Total finalized seconds tracked on `date`.
    pub fn tracked_secs_for_day(&self, date: NaiveDate) -> Result<u64, DatabaseError> {
        let (from, to) = day_bounds(date);
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_seconds), 0) FROM sessions
             WHERE start_time >= ?1 AND start_time < ?2",
            params![from, to],
            |row| row.get(0),
        )?;
        Ok(total.max(0) as u64)
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

// ── Row mappers ──────────────────────────────────────────────────────

fn map_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        effort_level: row.get(3)?,
        created_at: parse_utc(4, row.get(4)?)?,
    })
}

fn map_timetable(row: &rusqlite::Row<'_>) -> rusqlite::Result<Timetable> {
    let date_str: String = row.get(1)?;
    let mode_str: String = row.get(2)?;
    Ok(Timetable {
        id: row.get(0)?,
        date: parse_date(1, date_str)?,
        mode: TimetableMode::parse(&mode_str).unwrap_or(TimetableMode::Chill),
        created_at: parse_utc(3, row.get(3)?)?,
    })
}

fn map_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRecord> {
    let end_time: Option<String> = row.get(3)?;
    Ok(SessionRecord {
        id: row.get(0)?,
        activity_id: row.get(1)?,
        start_time: parse_utc(2, row.get(2)?)?,
        end_time: end_time.map(|s| parse_utc(3, s)).transpose()?,
        duration_seconds: row
            .get::<_, Option<i64>>(4)?
            .map(|secs| secs.max(0) as u64),
    })
}

fn parse_utc(column: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })
}

fn parse_date(column: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            Box::new(err),
        )
    })
}

/// UTC day range `[from, to)` as RFC 3339 strings.
fn day_bounds(date: NaiveDate) -> (String, String) {
    let next = date.succ_opt().unwrap_or(date);
    (
        format!("{date}T00:00:00+00:00"),
        format!("{next}T00:00:00+00:00"),
    )
}
