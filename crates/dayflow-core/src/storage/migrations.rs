//! Database schema migrations for dayflow.
//!
//! Each schema change is one SQL batch in [`MIGRATIONS`]; applied versions
//! are tracked in the `schema_migrations` table, so opening a database is
//! idempotent and upgrades older files in place.

use rusqlite::{params, Connection, Result as SqliteResult};

/// Versioned migration batches, applied in order.
const MIGRATIONS: &[(i64, &str)] = &[
    (
        1,
        "CREATE TABLE IF NOT EXISTS activities (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            title         TEXT NOT NULL,
            description   TEXT,
            effort_level  INTEGER NOT NULL DEFAULT 5,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS timetables (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            date        TEXT NOT NULL UNIQUE,
            mode        TEXT NOT NULL DEFAULT 'CHILL',
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS timetable_entries (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            timetable_id  INTEGER NOT NULL REFERENCES timetables(id) ON DELETE CASCADE,
            activity_id   INTEGER REFERENCES activities(id),
            start_time    TEXT NOT NULL,
            end_time      TEXT NOT NULL,
            notes         TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            activity_id       INTEGER NOT NULL REFERENCES activities(id),
            start_time        TEXT NOT NULL,
            end_time          TEXT,
            duration_seconds  INTEGER,
            created_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        );",
    ),
    (
        2,
        "CREATE INDEX IF NOT EXISTS idx_sessions_start_time ON sessions(start_time);
        CREATE INDEX IF NOT EXISTS idx_entries_timetable ON timetable_entries(timetable_id);",
    ),
];

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration batch fails; already-applied versions are
/// skipped.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        );",
    )?;

    let applied = applied_versions(conn)?;
    for (version, sql) in MIGRATIONS {
        if applied.contains(version) {
            continue;
        }
        conn.execute_batch(sql)?;
        conn.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            params![version],
        )?;
    }
    Ok(())
}

fn applied_versions(conn: &Connection) -> SqliteResult<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let versions = applied_versions(&conn).unwrap();
        assert_eq!(versions.len(), MIGRATIONS.len());
    }

    #[test]
    fn all_tables_exist_after_migrate() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        for table in [
            "activities",
            "timetables",
            "timetable_entries",
            "sessions",
            "settings",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }
}
