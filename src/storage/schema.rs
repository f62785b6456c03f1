//! Database schema and migrations.

use anyhow::Result;
use rusqlite::Connection;

/// Run all pending migrations.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS timetable_entries (
            id TEXT PRIMARY KEY,
            instructor_id TEXT NOT NULL,
            subject TEXT NOT NULL,
            course TEXT NOT NULL,
            room TEXT,
            day_of_week INTEGER NOT NULL,
            start_min INTEGER NOT NULL,
            end_min INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS network_samples (
            id INTEGER PRIMARY KEY,
            bandwidth_mbps REAL NOT NULL,
            latency_ms INTEGER NOT NULL DEFAULT 0,
            is_online INTEGER NOT NULL DEFAULT 1,
            save_data INTEGER NOT NULL DEFAULT 0,
            connection_type TEXT,
            category TEXT NOT NULL,
            recommended_tier TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'monitor',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS conflict_log (
            id INTEGER PRIMARY KEY,
            source TEXT NOT NULL,
            kind TEXT NOT NULL,
            proposed_id TEXT NOT NULL,
            existing_id TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_entries_instructor_day
            ON timetable_entries(instructor_id, day_of_week);
        CREATE INDEX IF NOT EXISTS idx_samples_created ON network_samples(created_at);
        CREATE INDEX IF NOT EXISTS idx_conflict_log_created ON conflict_log(created_at);",
    )?;

    Ok(())
}
