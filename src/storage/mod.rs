//! SQLite storage layer -- schema, queries, migrations.

pub mod schema;

use std::collections::HashMap;

use anyhow::{Context, Result};
use r2d2::Pool as R2D2Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::quality::{ConnectionCategory, NetworkQualitySample, QualityTier};
use crate::timetable::conflict::Conflict;
use crate::timetable::{TimeSlot, TimetableEntry};

/// Connection Pool type
pub type Pool = R2D2Pool<SqliteConnectionManager>;

/// Open (or create) the SQLite database and return a connection pool.
pub fn open_pool(path: &str) -> Result<Pool> {
    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        c.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA temp_store = MEMORY;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    let pool = R2D2Pool::new(manager)?;

    // Run migrations on a single connection
    let conn = pool.get()?;
    schema::migrate(&conn)?;

    Ok(pool)
}

/// Persist a timetable entry. An existing id is overwritten (edit flow).
pub fn insert_entry(pool: &Pool, entry: &TimetableEntry) -> Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO timetable_entries
            (id, instructor_id, subject, course, room, day_of_week, start_min, end_min)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            instructor_id = excluded.instructor_id,
            subject = excluded.subject,
            course = excluded.course,
            room = excluded.room,
            day_of_week = excluded.day_of_week,
            start_min = excluded.start_min,
            end_min = excluded.end_min,
            updated_at = datetime('now')",
        params![
            entry.id,
            entry.instructor_id,
            entry.subject,
            entry.course,
            entry.room,
            entry.slot.day_of_week as i64,
            entry.slot.start_min as i64,
            entry.slot.end_min as i64,
        ],
    )
    .context("Failed to insert timetable entry")?;

    Ok(())
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimetableEntry> {
    Ok(TimetableEntry {
        id: row.get(0)?,
        instructor_id: row.get(1)?,
        subject: row.get(2)?,
        course: row.get(3)?,
        room: row.get(4)?,
        slot: TimeSlot {
            day_of_week: row.get::<_, i64>(5)? as u8,
            start_min: row.get::<_, i64>(6)? as u16,
            end_min: row.get::<_, i64>(7)? as u16,
        },
    })
}

const ENTRY_COLUMNS: &str =
    "id, instructor_id, subject, course, room, day_of_week, start_min, end_min";

/// All entries, ordered for stable table output.
pub fn list_entries(pool: &Pool) -> Result<Vec<TimetableEntry>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM timetable_entries
         ORDER BY instructor_id, day_of_week, start_min",
        ENTRY_COLUMNS
    ))?;

    let rows = stmt.query_map([], entry_from_row)?;

    let mut list = Vec::new();
    for r in rows {
        list.push(r?);
    }
    Ok(list)
}

/// One instructor's persisted schedule, the existing set the conflict
/// detector runs against.
pub fn entries_for_instructor(pool: &Pool, instructor_id: &str) -> Result<Vec<TimetableEntry>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM timetable_entries
         WHERE instructor_id = ?1
         ORDER BY day_of_week, start_min",
        ENTRY_COLUMNS
    ))?;

    let rows = stmt.query_map([instructor_id], entry_from_row)?;

    let mut list = Vec::new();
    for r in rows {
        list.push(r?);
    }
    Ok(list)
}

/// Persisted schedules for each distinct instructor in a batch.
pub fn schedules_for_instructors<'a>(
    pool: &Pool,
    instructors: impl IntoIterator<Item = &'a str>,
) -> Result<HashMap<String, Vec<TimetableEntry>>> {
    let mut map = HashMap::new();
    for id in instructors {
        if !map.contains_key(id) {
            map.insert(id.to_string(), entries_for_instructor(pool, id)?);
        }
    }
    Ok(map)
}

/// Delete an entry. Returns false when the id did not exist.
pub fn remove_entry(pool: &Pool, id: &str) -> Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute("DELETE FROM timetable_entries WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Record a sample together with the classification it produced.
pub fn save_sample(
    pool: &Pool,
    sample: &NetworkQualitySample,
    category: ConnectionCategory,
    tier: QualityTier,
    source: &str,
) -> Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO network_samples
            (bandwidth_mbps, latency_ms, is_online, save_data, connection_type,
             category, recommended_tier, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            sample.effective_bandwidth_mbps,
            sample.latency_ms as i64,
            sample.is_online,
            sample.save_data_enabled,
            sample.connection_type_raw,
            category.to_string(),
            tier.to_string(),
            source,
        ],
    )
    .context("Failed to insert network sample")?;

    Ok(())
}

/// A sample row as recorded, for the API and CLI to display.
#[derive(Debug, serde::Serialize)]
pub struct RecordedSample {
    pub bandwidth_mbps: f64,
    pub latency_ms: i64,
    pub is_online: bool,
    pub save_data: bool,
    pub connection_type: Option<String>,
    pub category: String,
    pub recommended_tier: String,
    pub source: String,
    pub created_at: String,
}

pub fn latest_sample(pool: &Pool) -> Result<Option<RecordedSample>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT bandwidth_mbps, latency_ms, is_online, save_data, connection_type,
                category, recommended_tier, source, created_at
         FROM network_samples
         ORDER BY id DESC LIMIT 1",
    )?;

    let mut rows = stmt.query_map([], |row| {
        Ok(RecordedSample {
            bandwidth_mbps: row.get(0)?,
            latency_ms: row.get(1)?,
            is_online: row.get::<_, i64>(2)? != 0,
            save_data: row.get::<_, i64>(3)? != 0,
            connection_type: row.get(4)?,
            category: row.get(5)?,
            recommended_tier: row.get(6)?,
            source: row.get(7)?,
            created_at: row.get(8)?,
        })
    })?;

    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

/// Audit trail of conflicts surfaced by checks, creates, and imports.
pub fn log_conflicts<'a>(
    pool: &Pool,
    source: &str,
    conflicts: impl IntoIterator<Item = &'a Conflict>,
) -> Result<()> {
    let conn = pool.get()?;
    for c in conflicts {
        conn.execute(
            "INSERT INTO conflict_log (source, kind, proposed_id, existing_id, message)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                source,
                c.kind.to_string(),
                c.proposed.id,
                c.existing.id,
                c.message,
            ],
        )?;
    }
    Ok(())
}
