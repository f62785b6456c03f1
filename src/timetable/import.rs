//! Bulk import validation.
//!
//! Shared by the API import endpoint and the CLI `timetable import`
//! subcommand: validate each submitted row, run the batch conflict
//! check against persisted schedules, and decide which rows may be
//! persisted. Persistence itself stays with the caller.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::conflict::{detect_conflicts_for_many, Conflict, ConflictKind, ConflictPolicy};
use super::{EntryDraft, TimetableEntry};

/// A row that will not be persisted, with the reason.
#[derive(Debug, Serialize)]
pub struct SkippedRow {
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ImportPlan {
    pub accepted: Vec<TimetableEntry>,
    pub skipped: Vec<SkippedRow>,
    /// Full conflict report, keyed by entry id. Soft conflicts do not
    /// block a row; hard conflicts do.
    pub conflicts: BTreeMap<String, Vec<Conflict>>,
}

/// Validate a submitted batch and decide which rows may be persisted.
/// Rows are checked against the persisted schedule only; two rows in
/// the same batch are never checked against each other.
pub fn plan_import(
    rows: Vec<EntryDraft>,
    existing_by_instructor: &HashMap<String, Vec<TimetableEntry>>,
    policy: &ConflictPolicy,
) -> ImportPlan {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for row in rows {
        let id = row.id.clone();
        match row.into_entry() {
            Ok(entry) => entries.push(entry),
            Err(e) => skipped.push(SkippedRow {
                id,
                reason: e.to_string(),
            }),
        }
    }

    let conflicts = detect_conflicts_for_many(&entries, existing_by_instructor, policy);

    let mut accepted = Vec::new();
    for entry in entries {
        let hard = conflicts
            .get(&entry.id)
            .is_some_and(|list| list.iter().any(|c| c.kind == ConflictKind::Hard));
        if hard {
            skipped.push(SkippedRow {
                id: Some(entry.id.clone()),
                reason: "hard conflict with persisted schedule".to_string(),
            });
        } else {
            accepted.push(entry);
        }
    }

    ImportPlan {
        accepted,
        skipped,
        conflicts,
    }
}
