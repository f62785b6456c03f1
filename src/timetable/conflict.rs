//! Hard/soft conflict classification between timetable entries.
//!
//! Conflicts are data, not errors: the detector classifies pairs and
//! returns results, and never fails on conflicting input. Inputs are
//! assumed validated (see `clock`); comparisons run on minute-of-day
//! integers only.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::TimetableEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// The two intervals overlap in time.
    Hard,
    /// Back-to-back: no overlap, but the gap is within tolerance.
    Soft,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Hard => write!(f, "hard"),
            ConflictKind::Soft => write!(f, "soft"),
        }
    }
}

/// One classified pair: the proposed entry against one existing entry.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub proposed: TimetableEntry,
    pub existing: TimetableEntry,
    pub message: String,
}

/// Tunable detection parameters, surfaced through the config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictPolicy {
    /// Maximum gap (minutes) still flagged as back-to-back.
    pub back_to_back_tolerance_min: u16,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            back_to_back_tolerance_min: 5,
        }
    }
}

/// Classify `proposed` against every entry of one instructor's
/// persisted schedule. One result per conflicting existing entry, in
/// input order. `exclude_id` skips the entry currently being edited.
pub fn detect_conflicts(
    proposed: &TimetableEntry,
    existing: &[TimetableEntry],
    exclude_id: Option<&str>,
    policy: &ConflictPolicy,
) -> Vec<Conflict> {
    let mut found = Vec::new();

    for entry in existing {
        if entry.slot.day_of_week != proposed.slot.day_of_week {
            continue;
        }
        if exclude_id.is_some_and(|id| entry.id == id) {
            continue;
        }

        if proposed.slot.overlaps(&entry.slot) {
            found.push(Conflict {
                kind: ConflictKind::Hard,
                proposed: proposed.clone(),
                existing: entry.clone(),
                message: format!(
                    "'{}' ({}) overlaps '{}' ({})",
                    proposed.subject,
                    proposed.slot.describe(),
                    entry.subject,
                    entry.slot.describe()
                ),
            });
        } else if let Some(gap) = proposed.slot.gap_minutes(&entry.slot) {
            if gap <= policy.back_to_back_tolerance_min {
                found.push(Conflict {
                    kind: ConflictKind::Soft,
                    proposed: proposed.clone(),
                    existing: entry.clone(),
                    message: format!(
                        "'{}' is back-to-back with '{}' ({} min gap, {})",
                        proposed.subject,
                        entry.subject,
                        gap,
                        entry.slot.describe()
                    ),
                });
            }
        }
    }

    found
}

/// Bulk-import variant: group the batch by instructor and check each
/// entry against that instructor's persisted schedule. Entries in the
/// same batch are NOT checked against each other; two overlapping rows
/// in one import both pass if the persisted schedule is clear.
/// Only entries with at least one conflict appear in the result.
pub fn detect_conflicts_for_many(
    batch: &[TimetableEntry],
    existing_by_instructor: &HashMap<String, Vec<TimetableEntry>>,
    policy: &ConflictPolicy,
) -> BTreeMap<String, Vec<Conflict>> {
    let mut report = BTreeMap::new();

    for entry in batch {
        let existing = existing_by_instructor
            .get(&entry.instructor_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let conflicts = detect_conflicts(entry, existing, None, policy);
        if !conflicts.is_empty() {
            report.insert(entry.id.clone(), conflicts);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::TimeSlot;

    fn entry(id: &str, instructor: &str, day: u8, start: &str, end: &str) -> TimetableEntry {
        TimetableEntry {
            id: id.to_string(),
            instructor_id: instructor.to_string(),
            subject: format!("Subject {}", id),
            course: "Course".to_string(),
            room: None,
            slot: TimeSlot::from_strings(day, start, end).unwrap(),
        }
    }

    fn policy() -> ConflictPolicy {
        ConflictPolicy::default()
    }

    #[test]
    fn test_overlap_is_hard_conflict() {
        let existing = vec![entry("e1", "i1", 1, "09:00", "10:00")];
        let proposed = entry("p1", "i1", 1, "09:30", "10:30");

        let conflicts = detect_conflicts(&proposed, &existing, None, &policy());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Hard);
        assert_eq!(conflicts[0].existing.id, "e1");
    }

    #[test]
    fn test_touching_endpoints_are_soft() {
        let existing = vec![entry("e1", "i1", 1, "09:00", "10:00")];
        let proposed = entry("p1", "i1", 1, "10:00", "11:00");

        let conflicts = detect_conflicts(&proposed, &existing, None, &policy());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Soft);
        assert!(conflicts[0].message.contains("back-to-back"));
    }

    #[test]
    fn test_clear_gap_is_no_conflict() {
        let existing = vec![entry("e1", "i1", 1, "09:00", "10:00")];
        let proposed = entry("p1", "i1", 1, "11:00", "12:00");

        let conflicts = detect_conflicts(&proposed, &existing, None, &policy());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_different_days_never_conflict() {
        let existing = vec![entry("e1", "i1", 2, "09:00", "10:00")];
        let proposed = entry("p1", "i1", 1, "09:00", "10:00");

        let conflicts = detect_conflicts(&proposed, &existing, None, &policy());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_gap_within_tolerance_is_soft_in_both_directions() {
        // Existing before proposed, and existing after proposed.
        let existing = vec![
            entry("before", "i1", 1, "08:00", "08:57"),
            entry("after", "i1", 1, "10:03", "11:00"),
        ];
        let proposed = entry("p1", "i1", 1, "09:00", "10:00");

        let conflicts = detect_conflicts(&proposed, &existing, None, &policy());
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().all(|c| c.kind == ConflictKind::Soft));
        // Input order preserved.
        assert_eq!(conflicts[0].existing.id, "before");
        assert_eq!(conflicts[1].existing.id, "after");
    }

    #[test]
    fn test_gap_past_tolerance_is_clear() {
        let existing = vec![entry("e1", "i1", 1, "08:00", "08:54")];
        let proposed = entry("p1", "i1", 1, "09:00", "10:00");

        let conflicts = detect_conflicts(&proposed, &existing, None, &policy());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_custom_tolerance() {
        let existing = vec![entry("e1", "i1", 1, "08:00", "08:45")];
        let proposed = entry("p1", "i1", 1, "09:00", "10:00");

        let relaxed = ConflictPolicy {
            back_to_back_tolerance_min: 15,
        };
        let conflicts = detect_conflicts(&proposed, &existing, None, &relaxed);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Soft);
    }

    #[test]
    fn test_exclude_id_matches_removal() {
        // Checking an entry against a set containing itself, with the
        // id excluded, must equal checking against the set without it.
        let me = entry("self", "i1", 1, "09:00", "10:00");
        let other = entry("other", "i1", 1, "09:30", "10:30");
        let with_self = vec![me.clone(), other.clone()];
        let without_self = vec![other];

        let excluded = detect_conflicts(&me, &with_self, Some("self"), &policy());
        let removed = detect_conflicts(&me, &without_self, None, &policy());

        assert_eq!(excluded.len(), removed.len());
        assert_eq!(excluded[0].existing.id, removed[0].existing.id);
        assert_eq!(excluded[0].kind, removed[0].kind);
    }

    #[test]
    fn test_multiple_conflicts_accumulate() {
        let existing = vec![
            entry("e1", "i1", 1, "09:00", "09:45"),
            entry("e2", "i1", 1, "09:50", "10:40"),
            entry("e3", "i1", 1, "13:00", "14:00"),
        ];
        let proposed = entry("p1", "i1", 1, "09:30", "10:30");

        let conflicts = detect_conflicts(&proposed, &existing, None, &policy());
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().all(|c| c.kind == ConflictKind::Hard));
    }

    #[test]
    fn test_batch_checks_persisted_state_only() {
        // Two batch rows that overlap each other, against an empty
        // persisted schedule: neither is flagged. Siblings in the same
        // batch are not compared.
        let batch = vec![
            entry("b1", "i1", 1, "09:00", "10:00"),
            entry("b2", "i1", 1, "09:30", "10:30"),
        ];
        let existing = HashMap::new();

        let report = detect_conflicts_for_many(&batch, &existing, &policy());
        assert!(report.is_empty());
    }

    #[test]
    fn test_batch_flags_conflicts_per_instructor() {
        let batch = vec![
            entry("b1", "i1", 1, "09:30", "10:30"),
            entry("b2", "i2", 1, "09:30", "10:30"),
            entry("b3", "i1", 3, "09:00", "10:00"),
        ];
        let mut existing = HashMap::new();
        existing.insert(
            "i1".to_string(),
            vec![entry("e1", "i1", 1, "09:00", "10:00")],
        );

        let report = detect_conflicts_for_many(&batch, &existing, &policy());
        // b1 collides with i1's schedule; b2 belongs to an instructor
        // with no persisted entries; b3 is on another day.
        assert_eq!(report.len(), 1);
        assert_eq!(report["b1"].len(), 1);
        assert_eq!(report["b1"][0].kind, ConflictKind::Hard);
    }
}
