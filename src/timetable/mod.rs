//! Timetable entries and conflict classification.

pub mod clock;
pub mod conflict;
pub mod import;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed time '{input}': {reason}")]
    MalformedTime { input: String, reason: &'static str },

    #[error("day of week {value} out of range (expected 0-6, 0 = Sunday)")]
    DayOutOfRange { value: u8 },

    #[error("slot ends at or before it starts ({start}..{end})")]
    EmptySlot { start: String, end: String },
}

/// Half-open time interval on one day of the week (0 = Sunday).
/// Value type, compared purely by value. Entries never span midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day_of_week: u8,
    /// Minutes since midnight.
    pub start_min: u16,
    pub end_min: u16,
}

impl TimeSlot {
    /// Validate wall-clock strings ("HH:MM" or "HH:MM:SS") and build a slot.
    pub fn from_strings(day_of_week: u8, start: &str, end: &str) -> Result<Self, ValidationError> {
        clock::weekday_from_index(day_of_week)?;
        let start_min = clock::parse_minute_of_day(start)?;
        let end_min = clock::parse_minute_of_day(end)?;
        if start_min >= end_min {
            return Err(ValidationError::EmptySlot {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            day_of_week,
            start_min,
            end_min,
        })
    }

    /// Half-open overlap test. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_min < other.end_min
            && other.start_min < self.end_min
    }

    /// Minutes between two non-overlapping slots on the same day.
    /// `None` when the slots overlap or fall on different days.
    pub fn gap_minutes(&self, other: &TimeSlot) -> Option<u16> {
        if self.day_of_week != other.day_of_week || self.overlaps(other) {
            return None;
        }
        if self.end_min <= other.start_min {
            Some(other.start_min - self.end_min)
        } else {
            Some(self.start_min - other.end_min)
        }
    }

    /// Human-readable form, e.g. "Mon 09:00-10:00".
    pub fn describe(&self) -> String {
        let day = clock::weekday_from_index(self.day_of_week)
            .map(|d| d.to_string())
            .unwrap_or_else(|_| format!("day {}", self.day_of_week));
        format!(
            "{} {}-{}",
            day,
            clock::format_minute(self.start_min),
            clock::format_minute(self.end_min)
        )
    }
}

/// A scheduled class: a slot plus descriptive metadata. Created by an
/// administrator; the conflict detector only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: String,
    pub instructor_id: String,
    pub subject: String,
    pub course: String,
    #[serde(default)]
    pub room: Option<String>,
    pub slot: TimeSlot,
}

/// Incoming entry as submitted by an admin UI or import file, times
/// still in wall-clock strings. Validation happens here, at the
/// boundary; everything past `into_entry` works on minute integers.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub instructor_id: String,
    pub subject: String,
    pub course: String,
    #[serde(default)]
    pub room: Option<String>,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

impl EntryDraft {
    /// Validate and convert. A missing id gets a fresh UUID.
    pub fn into_entry(self) -> Result<TimetableEntry, ValidationError> {
        let slot = TimeSlot::from_strings(self.day_of_week, &self.start_time, &self.end_time)?;
        Ok(TimetableEntry {
            id: self
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            instructor_id: self.instructor_id,
            subject: self.subject,
            course: self.course,
            room: self.room,
            slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: u8, start: &str, end: &str) -> TimeSlot {
        TimeSlot::from_strings(day, start, end).unwrap()
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = slot(1, "09:00", "10:00");
        let b = slot(1, "09:30", "10:30");
        let c = slot(1, "11:00", "12:00");
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
        assert_eq!(a.overlaps(&c), c.overlaps(&a));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        let a = slot(1, "09:00", "10:00");
        let b = slot(1, "10:00", "11:00");
        assert!(!a.overlaps(&b));
        assert_eq!(a.gap_minutes(&b), Some(0));
    }

    #[test]
    fn test_different_days_never_overlap() {
        let a = slot(1, "09:00", "10:00");
        let b = slot(2, "09:00", "10:00");
        assert!(!a.overlaps(&b));
        assert_eq!(a.gap_minutes(&b), None);
    }

    #[test]
    fn test_gap_is_direction_independent() {
        let a = slot(3, "09:00", "10:00");
        let b = slot(3, "10:45", "11:30");
        assert_eq!(a.gap_minutes(&b), Some(45));
        assert_eq!(b.gap_minutes(&a), Some(45));
    }

    #[test]
    fn test_rejects_inverted_slot() {
        let err = TimeSlot::from_strings(1, "10:00", "09:00").unwrap_err();
        assert!(matches!(err, ValidationError::EmptySlot { .. }));
    }

    #[test]
    fn test_rejects_bad_day() {
        let err = TimeSlot::from_strings(7, "09:00", "10:00").unwrap_err();
        assert!(matches!(err, ValidationError::DayOutOfRange { value: 7 }));
    }

    #[test]
    fn test_describe_uses_day_name() {
        assert_eq!(slot(1, "09:00", "10:30").describe(), "Mon 09:00-10:30");
        assert_eq!(slot(0, "08:05", "09:00").describe(), "Sun 08:05-09:00");
    }

    #[test]
    fn test_draft_generates_id_when_missing() {
        let draft = EntryDraft {
            id: None,
            instructor_id: "i-1".to_string(),
            subject: "Algebra".to_string(),
            course: "Math 101".to_string(),
            room: None,
            day_of_week: 1,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
        };
        let entry = draft.into_entry().unwrap();
        assert!(!entry.id.is_empty());
        assert_eq!(entry.slot.start_min, 540);
    }
}
