//! Wall-clock parsing for timetable slots.
//!
//! Times arrive as "HH:MM" or "HH:MM:SS" strings from admin forms and
//! import files. They are converted to minute-of-day integers once,
//! here; the conflict detector never sees a string.

use chrono::Weekday;

use super::ValidationError;

/// Parse "HH:MM" or "HH:MM:SS" into minutes since midnight.
/// Seconds are validated, then truncated: conflict checks are
/// minute-granular.
pub fn parse_minute_of_day(input: &str) -> Result<u16, ValidationError> {
    let malformed = |reason: &'static str| ValidationError::MalformedTime {
        input: input.to_string(),
        reason,
    };

    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(malformed("expected HH:MM or HH:MM:SS"));
    }

    let hour: u16 = parts[0].parse().map_err(|_| malformed("hour is not a number"))?;
    let minute: u16 = parts[1]
        .parse()
        .map_err(|_| malformed("minute is not a number"))?;
    if hour > 23 {
        return Err(malformed("hour out of range 0-23"));
    }
    if minute > 59 {
        return Err(malformed("minute out of range 0-59"));
    }

    if parts.len() == 3 {
        let second: u16 = parts[2]
            .parse()
            .map_err(|_| malformed("second is not a number"))?;
        if second > 59 {
            return Err(malformed("second out of range 0-59"));
        }
    }

    Ok(hour * 60 + minute)
}

/// Format a minute-of-day as "HH:MM" for messages and table output.
pub fn format_minute(min: u16) -> String {
    format!("{:02}:{:02}", min / 60, min % 60)
}

/// Map a 0-6 day index (0 = Sunday, host calendar convention) to a weekday.
pub fn weekday_from_index(day: u8) -> Result<Weekday, ValidationError> {
    match day {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(ValidationError::DayOutOfRange { value: day }),
    }
}
