use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::core::{CalendarTime, Error, Result, UNIX_OFFSET};

/// Converts protocol-epoch seconds to Unix seconds shifted by a timezone offset
pub fn to_unix_seconds(wire_seconds: u32, tz_offset_seconds: i64) -> i64 {
    i64::from(wire_seconds) - UNIX_OFFSET + tz_offset_seconds
}

/// Breaks Unix seconds down into the calendar record kept by the RTC
///
/// The year is reduced to two digits. Instants before 1970 are rejected.
pub fn to_calendar(unix_seconds: i64) -> Result<CalendarTime> {
    Ok(calendar_from_datetime(&to_datetime(unix_seconds)?))
}

/// Interprets Unix seconds as a UTC date-time
pub fn to_datetime(unix_seconds: i64) -> Result<DateTime<Utc>> {
    if unix_seconds < 0 {
        return Err(Error::timing(format!(
            "Time {}s is before the Unix epoch",
            unix_seconds
        )));
    }
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .ok_or_else(|| Error::timing(format!("Time {}s is out of range", unix_seconds)))
}

fn calendar_from_datetime(time: &DateTime<Utc>) -> CalendarTime {
    CalendarTime {
        seconds: time.second() as u8,
        minutes: time.minute() as u8,
        hours: time.hour() as u8,
        day: time.day() as u8,
        weekday: time.weekday().num_days_from_sunday() as u8,
        month: time.month() as u8,
        year: time.year().rem_euclid(100) as u8,
    }
}
