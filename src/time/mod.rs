//! Time conversion and clock storage
//!
//! Converts protocol timestamps to Unix time and to the broken-down calendar
//! record expected by the real-time clock, and defines the clock-set seam.

mod convert;
mod rtc;

pub use self::convert::{to_calendar, to_datetime, to_unix_seconds};
pub use self::rtc::{MemoryRtc, RealTimeClock};

use crate::core::{CalendarTime, Result};
use crate::protocol::NtpTimestamp;

/// A decoded server time ready to be committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncedTime {
    /// Unix seconds with the timezone offset applied
    pub unix_seconds: i64,
    /// Calendar breakdown of `unix_seconds`
    pub calendar: CalendarTime,
}

impl SyncedTime {
    /// Converts a transmit timestamp using the given timezone offset
    pub fn from_timestamp(timestamp: NtpTimestamp, tz_offset_seconds: i64) -> Result<Self> {
        let unix_seconds = to_unix_seconds(timestamp.seconds, tz_offset_seconds);
        Ok(SyncedTime {
            unix_seconds,
            calendar: to_calendar(unix_seconds)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synced_time_from_timestamp() {
        let synced = SyncedTime::from_timestamp(NtpTimestamp::new(3_900_000_000, 99), 0).unwrap();
        assert_eq!(synced.unix_seconds, 1_691_011_200);
        assert_eq!(synced.calendar.hours, 21);
        assert_eq!(synced.calendar.year, 23);
    }

    #[test]
    fn test_synced_time_before_epoch() {
        assert!(SyncedTime::from_timestamp(NtpTimestamp::new(0, 0), 0).is_err());
    }
}
