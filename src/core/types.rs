use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Broken-down calendar time as stored by the real-time clock
///
/// `year` holds only the last two digits (`year % 100`). The RTC store has no
/// century field, so the century is lost on conversion and callers reading the
/// clock back have to assume one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarTime {
    /// Seconds, 0-59
    pub seconds: u8,
    /// Minutes, 0-59
    pub minutes: u8,
    /// Hours, 0-23
    pub hours: u8,
    /// Day of month, 1-31
    pub day: u8,
    /// Day of week, 0 = Sunday
    pub weekday: u8,
    /// Month, 1-12
    pub month: u8,
    /// Two-digit year, 0-99
    pub year: u8,
}

impl fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hours, self.minutes, self.seconds
        )
    }
}

/// Configuration for one sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Time server host name or literal address
    pub server: String,
    /// Server port
    pub port: u16,
    /// Offset added to UTC before the clock is set, in seconds
    pub tz_offset_seconds: i32,
    /// Log progress and failures at info/warn instead of debug
    pub verbose: bool,
    /// Local address to bind the request socket to
    pub bind_addr: SocketAddr,
    /// Total name resolution attempts
    pub resolve_attempts: u32,
    /// Delay after a failed resolution attempt
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub resolve_retry_delay: Duration,
    /// Bounded wait for the server reply
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub response_timeout: Duration,
    /// Require the reply to echo the request transmit timestamp
    pub verify_origin: bool,
    /// Require the reply to come from the resolved server address
    pub verify_source: bool,
}

impl SyncConfig {
    /// Creates a configuration for the given server with default settings
    pub fn new(server: impl Into<String>) -> Self {
        SyncConfig {
            server: server.into(),
            ..Default::default()
        }
    }

    /// Checks that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(Error::config("Server name is empty"));
        }
        if self.resolve_attempts == 0 {
            return Err(Error::config("At least one resolution attempt is required"));
        }
        if self.response_timeout.is_zero() {
            return Err(Error::config("Response timeout must be non-zero"));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            server: super::DEFAULT_SERVER.to_string(),
            port: super::NTP_PORT,
            tz_offset_seconds: 0,
            verbose: false,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 0)),
            resolve_attempts: super::RESOLVE_ATTEMPTS,
            resolve_retry_delay: Duration::from_secs(super::RESOLVE_RETRY_DELAY_SECS),
            response_timeout: Duration::from_secs(super::RESPONSE_TIMEOUT_SECS),
            verify_origin: false,
            verify_source: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.server, "time1.google.com");
        assert_eq!(config.port, 123);
        assert_eq!(config.resolve_attempts, 5);
        assert_eq!(config.resolve_retry_delay, Duration::from_secs(5));
        assert_eq!(config.response_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_addr.port(), 0);
        assert!(!config.verify_origin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = SyncConfig {
            resolve_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = SyncConfig {
            response_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        assert!(SyncConfig::new("  ").validate().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SyncConfig = serde_json::from_str(
            r#"{"server":"pool.ntp.org","tz_offset_seconds":7200,"response_timeout":1.5}"#,
        )
        .unwrap();

        assert_eq!(config.server, "pool.ntp.org");
        assert_eq!(config.tz_offset_seconds, 7200);
        assert_eq!(config.response_timeout, Duration::from_millis(1500));
        assert_eq!(config.port, 123);
        assert_eq!(config.resolve_attempts, 5);
    }

    #[test]
    fn test_calendar_display() {
        let time = CalendarTime {
            seconds: 5,
            minutes: 4,
            hours: 3,
            day: 2,
            weekday: 0,
            month: 1,
            year: 24,
        };
        assert_eq!(time.to_string(), "24-01-02 03:04:05");
    }
}
