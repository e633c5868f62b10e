//! Core types and constants for the SNTP client
//!
//! This module contains the error type, the run configuration and the
//! calendar record handed to the real-time clock.

pub mod error;
pub mod types;
pub mod serde;

pub use self::error::{Error, Result};
pub use self::types::{CalendarTime, SyncConfig};

/// Well-known time protocol port
pub const NTP_PORT: u16 = 123;

/// Size of a request or response packet in bytes
pub const PACKET_SIZE: usize = 48;

/// Server used when the caller does not name one
pub const DEFAULT_SERVER: &str = "time1.google.com";

/// Seconds from 1900-01-01 (protocol epoch) to 1970-01-01 (Unix epoch)
pub const UNIX_OFFSET: i64 = 2_208_988_800;

/// Name resolution attempts per run (1 initial + 4 retries)
pub const RESOLVE_ATTEMPTS: u32 = 5;

/// Delay after a failed name resolution attempt, in seconds
pub const RESOLVE_RETRY_DELAY_SECS: u64 = 5;

/// Bounded wait for the server reply, in seconds
pub const RESPONSE_TIMEOUT_SECS: u64 = 5;
