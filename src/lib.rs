//! sntp_rtc: one-shot SNTP client for devices with a real-time clock
//!
//! A background worker waits until the network is up, resolves the time
//! server, exchanges a single 48-byte UDP packet, converts the server's
//! transmit timestamp to local calendar time and writes it to the clock.
//! Callers poll [`SntpClient::has_synced`] and [`SntpClient::is_running`].
pub mod core;

mod client;
pub mod network;
pub mod protocol;
pub mod sync;
pub mod time;

// Re-export commonly used items
pub use crate::client::{SntpClient, SyncHandle};
pub use crate::core::{CalendarTime, Error, Result, SyncConfig};
pub use crate::network::{DnsResolver, NameResolver, StaticResolver};
pub use crate::sync::{NetworkMonitor, SyncReport, SyncState, SyncStatus};
pub use crate::time::{MemoryRtc, RealTimeClock, SyncedTime};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
