//! Synchronization module
//!
//! This module holds the one-shot sync worker state machine, the connectivity
//! signal it waits on and the status flags it publishes.

mod connectivity;
mod state;
mod status;
pub(crate) mod worker;

pub use self::connectivity::NetworkMonitor;
pub use self::state::{SyncReport, SyncState};
pub use self::status::SyncStatus;

pub(crate) use self::status::RunningGuard;
