use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::core::{Error, Result};
use crate::time::SyncedTime;

/// States of one worker run
///
/// Every state before `Done` can fail straight to `Done`; success and failure
/// share the terminal state and differ only in the recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    Idle,
    WaitingForNetwork,
    Resolving,
    Exchanging,
    Committing,
    Done,
}

impl SyncState {
    /// Returns whether the run has ended
    pub fn is_terminal(self) -> bool {
        self == SyncState::Done
    }

    /// Lower-case name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::WaitingForNetwork => "waiting_for_network",
            SyncState::Resolving => "resolving",
            SyncState::Exchanging => "exchanging",
            SyncState::Committing => "committing",
            SyncState::Done => "done",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened during one worker run
#[derive(Debug)]
pub struct SyncReport {
    /// Server name the run was configured with
    pub server: String,
    /// States entered, in order, ending with `Done`
    pub states: Vec<SyncState>,
    /// Resolved server address, if resolution succeeded
    pub server_addr: Option<SocketAddr>,
    /// Local address of the request socket, if one was opened
    pub local_addr: Option<SocketAddr>,
    /// Committed time or the error that ended the run
    pub outcome: Result<SyncedTime>,
    /// Wall time from spawn to `Done`
    pub elapsed: Duration,
}

impl SyncReport {
    /// Whether the clock was set
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The error that ended the run, if any
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    /// Whether the run passed through `state`
    pub fn visited(&self, state: SyncState) -> bool {
        self.states.contains(&state)
    }
}
