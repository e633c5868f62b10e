use std::sync::{Mutex, PoisonError};

use crate::core::{CalendarTime, Result};

/// Persistent real-time clock store
///
/// Implementations persist the record; the sync worker calls `set_time` at most
/// once per run, after a valid response has been decoded.
pub trait RealTimeClock: Send + Sync {
    /// Writes the calendar time to the clock
    fn set_time(&self, time: &CalendarTime) -> Result<()>;
}

/// In-memory clock that remembers what was written to it
#[derive(Debug, Default)]
pub struct MemoryRtc {
    inner: Mutex<MemoryRtcState>,
}

#[derive(Debug, Default)]
struct MemoryRtcState {
    time: Option<CalendarTime>,
    commits: usize,
}

impl MemoryRtc {
    /// Creates an unset clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last time written, if any
    pub fn time(&self) -> Option<CalendarTime> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).time
    }

    /// Returns how many times the clock has been set
    pub fn commits(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).commits
    }
}

impl RealTimeClock for MemoryRtc {
    fn set_time(&self, time: &CalendarTime) -> Result<()> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.time = Some(*time);
        state.commits += 1;
        Ok(())
    }
}
