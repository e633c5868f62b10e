use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sync status shared between the worker and any number of observers
///
/// Only the worker (and `start`, when claiming a run) writes the flags.
#[derive(Debug, Default)]
pub struct SyncStatus {
    synced: AtomicBool,
    running: AtomicBool,
}

impl SyncStatus {
    /// Creates a status with both flags cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the clock has been set by a run since the last start
    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Whether a worker run is in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Marks a run as active; fails if one already is
    pub(crate) fn try_claim(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn reset_synced(&self) {
        self.synced.store(false, Ordering::Release);
    }

    pub(crate) fn mark_synced(&self) {
        self.synced.store(true, Ordering::Release);
    }

    fn release(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Clears the running flag when the run ends, however it ends
#[derive(Debug)]
pub(crate) struct RunningGuard {
    status: Arc<SyncStatus>,
}

impl RunningGuard {
    /// Wraps a status whose running flag was already claimed
    pub(crate) fn new(status: Arc<SyncStatus>) -> Self {
        RunningGuard { status }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.status.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let status = Arc::new(SyncStatus::new());
        assert!(!status.is_running());

        assert!(status.try_claim());
        assert!(!status.try_claim());
        assert!(status.is_running());

        drop(RunningGuard::new(status.clone()));
        assert!(!status.is_running());
        assert!(status.try_claim());
    }

    #[test]
    fn test_synced_flag() {
        let status = SyncStatus::new();
        assert!(!status.has_synced());
        status.mark_synced();
        assert!(status.has_synced());
        status.reset_synced();
        assert!(!status.has_synced());
    }
}
