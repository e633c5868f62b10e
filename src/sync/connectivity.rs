use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use crate::core::{Error, Result};

/// Network connectivity as reported by the host's network stack
///
/// The host calls [`NetworkMonitor::set_up`] and [`NetworkMonitor::set_down`].
/// Each sync worker registers once per run and is woken by the next "up"
/// event. Several clients may share one monitor.
#[derive(Debug, Default)]
pub struct NetworkMonitor {
    connected: AtomicBool,
    next_id: AtomicU64,
    waiters: Mutex<HashMap<u64, mpsc::Sender<()>>>,
}

impl NetworkMonitor {
    /// Creates a monitor with the given initial link state
    pub fn new(connected: bool) -> Self {
        NetworkMonitor {
            connected: AtomicBool::new(connected),
            next_id: AtomicU64::new(0),
            waiters: Mutex::new(HashMap::new()),
        }
    }

    /// Reports the link as up and wakes every registered worker
    pub fn set_up(&self) {
        self.connected.store(true, Ordering::Release);
        for tx in self.waiters().values() {
            // Capacity one: a second "up" before the worker wakes is redundant
            let _ = tx.try_send(());
        }
    }

    /// Reports the link as down
    pub fn set_down(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Point-in-time link state
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Whether any worker is currently registered for notifications
    pub fn has_waiter(&self) -> bool {
        !self.waiters().is_empty()
    }

    /// Number of workers currently registered
    pub fn waiter_count(&self) -> usize {
        self.waiters().len()
    }

    /// Registers one notification consumer
    pub(crate) fn register(self: &Arc<Self>) -> Registration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(1);
        self.waiters().insert(id, tx);
        debug!(id, "Registered for connectivity notifications");

        Registration {
            monitor: Arc::clone(self),
            id,
            rx,
        }
    }

    fn deregister(&self, id: u64) {
        self.waiters().remove(&id);
        debug!(id, "Removed connectivity registration");
    }

    fn waiters(&self) -> MutexGuard<'_, HashMap<u64, mpsc::Sender<()>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A worker's registration; dropping it deregisters
#[derive(Debug)]
pub(crate) struct Registration {
    monitor: Arc<NetworkMonitor>,
    id: u64,
    rx: mpsc::Receiver<()>,
}

impl Registration {
    /// Waits, without timeout, for the next "up" notification
    pub(crate) async fn wait_up(&mut self) -> Result<()> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| Error::sync("Connectivity signal closed"))
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.monitor.deregister(self.id);
    }
}
