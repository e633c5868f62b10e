//! Client entry points
//!
//! [`SntpClient`] starts sync runs and answers the two status queries.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use sntp_rtc::{DnsResolver, MemoryRtc, NetworkMonitor, SntpClient};
//!
//! #[tokio::main]
//! async fn main() -> sntp_rtc::Result<()> {
//!     let monitor = Arc::new(NetworkMonitor::new(true));
//!     let rtc = Arc::new(MemoryRtc::new());
//!     let client = SntpClient::new(monitor, Arc::new(DnsResolver::from_system_conf()?), rtc.clone());
//!
//!     let report = client.start(3600, None, true)?.join().await?;
//!     println!("synced: {} ({:?})", client.has_synced(), report.outcome);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, Instrument};

use crate::core::{Error, Result, SyncConfig, DEFAULT_SERVER};
use crate::network::NameResolver;
use crate::sync::worker::SyncWorker;
use crate::sync::{NetworkMonitor, RunningGuard, SyncReport, SyncStatus};
use crate::time::RealTimeClock;

/// Starts sync runs and reports their status
///
/// At most one run is active per client. Clones share the same status.
#[derive(Clone)]
pub struct SntpClient {
    status: Arc<SyncStatus>,
    monitor: Arc<NetworkMonitor>,
    resolver: Arc<dyn NameResolver>,
    rtc: Arc<dyn RealTimeClock>,
}

impl SntpClient {
    /// Creates a client over the host's connectivity signal, resolver and clock
    pub fn new(
        monitor: Arc<NetworkMonitor>,
        resolver: Arc<dyn NameResolver>,
        rtc: Arc<dyn RealTimeClock>,
    ) -> Self {
        SntpClient {
            status: Arc::new(SyncStatus::new()),
            monitor,
            resolver,
            rtc,
        }
    }

    /// Starts one sync run in the background
    ///
    /// `server` defaults to `time1.google.com`, also when it is blank. The
    /// timezone offset is taken as-is. Fails with [`Error::AlreadyRunning`] while
    /// a run is active and with [`Error::SpawnFailed`] outside a tokio runtime.
    pub fn start(
        &self,
        tz_offset_seconds: i32,
        server: Option<&str>,
        verbose: bool,
    ) -> Result<SyncHandle> {
        let server = server
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVER);
        self.start_with_config(SyncConfig {
            server: server.to_string(),
            tz_offset_seconds,
            verbose,
            ..SyncConfig::default()
        })
    }

    /// Starts one sync run with a full configuration
    pub fn start_with_config(&self, config: SyncConfig) -> Result<SyncHandle> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| Error::SpawnFailed(e.to_string()))?;

        if !self.status.try_claim() {
            return Err(Error::AlreadyRunning);
        }
        let guard = RunningGuard::new(Arc::clone(&self.status));
        self.status.reset_synced();

        let cancel = CancellationToken::new();
        let span = info_span!("sntp", server = %config.server);
        let worker = SyncWorker {
            config,
            status: Arc::clone(&self.status),
            monitor: Arc::clone(&self.monitor),
            resolver: Arc::clone(&self.resolver),
            rtc: Arc::clone(&self.rtc),
            cancel: cancel.clone(),
        };

        let join = runtime.spawn(worker.run(guard).instrument(span));
        Ok(SyncHandle { join, cancel })
    }

    /// Whether a run has set the clock since the last start
    pub fn has_synced(&self) -> bool {
        self.status.has_synced()
    }

    /// Whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Shared status, for observers that should not hold the client
    pub fn status(&self) -> Arc<SyncStatus> {
        Arc::clone(&self.status)
    }

    /// The connectivity signal this client waits on
    pub fn monitor(&self) -> &Arc<NetworkMonitor> {
        &self.monitor
    }
}

/// Handle to a spawned run
///
/// Dropping the handle detaches the run; it still finishes on its own.
#[derive(Debug)]
pub struct SyncHandle {
    join: JoinHandle<SyncReport>,
    cancel: CancellationToken,
}

impl SyncHandle {
    /// Asks the run to stop at its next suspension point
    ///
    /// A clock commit that has started is never interrupted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the run has reached `Done`
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the run to finish and returns its report
    pub async fn join(self) -> Result<SyncReport> {
        self.join
            .await
            .map_err(|e| Error::sync(format!("Sync worker failed: {}", e)))
    }
}
