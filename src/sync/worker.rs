use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::{Error, Result, SyncConfig};
use crate::network::{bind_addr_for, resolve, NameResolver, Response, RetryPolicy, Session};
use crate::protocol::{build_request, verify_origin, NtpTimestamp, Packet, PacketCodec};
use crate::time::{RealTimeClock, SyncedTime};
use super::connectivity::{NetworkMonitor, Registration};
use super::state::{SyncReport, SyncState};
use super::status::{RunningGuard, SyncStatus};

/// Logs at `$level` for verbose runs and at debug otherwise
macro_rules! sync_log {
    ($verbose:expr, $level:ident, $($arg:tt)+) => {
        if $verbose {
            tracing::$level!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// One sync run: wait for the network, query the server, set the clock
pub(crate) struct SyncWorker {
    pub(crate) config: SyncConfig,
    pub(crate) status: Arc<SyncStatus>,
    pub(crate) monitor: Arc<NetworkMonitor>,
    pub(crate) resolver: Arc<dyn NameResolver>,
    pub(crate) rtc: Arc<dyn RealTimeClock>,
    pub(crate) cancel: CancellationToken,
}

/// Session state owned by a single run
#[derive(Default)]
struct RunContext {
    registration: Option<Registration>,
    request: Packet,
    server_addr: Option<SocketAddr>,
    session: Option<Session>,
    local_addr: Option<SocketAddr>,
    transmit: Option<NtpTimestamp>,
    synced: Option<SyncedTime>,
    states: Vec<SyncState>,
}

impl SyncWorker {
    /// Drives the state machine to `Done` and tears the run down
    ///
    /// `guard` holds the running flag and is released last.
    pub(crate) async fn run(self, guard: RunningGuard) -> SyncReport {
        let started = Instant::now();
        let mut ctx = RunContext::default();
        let mut state = SyncState::Idle;

        let outcome = loop {
            ctx.states.push(state);
            debug!(state = state.as_str(), "Entering state");

            match self.step(state, &mut ctx).await {
                Ok(SyncState::Done) => {
                    break ctx
                        .synced
                        .ok_or_else(|| Error::invalid_state("Run ended without a committed time"))
                }
                Ok(next) => state = next,
                Err(e) => break Err(e),
            }
        };
        ctx.states.push(SyncState::Done);

        match &outcome {
            Ok(synced) => sync_log!(
                self.config.verbose,
                info,
                server = %self.config.server,
                tz = self.config.tz_offset_seconds,
                time = %synced.calendar,
                unix = synced.unix_seconds,
                "Time synchronised"
            ),
            Err(e) => sync_log!(
                self.config.verbose,
                warn,
                server = %self.config.server,
                kind = e.kind(),
                error = %e,
                "Sync client exited with error"
            ),
        }

        self.teardown(&mut ctx);
        let report = SyncReport {
            server: self.config.server.clone(),
            states: ctx.states,
            server_addr: ctx.server_addr,
            local_addr: ctx.local_addr,
            outcome,
            elapsed: started.elapsed(),
        };
        drop(guard);
        report
    }

    async fn step(&self, state: SyncState, ctx: &mut RunContext) -> Result<SyncState> {
        match state {
            SyncState::Idle => {
                ctx.registration = Some(self.monitor.register());
                ctx.request = self.request();
                if self.monitor.is_connected() {
                    Ok(SyncState::Resolving)
                } else {
                    Ok(SyncState::WaitingForNetwork)
                }
            }
            SyncState::WaitingForNetwork => {
                let registration = ctx
                    .registration
                    .as_mut()
                    .ok_or_else(|| Error::invalid_state("Not registered for connectivity"))?;
                sync_log!(self.config.verbose, info, "Waiting for network");
                self.cancellable(registration.wait_up()).await?;
                Ok(SyncState::Resolving)
            }
            SyncState::Resolving => {
                let policy = RetryPolicy {
                    attempts: self.config.resolve_attempts,
                    delay: self.config.resolve_retry_delay,
                };
                let ip = self
                    .cancellable(resolve(self.resolver.as_ref(), &self.config.server, policy))
                    .await?;
                ctx.server_addr = Some(SocketAddr::new(ip, self.config.port));
                Ok(SyncState::Exchanging)
            }
            SyncState::Exchanging => {
                let server = ctx
                    .server_addr
                    .ok_or_else(|| Error::invalid_state("Exchange without a server address"))?;
                let session = ctx
                    .session
                    .insert(Session::open(bind_addr_for(self.config.bind_addr, &server))?);
                ctx.local_addr = Some(session.local_addr());

                let response = self
                    .cancellable(session.exchange(server, &ctx.request, self.config.response_timeout))
                    .await?;
                ctx.transmit = Some(self.decode(&response, server, &ctx.request)?);
                Ok(SyncState::Committing)
            }
            SyncState::Committing => {
                let transmit = ctx
                    .transmit
                    .ok_or_else(|| Error::invalid_state("Commit without a decoded response"))?;
                let synced =
                    SyncedTime::from_timestamp(transmit, i64::from(self.config.tz_offset_seconds))?;

                self.rtc.set_time(&synced.calendar).map_err(|e| match e {
                    Error::Clock(_) => e,
                    other => Error::clock(other.to_string()),
                })?;
                self.status.mark_synced();
                ctx.synced = Some(synced);
                Ok(SyncState::Done)
            }
            SyncState::Done => Ok(SyncState::Done),
        }
    }

    fn request(&self) -> Packet {
        let mut request = build_request();
        if self.config.verify_origin {
            request.transmit = NtpTimestamp::from_u64(rand::random());
        }
        request
    }

    fn decode(&self, response: &Response, server: SocketAddr, request: &Packet) -> Result<NtpTimestamp> {
        if self.config.verify_source && response.source != server {
            return Err(Error::UnexpectedSource(response.source));
        }
        let packet = PacketCodec::new().decode_datagram(&response.bytes)?;
        if self.config.verify_origin {
            verify_origin(&packet, request.transmit)?;
        }
        Ok(packet.transmit)
    }

    async fn cancellable<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }

    /// Releases everything the run acquired, on every exit path
    fn teardown(&self, ctx: &mut RunContext) {
        drop(ctx.registration.take());
        if let Some(session) = ctx.session.take() {
            session.close();
        }
        debug!(server = %self.config.server, "Sync worker finished");
    }
}
