use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by the SNTP client
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Name resolution failed for {server} after {attempts} attempts")]
    ResolveFailed { server: String, attempts: u32 },

    #[error("Failed to send request: {0}")]
    SendFailed(#[source] io::Error),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error("Failed to receive response: {0}")]
    RecvFailed(#[source] io::Error),

    #[error("Response size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Failed to spawn sync worker: {0}")]
    SpawnFailed(String),

    #[error("Sync worker already running")]
    AlreadyRunning,

    #[error("Origin timestamp mismatch: expected {expected:#018x}, got {actual:#018x}")]
    OriginMismatch { expected: u64, actual: u64 },

    #[error("Response from unexpected source {0}")]
    UnexpectedSource(SocketAddr),

    #[error("Sync cancelled")]
    Cancelled,

    #[error("Clock error: {0}")]
    Clock(String),

    #[error("Timing error: {0}")]
    Timing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Synchronization error: {0}")]
    Sync(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new clock error
    pub fn clock(msg: impl Into<String>) -> Self {
        Error::Clock(msg.into())
    }

    /// Creates a new timing error
    pub fn timing(msg: impl Into<String>) -> Self {
        Error::Timing(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new synchronization error
    pub fn sync(msg: impl Into<String>) -> Self {
        Error::Sync(msg.into())
    }

    /// Creates a new invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Short stable name of the error kind, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::ResolveFailed { .. } => "resolve_failed",
            Error::SendFailed(_) => "send_failed",
            Error::Timeout(_) => "timeout",
            Error::RecvFailed(_) => "recv_failed",
            Error::SizeMismatch { .. } => "size_mismatch",
            Error::SpawnFailed(_) => "spawn_failed",
            Error::AlreadyRunning => "already_running",
            Error::OriginMismatch { .. } => "origin_mismatch",
            Error::UnexpectedSource(_) => "unexpected_source",
            Error::Cancelled => "cancelled",
            Error::Clock(_) => "clock",
            Error::Timing(_) => "timing",
            Error::Config(_) => "config",
            Error::Sync(_) => "sync",
            Error::InvalidState(_) => "invalid_state",
        }
    }
}
