//! Network session module
//!
//! This module resolves the time server name and runs the single UDP
//! request/response exchange of a sync run.

mod resolver;
mod session;

pub use self::resolver::{resolve, DnsResolver, NameResolver, RetryPolicy, StaticResolver};
pub use self::session::{bind_addr_for, Response, Session};
