use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use crate::core::{Error, Result, RESOLVE_ATTEMPTS, RESOLVE_RETRY_DELAY_SECS};

/// Host name to address lookup
pub trait NameResolver: Send + Sync {
    /// Resolves `host` to a single address
    fn lookup<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<IpAddr>>;
}

/// Resolver backed by trust-dns
pub struct DnsResolver {
    inner: TokioAsyncResolver,
}

impl DnsResolver {
    /// Uses the system resolver configuration (`/etc/resolv.conf` on Unix)
    pub fn from_system_conf() -> Result<Self> {
        TokioAsyncResolver::tokio_from_system_conf()
            .map(|inner| DnsResolver { inner })
            .map_err(|e| Error::config(format!("Failed to load resolver configuration: {}", e)))
    }

    /// Uses an explicit resolver configuration
    pub fn new(config: ResolverConfig, opts: ResolverOpts) -> Result<Self> {
        TokioAsyncResolver::tokio(config, opts)
            .map(|inner| DnsResolver { inner })
            .map_err(|e| Error::config(format!("Failed to create resolver: {}", e)))
    }

    /// Queries Google's public DNS servers
    pub fn google() -> Result<Self> {
        Self::new(ResolverConfig::google(), ResolverOpts::default())
    }
}

impl NameResolver for DnsResolver {
    fn lookup<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<IpAddr>> {
        async move {
            let response = self
                .inner
                .lookup_ip(host)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

            let addrs: Vec<IpAddr> = response.iter().collect();
            addrs
                .iter()
                .copied()
                .find(IpAddr::is_ipv4)
                .or_else(|| addrs.first().copied())
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, format!("No address for {}", host))
                })
        }
        .boxed()
    }
}

/// Resolver with a fixed host table
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, IpAddr>,
}

impl StaticResolver {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry
    pub fn with_host(mut self, host: impl Into<String>, addr: IpAddr) -> Self {
        self.hosts.insert(host.into(), addr);
        self
    }
}

impl NameResolver for StaticResolver {
    fn lookup<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<IpAddr>> {
        let result = self.hosts.get(host).copied().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("Unknown host {}", host))
        });
        future::ready(result).boxed()
    }
}

/// How often and how patiently to retry name resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Sleep after each failed attempt except the last
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: RESOLVE_ATTEMPTS,
            delay: Duration::from_secs(RESOLVE_RETRY_DELAY_SECS),
        }
    }
}

/// Resolves a server name, retrying while the resolver is not ready yet
///
/// Literal IP addresses are returned without a lookup.
pub async fn resolve(
    resolver: &dyn NameResolver,
    server: &str,
    policy: RetryPolicy,
) -> Result<IpAddr> {
    if let Ok(addr) = server.parse::<IpAddr>() {
        return Ok(addr);
    }

    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match resolver.lookup(server).await {
            Ok(addr) => {
                debug!(server, %addr, attempt, "Resolved time server");
                return Ok(addr);
            }
            Err(e) => {
                debug!(server, attempt, error = %e, "Name resolution failed");
                if attempt < attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(Error::ResolveFailed {
        server: server.to_string(),
        attempts,
    })
}
