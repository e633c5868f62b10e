#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use sntp_rtc::protocol::{NtpTimestamp, Packet};
use sntp_rtc::{MemoryRtc, NetworkMonitor, SntpClient, StaticResolver, SyncConfig};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Host name the test resolver maps to the simulated server
pub const SERVER_NAME: &str = "time.test";

/// Transmit seconds used by the simulated server (2023-08-02 21:20:00 UTC)
pub const SERVER_SECONDS: u32 = 3_900_000_000;

/// How the simulated server answers a request
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Well-formed reply that echoes the request transmit timestamp
    Reply,
    /// Well-formed reply with a zero origin timestamp
    ReplyWithoutEcho,
    /// Reply of the given length
    Truncated(usize),
    /// Never answers
    Silent,
}

/// A one-request UDP time server on localhost
pub struct TestServer {
    pub addr: SocketAddr,
    pub task: JoinHandle<Option<Packet>>,
}

impl TestServer {
    pub async fn start(behavior: Behavior) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();

        let task = tokio::spawn(async move {
            let mut buf = [0u8; 128];
            let (len, peer) = socket.recv_from(&mut buf).await.ok()?;
            let request = Packet::decode(&buf[..len]).ok()?;

            let mut reply = Packet {
                flags: 0x1c,
                stratum: 1,
                receive: NtpTimestamp::new(SERVER_SECONDS, 0),
                transmit: NtpTimestamp::new(SERVER_SECONDS, 0x4000_0000),
                ..Packet::default()
            };
            match behavior {
                Behavior::Reply => reply.origin = request.transmit,
                Behavior::ReplyWithoutEcho => {}
                Behavior::Truncated(len) => {
                    let bytes = reply.to_bytes();
                    socket.send_to(&bytes[..len.min(bytes.len())], peer).await.ok()?;
                    return Some(request);
                }
                Behavior::Silent => return Some(request),
            }
            socket.send_to(&reply.to_bytes(), peer).await.ok()?;
            Some(request)
        });

        TestServer { addr, task }
    }

    /// Run configuration pointing at this server
    pub fn config(&self) -> SyncConfig {
        SyncConfig {
            server: SERVER_NAME.to_string(),
            port: self.addr.port(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..SyncConfig::default()
        }
    }
}

/// Everything a test needs to drive and observe a client
pub struct Harness {
    pub client: SntpClient,
    pub monitor: Arc<NetworkMonitor>,
    pub rtc: Arc<MemoryRtc>,
}

impl Harness {
    pub fn new(connected: bool) -> Self {
        let monitor = Arc::new(NetworkMonitor::new(connected));
        let rtc = Arc::new(MemoryRtc::new());
        let resolver =
            StaticResolver::new().with_host(SERVER_NAME, IpAddr::V4(Ipv4Addr::LOCALHOST));

        let client = SntpClient::new(monitor.clone(), Arc::new(resolver), rtc.clone());
        Harness { client, monitor, rtc }
    }
}
