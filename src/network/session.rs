use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio_util::codec::Encoder;
use tracing::debug;

use crate::core::{Error, Result, PACKET_SIZE};
use crate::protocol::{Packet, PacketCodec};

/// Receive buffer size; any UDP payload fits, so oversized replies keep their length
const RECV_BUFFER_SIZE: usize = u16::MAX as usize;

/// A datagram received from the server
#[derive(Debug, Clone)]
pub struct Response {
    /// Raw datagram contents
    pub bytes: Bytes,
    /// Address the datagram came from
    pub source: SocketAddr,
}

/// UDP socket used for one request/response exchange
///
/// The socket is closed when the session is dropped.
#[derive(Debug)]
pub struct Session {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl Session {
    /// Binds a non-blocking UDP socket to `bind_addr`
    pub fn open(bind_addr: SocketAddr) -> Result<Self> {
        let socket = Socket::new(Domain::for_address(bind_addr), Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_nonblocking(true)?;
        socket.bind(&bind_addr.into())?;

        let socket = UdpSocket::from_std(socket.into())?;
        let local_addr = socket.local_addr()?;
        debug!(%local_addr, "Opened request socket");

        Ok(Session { socket, local_addr })
    }

    /// Returns the local socket address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Sends `request` and waits at most `timeout` for a single reply
    ///
    /// Exactly one receive is made. The reply is returned whole and unchecked;
    /// the worker decodes it with [`PacketCodec::decode_datagram`].
    pub async fn exchange(
        &self,
        server: SocketAddr,
        request: &Packet,
        timeout: Duration,
    ) -> Result<Response> {
        let mut datagram = BytesMut::with_capacity(PACKET_SIZE);
        PacketCodec::new().encode(*request, &mut datagram)?;

        let sent = self
            .socket
            .send_to(&datagram, server)
            .await
            .map_err(Error::SendFailed)?;
        if sent != datagram.len() {
            return Err(Error::SendFailed(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("Sent {} of {} bytes", sent, datagram.len()),
            )));
        }
        debug!(%server, "Request sent");

        let mut buf = BytesMut::zeroed(RECV_BUFFER_SIZE);
        let (len, source) = match tokio::time::timeout(timeout, self.socket.recv_from(&mut buf)).await {
            Err(_) => return Err(Error::Timeout(timeout)),
            Ok(Err(e)) => return Err(Error::RecvFailed(e)),
            Ok(Ok(received)) => received,
        };
        buf.truncate(len);
        debug!(%source, len, "Response received");

        Ok(Response {
            bytes: buf.freeze(),
            source,
        })
    }

    /// Closes the socket
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(local_addr = %self.local_addr, "Closed request socket");
    }
}

/// Picks a local bind address of the same family as `server`
///
/// `bind_addr` is kept when the families match; otherwise the unspecified
/// address of the server's family is used with the same port.
pub fn bind_addr_for(bind_addr: SocketAddr, server: &SocketAddr) -> SocketAddr {
    match (bind_addr.ip(), server.ip()) {
        (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => bind_addr,
        (_, IpAddr::V4(_)) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), bind_addr.port()),
        (_, IpAddr::V6(_)) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), bind_addr.port()),
    }
}
