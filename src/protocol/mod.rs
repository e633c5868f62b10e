//! Protocol implementation module
//!
//! This module defines the 48-byte time protocol packet, the client request
//! and the response parsing used by the sync worker.

pub mod codec;
pub mod packet;

pub use self::codec::PacketCodec;
pub use self::packet::{build_request, parse_response, verify_origin, NtpTimestamp, Packet};
