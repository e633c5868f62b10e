use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::core::{Error, Result, PACKET_SIZE};
use super::packet::Packet;

/// Datagram codec for time protocol packets
///
/// Each buffer handed to the decoder is one whole datagram. A buffer that is
/// not exactly one packet long is rejected instead of being partially decoded.
#[derive(Clone, Copy, Debug, Default)]
pub struct PacketCodec;

impl PacketCodec {
    /// Creates a new packet codec
    pub fn new() -> Self {
        PacketCodec
    }

    /// Decodes one received datagram, which must be exactly one packet long
    pub fn decode_datagram(&mut self, datagram: &[u8]) -> Result<Packet> {
        let mut src = BytesMut::from(datagram);
        self.decode_eof(&mut src)?.ok_or(Error::SizeMismatch {
            expected: PACKET_SIZE,
            actual: 0,
        })
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        if src.len() < PACKET_SIZE {
            // Might be a partially filled datagram buffer
            return Ok(None);
        }

        let datagram = src.split();
        Packet::decode(&datagram).map(Some)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(packet) => Ok(Some(packet)),
            None if src.is_empty() => Ok(None),
            None => Err(Error::SizeMismatch {
                expected: PACKET_SIZE,
                actual: src.split().len(),
            }),
        }
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = Error;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> std::result::Result<(), Self::Error> {
        dst.reserve(PACKET_SIZE);
        item.encode(dst);
        Ok(())
    }
}
