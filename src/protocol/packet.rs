use bytes::{Buf, BufMut};

use crate::core::{Error, Result, PACKET_SIZE};

/// Leap indicator 3 (unsynchronized), version 3, mode 3 (client)
pub const REQUEST_FLAGS: u8 = 0xdb;
/// Stratum sent in requests
pub const REQUEST_STRATUM: u8 = 0x00;
/// Poll interval exponent sent in requests
pub const REQUEST_POLL: u8 = 0x0a;
/// Precision exponent sent in requests
pub const REQUEST_PRECISION: u8 = 0xfa;
/// Root delay sent in requests
pub const REQUEST_ROOT_DELAY: u32 = 0x0000_8000;
/// Root dispersion sent in requests
pub const REQUEST_ROOT_DISPERSION: u32 = 0xa00b_0000;

/// 64-bit fixed-point timestamp: seconds since 1900-01-01 and a fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NtpTimestamp {
    /// Whole seconds since the protocol epoch
    pub seconds: u32,
    /// Sub-second fraction, carried but not interpreted
    pub fraction: u32,
}

impl NtpTimestamp {
    /// Creates a timestamp from its two halves
    pub const fn new(seconds: u32, fraction: u32) -> Self {
        NtpTimestamp { seconds, fraction }
    }

    /// Packs both halves into one 64-bit value
    pub fn to_u64(self) -> u64 {
        (u64::from(self.seconds) << 32) | u64::from(self.fraction)
    }

    /// Splits a 64-bit value into seconds and fraction
    pub fn from_u64(value: u64) -> Self {
        NtpTimestamp {
            seconds: (value >> 32) as u32,
            fraction: value as u32,
        }
    }

    fn put(self, dst: &mut impl BufMut) {
        dst.put_u32(self.seconds);
        dst.put_u32(self.fraction);
    }

    fn get(src: &mut impl Buf) -> Self {
        let seconds = src.get_u32();
        let fraction = src.get_u32();
        NtpTimestamp { seconds, fraction }
    }
}

/// Fixed 48-byte request/response record
///
/// Multi-byte fields are kept in host order here and converted to big-endian
/// only by [`Packet::encode`] and [`Packet::decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Packet {
    /// Leap indicator, version and mode, treated as one opaque byte
    pub flags: u8,
    pub stratum: u8,
    pub poll: u8,
    pub precision: u8,
    pub root_delay: u32,
    pub root_dispersion: u32,
    pub reference_id: u32,
    pub reference: NtpTimestamp,
    pub origin: NtpTimestamp,
    pub receive: NtpTimestamp,
    pub transmit: NtpTimestamp,
}

impl Packet {
    /// Writes the packet in wire order
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.flags);
        dst.put_u8(self.stratum);
        dst.put_u8(self.poll);
        dst.put_u8(self.precision);
        dst.put_u32(self.root_delay);
        dst.put_u32(self.root_dispersion);
        dst.put_u32(self.reference_id);
        self.reference.put(dst);
        self.origin.put(dst);
        self.receive.put(dst);
        self.transmit.put(dst);
    }

    /// Reads a packet from exactly [`PACKET_SIZE`] bytes
    pub fn decode(mut src: &[u8]) -> Result<Self> {
        if src.len() != PACKET_SIZE {
            return Err(Error::SizeMismatch {
                expected: PACKET_SIZE,
                actual: src.len(),
            });
        }

        Ok(Packet {
            flags: src.get_u8(),
            stratum: src.get_u8(),
            poll: src.get_u8(),
            precision: src.get_u8(),
            root_delay: src.get_u32(),
            root_dispersion: src.get_u32(),
            reference_id: src.get_u32(),
            reference: NtpTimestamp::get(&mut src),
            origin: NtpTimestamp::get(&mut src),
            receive: NtpTimestamp::get(&mut src),
            transmit: NtpTimestamp::get(&mut src),
        })
    }

    /// Returns the wire representation
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let mut bytes = [0u8; PACKET_SIZE];
        self.encode(&mut &mut bytes[..]);
        bytes
    }

    /// Alias for [`Packet::decode`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes)
    }
}

/// Builds the client request: protocol constants set, all timestamps zero
pub fn build_request() -> Packet {
    Packet {
        flags: REQUEST_FLAGS,
        stratum: REQUEST_STRATUM,
        poll: REQUEST_POLL,
        precision: REQUEST_PRECISION,
        root_delay: REQUEST_ROOT_DELAY,
        root_dispersion: REQUEST_ROOT_DISPERSION,
        ..Packet::default()
    }
}

/// Validates the size of a reply and returns its transmit timestamp
///
/// The origin timestamp is not checked here; see [`verify_origin`].
pub fn parse_response(bytes: &[u8]) -> Result<NtpTimestamp> {
    Packet::decode(bytes).map(|packet| packet.transmit)
}

/// Checks that a reply echoes the transmit timestamp of our request
pub fn verify_origin(response: &Packet, expected: NtpTimestamp) -> Result<()> {
    if response.origin != expected {
        return Err(Error::OriginMismatch {
            expected: expected.to_u64(),
            actual: response.origin.to_u64(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_transmit(seconds: u32) -> [u8; PACKET_SIZE] {
        let packet = Packet {
            flags: 0x1c,
            stratum: 1,
            transmit: NtpTimestamp::new(seconds, 0xdead_beef),
            ..Packet::default()
        };
        packet.to_bytes()
    }

    #[test]
    fn test_request_layout() {
        let bytes = build_request().to_bytes();

        assert_eq!(&bytes[..4], &[0xdb, 0x00, 0x0a, 0xfa]);
        assert_eq!(&bytes[4..8], &[0x00, 0x00, 0x80, 0x00]);
        assert_eq!(&bytes[8..12], &[0xa0, 0x0b, 0x00, 0x00]);
        assert!(bytes[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_build_request_is_deterministic() {
        assert_eq!(build_request().to_bytes(), build_request().to_bytes());
        assert_eq!(build_request(), build_request());
    }

    #[test]
    fn test_parse_response_reads_big_endian_transmit() {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[40..44].copy_from_slice(&[0xe8, 0x75, 0x8b, 0x00]);

        let transmit = parse_response(&bytes).unwrap();
        assert_eq!(transmit.seconds, 0xe875_8b00);
        assert_eq!(transmit.fraction, 0);
    }

    #[test]
    fn test_parse_response_transmit_fields() {
        let transmit = parse_response(&response_with_transmit(3_900_000_000)).unwrap();
        assert_eq!(transmit, NtpTimestamp::new(3_900_000_000, 0xdead_beef));
    }

    #[test]
    fn test_parse_response_rejects_wrong_sizes() {
        let full = response_with_transmit(3_900_000_000);
        let mut long = full.to_vec();
        long.push(0);

        for bytes in [&full[..0], &full[..1], &full[..47], &long[..]] {
            match parse_response(bytes) {
                Err(Error::SizeMismatch { expected, actual }) => {
                    assert_eq!(expected, PACKET_SIZE);
                    assert_eq!(actual, bytes.len());
                }
                other => panic!("expected SizeMismatch for {} bytes, got {:?}", bytes.len(), other),
            }
        }
    }

    #[test]
    fn test_verify_origin() {
        let nonce = NtpTimestamp::from_u64(0x0123_4567_89ab_cdef);
        let mut response = Packet::default();
        assert!(matches!(
            verify_origin(&response, nonce),
            Err(Error::OriginMismatch { actual: 0, .. })
        ));

        response.origin = nonce;
        assert!(verify_origin(&response, nonce).is_ok());
    }

    #[test]
    fn test_timestamp_u64_split() {
        let ts = NtpTimestamp::from_u64(0x0000_0001_8000_0000);
        assert_eq!(ts.seconds, 1);
        assert_eq!(ts.fraction, 0x8000_0000);
        assert_eq!(ts.to_u64(), 0x0000_0001_8000_0000);
    }
}
