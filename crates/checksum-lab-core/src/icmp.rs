//! ICMP echo header view, used to summarise generated packets.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::checksum::internet_checksum;
use crate::error::{EvalError, Result};

pub const ICMP_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpEcho {
    pub message_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
    pub payload: Bytes,
}

impl IcmpEcho {
    /// Reads the fixed header in network byte order; the rest is payload.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < ICMP_HEADER_LEN {
            return Err(EvalError::TruncatedPacket {
                expected: ICMP_HEADER_LEN,
                actual: data.len(),
            });
        }
        let mut buf = data;
        Ok(Self {
            message_type: buf.get_u8(),
            code: buf.get_u8(),
            checksum: buf.get_u16(),
            identifier: buf.get_u16(),
            sequence: buf.get_u16(),
            payload: Bytes::copy_from_slice(buf),
        })
    }

    /// Serialises the packet with the given checksum value.
    pub fn to_bytes_with_checksum(&self, checksum: u16) -> Bytes {
        let mut buf = BytesMut::with_capacity(ICMP_HEADER_LEN + self.payload.len());
        buf.put_u8(self.message_type);
        buf.put_u8(self.code);
        buf.put_u16(checksum);
        buf.put_u16(self.identifier);
        buf.put_u16(self.sequence);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    pub fn expected_checksum(&self) -> u16 {
        internet_checksum(&self.to_bytes_with_checksum(0))
    }

    pub fn has_valid_checksum(&self) -> bool {
        self.checksum == self.expected_checksum()
    }
}

impl fmt::Display for IcmpEcho {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ICMP packet, type: {}, code: {}, checksum: 0x{:04X}, id: {}, seq: {}, payload: {:?} ",
            self.message_type,
            self.code,
            self.checksum,
            self.identifier,
            self.sequence,
            self.payload
        )?;
        if self.has_valid_checksum() {
            write!(f, "(correct checksum)")
        } else {
            write!(
                f,
                "(incorrect checksum, expected: 0x{:04X})",
                self.expected_checksum()
            )
        }
    }
}
