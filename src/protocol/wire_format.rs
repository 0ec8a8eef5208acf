//! Wire format encoding and decoding.
//!
//! Every message starts with the same 4-byte header:
//! ```text
//! ┌──────────┬───────────┬──────────────┐
//! │ Magic    │ Type code │ Body         │
//! │ 2 bytes  │ 2 bytes   │ kind-defined │
//! │ uint16 LE│ uint16 LE │              │
//! └──────────┴───────────┴──────────────┘
//! ```
//!
//! There is no frame length. The body's size is only known to the kind
//! that decodes it.

use crate::channel::{ChannelReader, ChannelWriter};
use crate::error::{BridgeError, Result};

/// Identifier bound to exactly one message kind.
pub type TypeCode = u16;

/// Magic marking the start of every message.
pub const MAGIC: u16 = 0xB1D6;

/// Header size in bytes (magic + type code).
pub const HEADER_SIZE: usize = 4;

/// Reserved type code (never registered).
pub const RESERVED_TYPE_CODE: TypeCode = 0;

/// Type codes of the message kinds shipped with this crate.
pub mod type_codes {
    use super::TypeCode;

    /// Construct an object from a class name and arguments.
    pub const CREATE_OBJECT: TypeCode = 1;
    /// Handle of a constructed object.
    pub const OBJECT_REF: TypeCode = 2;
    /// Error reply.
    pub const ERROR: TypeCode = 3;

    /// Boolean scalar.
    pub const BOOL: TypeCode = 16;
    /// 32-bit integer scalar.
    pub const INT32: TypeCode = 17;
    /// 64-bit integer scalar.
    pub const INT64: TypeCode = 18;
    /// 64-bit float scalar.
    pub const REAL64: TypeCode = 19;
    /// String scalar.
    pub const STRING: TypeCode = 20;
    /// Array of tagged values.
    pub const VALUE_ARRAY: TypeCode = 21;
}

/// Decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Magic as found on the wire.
    pub magic: u16,
    /// Kind of the body that follows.
    pub type_code: TypeCode,
}

impl Header {
    /// Create a header for `type_code` with the protocol magic.
    pub fn new(type_code: TypeCode) -> Self {
        Self {
            magic: MAGIC,
            type_code,
        }
    }

    /// Encode header to bytes (Little Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use bridgewire::protocol::{Header, HEADER_SIZE};
    ///
    /// let bytes = Header::new(1).encode();
    /// assert_eq!(bytes.len(), HEADER_SIZE);
    /// assert_eq!(bytes, [0xD6, 0xB1, 0x01, 0x00]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.magic.to_le_bytes());
        buf[2..4].copy_from_slice(&self.type_code.to_le_bytes());
        buf
    }

    /// Decode header from bytes without validating it.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            magic: u16::from_le_bytes([buf[0], buf[1]]),
            type_code: u16::from_le_bytes([buf[2], buf[3]]),
        })
    }

    /// Check the magic.
    pub fn validate(&self) -> Result<()> {
        check_magic(self.magic)
    }

    /// Write the header to a channel.
    pub fn write_to(&self, w: &mut dyn ChannelWriter) -> Result<()> {
        w.write_all(&self.encode())
    }

    /// Read and validate a header from a channel.
    ///
    /// The magic is checked before the type code is read, so a stream that
    /// is not speaking this protocol fails after two bytes.
    pub fn read_from(r: &mut dyn ChannelReader) -> Result<Self> {
        let magic = r.read_u16()?;
        check_magic(magic)?;
        let type_code = r.read_u16()?;
        Ok(Self { magic, type_code })
    }
}

fn check_magic(found: u16) -> Result<()> {
    if found != MAGIC {
        return Err(BridgeError::ProtocolMismatch {
            expected: MAGIC,
            found,
        });
    }
    Ok(())
}
