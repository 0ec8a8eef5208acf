//! Readers for the primitive channel operations.

use std::io::{self, Read};

use bytes::Buf;

use crate::config::Limits;
use crate::error::{BridgeError, Result};

/// Most elements reserved up front for a declared count when the reader
/// cannot tell how many bytes are left. Larger collections grow as their
/// elements decode.
pub const MAX_PREALLOCATED_ELEMENTS: usize = 1024;

/// Read side of a channel.
///
/// Implementors provide `read_exact` and the active [`Limits`]; every other
/// primitive is derived from those two.
pub trait ChannelReader {
    /// Fill `buf` completely or fail.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Limits applied to lengths read from this channel.
    fn limits(&self) -> Limits;

    /// Bytes known to be available, if the reader can tell.
    ///
    /// Lets length-prefixed reads fail before allocating for data that
    /// cannot be there.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }

    /// Capacity to reserve for `count` elements that each take at least one byte.
    ///
    /// Fails with [`BridgeError::Truncated`] when the reader knows fewer than
    /// `count` bytes remain.
    fn element_capacity(&self, count: usize) -> Result<usize> {
        match self.remaining_hint() {
            Some(available) if count > available => Err(BridgeError::Truncated {
                needed: count,
                available,
            }),
            Some(_) => Ok(count),
            None => Ok(count.min(MAX_PREALLOCATED_ELEMENTS)),
        }
    }

    /// Read one byte.
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a little-endian u16.
    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read a little-endian u32.
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a little-endian i32.
    fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Read a little-endian u64.
    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a little-endian i64.
    fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Read an IEEE-754 double from its raw little-endian bits.
    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read a u32 length prefix and check it against `max`.
    fn read_len(&mut self, max: u32, what: &str) -> Result<usize> {
        let len = self.read_u32()?;
        if len > max {
            return Err(BridgeError::malformed(format!(
                "{} length {} exceeds maximum {}",
                what, len, max
            )));
        }
        Ok(len as usize)
    }

    /// Read exactly `len` bytes into a new buffer.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        if let Some(available) = self.remaining_hint() {
            if len > available {
                return Err(BridgeError::Truncated {
                    needed: len,
                    available,
                });
            }
        }
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a `[len: u32][utf-8]` string.
    fn read_string(&mut self) -> Result<String> {
        let len = self.read_len(self.limits().max_string_len, "string")?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| BridgeError::malformed(format!("string is not valid UTF-8: {}", e)))
    }
}

/// In-memory reader over any [`Buf`].
///
/// Running out of bytes is reported as [`BridgeError::Truncated`], which the
/// streaming buffer uses to wait for more input.
pub struct BytesReader<B> {
    buf: B,
    limits: Limits,
    start: usize,
}

impl<B: Buf> BytesReader<B> {
    /// Wrap a buffer.
    pub fn new(buf: B, limits: Limits) -> Self {
        let start = buf.remaining();
        Self { buf, limits, start }
    }

    /// Bytes consumed since construction.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.start - self.buf.remaining()
    }

    /// Bytes still unread.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Unwrap the underlying buffer.
    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<B: Buf> ChannelReader for BytesReader<B> {
    fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        let available = self.buf.remaining();
        if available < out.len() {
            return Err(BridgeError::Truncated {
                needed: out.len(),
                available,
            });
        }
        self.buf.copy_to_slice(out);
        Ok(())
    }

    fn limits(&self) -> Limits {
        self.limits
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.buf.remaining())
    }
}

/// Blocking reader over [`std::io::Read`].
///
/// End of stream in the middle of a read is reported as
/// [`BridgeError::Truncated`].
pub struct IoReader<R> {
    inner: R,
    limits: Limits,
}

impl<R: Read> IoReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R, limits: Limits) -> Self {
        Self { inner, limits }
    }

    /// Get a reference to the underlying reader.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ChannelReader for IoReader<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(BridgeError::Truncated {
                needed: buf.len(),
                available: 0,
            }),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    fn limits(&self) -> Limits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_primitives() {
        let bytes = [
            0x01, 0x02, // u16
            0x01, 0x00, 0x00, 0x80, // u32
            0xFF, 0xFF, 0xFF, 0xFF, // i32 -1
        ];
        let mut reader = BytesReader::new(&bytes[..], Limits::default());

        assert_eq!(reader.read_u16().unwrap(), 0x0201);
        assert_eq!(reader.read_u32().unwrap(), 0x8000_0001);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert_eq!(reader.consumed(), 10);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_read() {
        let bytes = [0u8; 3];
        let mut reader = BytesReader::new(&bytes[..], Limits::default());

        match reader.read_u64() {
            Err(BridgeError::Truncated { needed, available }) => {
                assert_eq!(needed, 8);
                assert_eq!(available, 3);
            }
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_string_length_checked_before_allocation() {
        let limits = Limits {
            max_string_len: 4,
            ..Limits::default()
        };
        let mut bytes = 5u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"hello");

        let mut reader = BytesReader::new(&bytes[..], limits);
        let err = reader.read_string().unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_declared_length_beyond_buffer() {
        // Claims 1000 bytes, carries 2
        let mut bytes = 1000u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"ab");

        let mut reader = BytesReader::new(&bytes[..], Limits::default());
        assert!(matches!(
            reader.read_string(),
            Err(BridgeError::Truncated {
                needed: 1000,
                available: 2
            })
        ));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut bytes = 2u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xC3, 0x28]);

        let mut reader = BytesReader::new(&bytes[..], Limits::default());
        let err = reader.read_string().unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_empty_string() {
        let bytes = 0u32.to_le_bytes();
        let mut reader = BytesReader::new(&bytes[..], Limits::default());
        assert_eq!(reader.read_string().unwrap(), "");
    }

    #[test]
    fn test_io_reader_eof_is_truncation() {
        let data: &[u8] = &[1, 2];
        let mut reader = IoReader::new(std::io::Cursor::new(data), Limits::default());
        assert!(matches!(
            reader.read_u32(),
            Err(BridgeError::Truncated { needed: 4, .. })
        ));
    }

    #[test]
    fn test_element_capacity_without_hint_is_capped() {
        let reader = IoReader::new(std::io::empty(), Limits::default());
        assert_eq!(reader.element_capacity(8).unwrap(), 8);
        assert_eq!(
            reader.element_capacity(1 << 20).unwrap(),
            MAX_PREALLOCATED_ELEMENTS
        );
    }

    #[test]
    fn test_element_capacity_with_hint() {
        let bytes = [0u8; 16];
        let reader = BytesReader::new(&bytes[..], Limits::default());
        assert_eq!(reader.element_capacity(16).unwrap(), 16);
        assert!(matches!(
            reader.element_capacity(17),
            Err(BridgeError::Truncated {
                needed: 17,
                available: 16
            })
        ));
    }

    #[test]
    fn test_f64_bits_preserved() {
        let nan = f64::from_bits(0x7FF8_0000_DEAD_BEEF);
        let bytes = nan.to_bits().to_le_bytes();
        let mut reader = IoReader::new(&bytes[..], Limits::default());
        assert_eq!(reader.read_f64().unwrap().to_bits(), 0x7FF8_0000_DEAD_BEEF);
    }
}
