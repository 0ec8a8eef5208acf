//! Writers for the primitive channel operations.

use std::io::{self, Write};

use bytes::BufMut;

use crate::error::{BridgeError, Result};

/// Write side of a channel.
///
/// Implementors provide `write_all`; every primitive is derived from it.
pub trait ChannelWriter {
    /// Write all of `bytes` or fail.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Write one byte.
    fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_all(&[v])
    }

    /// Write a little-endian u16.
    fn write_u16(&mut self, v: u16) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// Write a little-endian u32.
    fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// Write a little-endian i32.
    fn write_i32(&mut self, v: i32) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// Write a little-endian u64.
    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// Write a little-endian i64.
    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// Write the raw bits of an IEEE-754 double.
    fn write_f64(&mut self, v: f64) -> Result<()> {
        self.write_u64(v.to_bits())
    }

    /// Write a u32 length prefix, failing if `len` does not fit.
    fn write_len(&mut self, len: usize, what: &str) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| {
            BridgeError::malformed(format!("{} length {} exceeds u32::MAX", what, len))
        })?;
        self.write_u32(len)
    }

    /// Write a `[len: u32][utf-8]` string.
    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_len(s.len(), "string")?;
        self.write_all(s.as_bytes())
    }
}

impl<B: BufMut> ChannelWriter for B {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        if self.remaining_mut() < bytes.len() {
            return Err(BridgeError::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                "output buffer full",
            )));
        }
        self.put_slice(bytes);
        Ok(())
    }
}

/// Blocking writer over [`std::io::Write`].
pub struct IoWriter<W> {
    inner: W,
}

impl<W: Write> IoWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ChannelWriter for IoWriter<W> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }
}
