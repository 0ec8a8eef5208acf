//! Channel module - primitive reads and writes over an ordered byte stream.
//!
//! The protocol never owns a socket. Everything above this module talks to
//! a [`ChannelReader`] or [`ChannelWriter`], which expose fixed-width
//! primitives and length-prefixed strings. All multi-byte integers are
//! little-endian.
//!
//! Adapters:
//! - [`BytesReader`] - in-memory reader over any `bytes::Buf`, reports truncation
//! - [`IoReader`] - blocking reader over `std::io::Read`
//! - any `bytes::BufMut` (e.g. `Vec<u8>`, `BytesMut`) is a [`ChannelWriter`]
//! - [`IoWriter`] - blocking writer over `std::io::Write`
//!
//! # Example
//!
//! ```
//! use bridgewire::channel::{BytesReader, ChannelReader, ChannelWriter};
//! use bridgewire::config::Limits;
//!
//! let mut buf: Vec<u8> = Vec::new();
//! buf.write_u16(7).unwrap();
//! buf.write_string("hi").unwrap();
//!
//! let mut reader = BytesReader::new(&buf[..], Limits::default());
//! assert_eq!(reader.read_u16().unwrap(), 7);
//! assert_eq!(reader.read_string().unwrap(), "hi");
//! ```

mod reader;
mod writer;

pub use reader::{BytesReader, ChannelReader, IoReader, MAX_PREALLOCATED_ELEMENTS};
pub use writer::{ChannelWriter, IoWriter};
