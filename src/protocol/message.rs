//! The message envelope contract.
//!
//! A message kind implements [`MessageKind`]: a compile-time type code plus
//! a body encoder/decoder. The object-safe [`Message`] trait is derived from
//! it by a blanket impl, which is the only place the header is written, so
//! no instance can report a type code other than its kind's.
//!
//! # Example
//!
//! ```
//! use bridgewire::channel::{ChannelReader, ChannelWriter};
//! use bridgewire::protocol::{Message, MessageKind, TypeCode};
//! use bridgewire::Result;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! impl MessageKind for Ping {
//!     const TYPE_CODE: TypeCode = 200;
//!     const NAME: &'static str = "ping";
//!
//!     fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()> {
//!         w.write_u32(self.seq)
//!     }
//!
//!     fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
//!         self.seq = r.read_u32()?;
//!         Ok(())
//!     }
//! }
//!
//! let boxed: Box<dyn Message> = Box::new(Ping { seq: 3 });
//! assert_eq!(boxed.type_code(), 200);
//! assert_eq!(boxed.downcast_ref::<Ping>(), Some(&Ping { seq: 3 }));
//! ```

use std::any::Any;
use std::fmt;

use super::wire_format::{Header, TypeCode};
use crate::channel::{ChannelReader, ChannelWriter};
use crate::error::Result;

/// A concrete message kind.
///
/// `Default` is the unbound state the dispatcher constructs before calling
/// [`read_body`](MessageKind::read_body).
pub trait MessageKind: Default + fmt::Debug + Send + 'static {
    /// Type code on the wire.
    const TYPE_CODE: TypeCode;

    /// Name used in logs.
    const NAME: &'static str;

    /// Write the body (everything after the header).
    fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()>;

    /// Fill fields from the body. The header has already been consumed.
    fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()>;
}

/// Object-safe view of any message kind.
pub trait Message: fmt::Debug + Send + 'static {
    /// Type code of this message's kind.
    fn type_code(&self) -> TypeCode;

    /// Name of this message's kind.
    fn name(&self) -> &'static str;

    /// Write header and body.
    fn serialize(&self, w: &mut dyn ChannelWriter) -> Result<()>;

    /// Read the body; called after the dispatcher consumed magic and type code.
    fn deserialize(&mut self, r: &mut dyn ChannelReader) -> Result<()>;

    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Owned upcast for downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<K: MessageKind> Message for K {
    #[inline]
    fn type_code(&self) -> TypeCode {
        K::TYPE_CODE
    }

    #[inline]
    fn name(&self) -> &'static str {
        K::NAME
    }

    fn serialize(&self, w: &mut dyn ChannelWriter) -> Result<()> {
        Header::new(K::TYPE_CODE).write_to(w)?;
        self.write_body(w)
    }

    fn deserialize(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
        self.read_body(r)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl dyn Message {
    /// Check whether this message is of kind `K`.
    pub fn is<K: MessageKind>(&self) -> bool {
        self.as_any().is::<K>()
    }

    /// Borrow as kind `K`.
    pub fn downcast_ref<K: MessageKind>(&self) -> Option<&K> {
        self.as_any().downcast_ref::<K>()
    }

    /// Take ownership as kind `K`, or get the message back unchanged.
    pub fn downcast<K: MessageKind>(self: Box<Self>) -> std::result::Result<K, Box<dyn Message>> {
        if !self.is::<K>() {
            return Err(self);
        }
        let kind = self
            .into_any()
            .downcast::<K>()
            .expect("Message kind was checked");
        Ok(*kind)
    }
}
