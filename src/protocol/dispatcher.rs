//! Header-driven message dispatch.
//!
//! The dispatcher owns header consumption: it reads the magic and type code,
//! asks the registry for an unbound instance of that kind and lets the kind
//! decode its own body.

use std::sync::Arc;

use bytes::BytesMut;

use super::message::Message;
use super::registry::MessageRegistry;
use super::wire_format::Header;
use crate::channel::{BytesReader, ChannelReader, ChannelWriter};
use crate::config::Limits;
use crate::error::{BridgeError, Result};

/// Reads and writes whole messages using a shared registry.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MessageRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`.
    pub fn new(registry: Arc<MessageRegistry>) -> Self {
        Self { registry }
    }

    /// The registry used for lookups.
    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// Read one message.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ProtocolMismatch`] if the magic is wrong (the type
    ///   code is not read)
    /// - [`BridgeError::UnknownMessageType`] if no kind is registered
    /// - any body error raised by the kind's decoder
    pub fn read_message(&self, r: &mut dyn ChannelReader) -> Result<Box<dyn Message>> {
        let header = Header::read_from(r)?;

        let mut message = self
            .registry
            .create(header.type_code)
            .ok_or(BridgeError::UnknownMessageType(header.type_code))?;

        message.deserialize(r)?;

        tracing::debug!(
            "Decoded {} message (type {})",
            message.name(),
            header.type_code
        );
        Ok(message)
    }

    /// Write one message (header and body).
    pub fn write_message(&self, w: &mut dyn ChannelWriter, message: &dyn Message) -> Result<()> {
        message.serialize(w)
    }

    /// Encode a message into a fresh buffer.
    pub fn encode(&self, message: &dyn Message) -> Result<BytesMut> {
        let mut buf = BytesMut::new();
        self.write_message(&mut buf, message)?;
        Ok(buf)
    }

    /// Decode exactly one message from `bytes`.
    ///
    /// Bytes left over after the message are a [`BridgeError::MalformedMessage`].
    pub fn decode(&self, bytes: &[u8], limits: Limits) -> Result<Box<dyn Message>> {
        let mut reader = BytesReader::new(bytes, limits);
        let message = self.read_message(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(BridgeError::malformed(format!(
                "{} trailing bytes after {} message",
                reader.remaining(),
                message.name()
            )));
        }
        Ok(message)
    }
}
