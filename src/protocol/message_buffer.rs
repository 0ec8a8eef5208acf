//! Message buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` to hold data received from an async stream.
//! Messages carry no frame length, so the buffer finds message boundaries by
//! decoding: a decode that runs out of bytes means "wait for more", anything
//! else is a real error.
//!
//! A decode that runs short reports how many more bytes it needed. The
//! buffer records that as the length the incomplete message must reach
//! before it is decoded again, so a large message arriving in small chunks
//! is not re-decoded on every push. The `max_message_size` limit bounds the
//! buffered bytes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bridgewire::config::Limits;
//! use bridgewire::messages::Real64Message;
//! use bridgewire::protocol::{Dispatcher, MessageBuffer, MessageRegistry};
//!
//! let dispatcher = Dispatcher::new(Arc::new(MessageRegistry::standard().unwrap()));
//! let bytes = dispatcher.encode(&Real64Message::new(1.0)).unwrap();
//!
//! let mut buffer = MessageBuffer::new(dispatcher, Limits::default());
//! assert!(buffer.push(&bytes[..5]).unwrap().is_empty());
//! assert_eq!(buffer.push(&bytes[5..]).unwrap().len(), 1);
//! ```

use bytes::{Buf, BytesMut};

use super::dispatcher::Dispatcher;
use super::message::Message;
use crate::channel::BytesReader;
use crate::config::Limits;
use crate::error::{BridgeError, Result};

/// Buffer for accumulating incoming bytes and extracting complete messages.
pub struct MessageBuffer {
    /// Accumulated bytes from stream reads.
    buffer: BytesMut,
    /// Decodes messages from the buffered bytes.
    dispatcher: Dispatcher,
    /// Decoder limits.
    limits: Limits,
    /// Buffered length the incomplete message needs before the next attempt.
    min_len: usize,
    /// Error hit after some messages of the same push were already decoded.
    pending_error: Option<BridgeError>,
    /// Decodes started, complete or not.
    decode_attempts: u64,
}

impl MessageBuffer {
    /// Create a new message buffer.
    pub fn new(dispatcher: Dispatcher, limits: Limits) -> Self {
        Self::with_capacity(dispatcher, limits, 64 * 1024)
    }

    /// Create a new message buffer with a custom initial capacity.
    pub fn with_capacity(dispatcher: Dispatcher, limits: Limits, capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            dispatcher,
            limits,
            min_len: 0,
            pending_error: None,
            decode_attempts: 0,
        }
    }

    /// Push data into the buffer and extract all complete messages.
    ///
    /// Partial trailing data is kept for the next push.
    ///
    /// If a decode fails after earlier messages of the same push were
    /// decoded, those messages are returned and the error is held back;
    /// retrieve it with [`take_error`](Self::take_error) once they have been
    /// handled. A held-back error is also returned by the next `push` or
    /// [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// Any decode error other than running out of bytes, and
    /// [`BridgeError::MalformedMessage`] if an incomplete message grows past
    /// `max_message_size`. After an error the stream position is lost and
    /// the buffer should be discarded.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Box<dyn Message>>> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();
        loop {
            match self.try_extract_one() {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => break,
                Err(err) if messages.is_empty() => return Err(err),
                Err(err) => {
                    self.pending_error = Some(err);
                    break;
                }
            }
        }

        Ok(messages)
    }

    /// Take the error held back by the last [`push`](Self::push).
    pub fn take_error(&mut self) -> Option<BridgeError> {
        self.pending_error.take()
    }

    /// Try to decode a single message from the front of the buffer.
    fn try_extract_one(&mut self) -> Result<Option<Box<dyn Message>>> {
        if self.buffer.is_empty() || self.buffer.len() < self.min_len {
            return Ok(None);
        }

        self.decode_attempts += 1;
        let (result, consumed) = {
            let mut reader = BytesReader::new(&self.buffer[..], self.limits);
            let result = self.dispatcher.read_message(&mut reader);
            (result, reader.consumed())
        };

        match result {
            Ok(message) => {
                self.buffer.advance(consumed);
                self.min_len = 0;
                Ok(Some(message))
            }
            Err(BridgeError::Truncated { needed, .. }) => {
                if self.buffer.len() > self.limits.max_message_size {
                    return Err(BridgeError::malformed(format!(
                        "incomplete message of {} bytes exceeds maximum {}",
                        self.buffer.len(),
                        self.limits.max_message_size
                    )));
                }
                // The failed read consumed nothing, so the message is at
                // least this long.
                self.min_len = consumed.saturating_add(needed);
                if self.min_len > self.limits.max_message_size {
                    return Err(BridgeError::malformed(format!(
                        "message of at least {} bytes exceeds maximum {}",
                        self.min_len, self.limits.max_message_size
                    )));
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Check that the stream ended on a message boundary.
    ///
    /// # Errors
    ///
    /// An error held back by the last push, or
    /// [`BridgeError::MalformedMessage`] if part of a message is still buffered.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        if !self.buffer.is_empty() {
            return Err(BridgeError::malformed(format!(
                "stream ended inside a message ({} bytes buffered)",
                self.buffer.len()
            )));
        }
        Ok(())
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of decodes started so far, including ones that ran short.
    pub fn decode_attempts(&self) -> u64 {
        self.decode_attempts
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.min_len = 0;
        self.pending_error = None;
    }
}
