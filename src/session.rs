//! Session runtime loop.
//!
//! A [`Session`] serves one peer over a byte stream:
//! 1. Read bytes and decode complete messages
//! 2. Hand each message to the [`MessageHandler`]
//! 3. Write the reply, if any, back on the same stream
//!
//! Messages are handled strictly in arrival order. A processing error is
//! reported to the peer as an error message and the session continues. A
//! decode error leaves the stream position unknown and ends the session.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bridgewire::config::BridgeConfig;
//! use bridgewire::handler::{BridgeHandler, ConstructorTable};
//! use bridgewire::protocol::MessageRegistry;
//! use bridgewire::session::Session;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> bridgewire::Result<()> {
//! let session = Session::new(
//!     Arc::new(MessageRegistry::standard()?),
//!     Arc::new(BridgeHandler::new(ConstructorTable::new())),
//!     BridgeConfig::default(),
//! );
//!
//! let (client, server) = tokio::io::duplex(1024);
//! drop(client);
//! let stats = session.run(server).await?;
//! assert_eq!(stats.messages_received, 0);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::handler::MessageHandler;
use crate::messages::ErrorMessage;
use crate::protocol::{Dispatcher, Message, MessageBuffer, MessageRegistry};

/// Counters reported when a session ends cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Messages decoded from the peer.
    pub messages_received: u64,
    /// Replies written back, error replies included.
    pub replies_sent: u64,
    /// Processing failures reported to the peer.
    pub errors_reported: u64,
}

/// Serves one peer connection.
pub struct Session {
    dispatcher: Dispatcher,
    handler: Arc<dyn MessageHandler>,
    config: BridgeConfig,
}

impl Session {
    /// Create a session decoding with `registry` and processing with `handler`.
    pub fn new(
        registry: Arc<MessageRegistry>,
        handler: Arc<dyn MessageHandler>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
            handler,
            config,
        }
    }

    /// The dispatcher used for both directions.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run until the peer closes the stream.
    ///
    /// # Errors
    ///
    /// I/O errors, any decode error, or a stream that ends inside a message.
    pub async fn run<S>(&self, mut stream: S) -> Result<SessionStats>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stats = SessionStats::default();
        let mut buffer = MessageBuffer::with_capacity(
            self.dispatcher.clone(),
            self.config.limits,
            self.config.read_buffer_size,
        );
        let mut buf = vec![0u8; self.config.read_buffer_size.max(1)];
        let mut out = BytesMut::new();

        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                if let Err(e) = buffer.finish() {
                    tracing::error!("Peer closed mid-message: {}", e);
                    return Err(e);
                }
                tracing::debug!(
                    "Session closed after {} messages",
                    stats.messages_received
                );
                return Ok(stats);
            }

            let messages = match buffer.push(&buf[..n]) {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::error!("Decode error, closing session: {}", e);
                    return Err(e);
                }
            };

            out.clear();
            for message in messages {
                stats.messages_received += 1;
                if let Some(reply) = self.process(message, &mut stats) {
                    self.write_reply(&mut out, reply.as_ref(), &mut stats)?;
                }
            }

            if !out.is_empty() {
                stream.write_all(&out).await?;
                stream.flush().await?;
            }

            // Messages decoded ahead of a bad one have been answered above.
            if let Some(e) = buffer.take_error() {
                tracing::error!("Decode error, closing session: {}", e);
                return Err(e);
            }
        }
    }

    /// Append `reply` to `out`, replacing it with an error reply if it
    /// cannot be encoded.
    fn write_reply(
        &self,
        out: &mut BytesMut,
        reply: &dyn Message,
        stats: &mut SessionStats,
    ) -> Result<()> {
        let start = out.len();
        if let Err(e) = self.dispatcher.write_message(out, reply) {
            tracing::warn!("Failed to encode {} reply: {}", reply.name(), e);
            out.truncate(start);
            stats.errors_reported += 1;
            self.dispatcher
                .write_message(out, &ErrorMessage::from(&e))?;
        }
        stats.replies_sent += 1;
        Ok(())
    }

    /// Run the handler, turning a failure into an error reply.
    fn process(
        &self,
        message: Box<dyn Message>,
        stats: &mut SessionStats,
    ) -> Option<Box<dyn Message>> {
        let name = message.name();
        match self.handler.handle(message) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Failed to process {} message: {}", name, e);
                stats.errors_reported += 1;
                Some(Box::new(ErrorMessage::from(&e)))
            }
        }
    }
}
