//! # bridgewire
//!
//! Wire protocol and value codec for bridging two object runtimes over a
//! byte stream.
//!
//! Every message starts with a 4-byte header (magic and type code, both
//! little-endian `u16`), followed by a body whose layout is owned by the
//! message kind. There is no frame length: a receiver finds message
//! boundaries by decoding.
//!
//! ## Layers
//!
//! - **Channel** ([`channel`]): byte-order aware primitive reads and writes
//! - **Codec** ([`codec`]): the closed, tagged [`Value`](codec::Value) union
//! - **Protocol** ([`protocol`]): header, kind registry, dispatcher, stream buffer
//! - **Messages** ([`messages`]): create-object command, replies, scalar family
//! - **Handler** ([`handler`]): pluggable object construction
//! - **Session** ([`session`]): async loop serving one peer
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bridgewire::codec::Value;
//! use bridgewire::config::Limits;
//! use bridgewire::messages::CreateObjectMessage;
//! use bridgewire::protocol::{Dispatcher, MessageRegistry};
//!
//! # fn main() -> bridgewire::Result<()> {
//! let dispatcher = Dispatcher::new(Arc::new(MessageRegistry::standard()?));
//!
//! let command = CreateObjectMessage::new("System.String", vec![Value::from("hi")]);
//! let bytes = dispatcher.encode(&command)?;
//!
//! let decoded = dispatcher.decode(&bytes, Limits::default())?;
//! assert_eq!(decoded.downcast_ref::<CreateObjectMessage>(), Some(&command));
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod messages;
pub mod protocol;
pub mod session;

pub use error::{BridgeError, Result};
pub use session::{Session, SessionStats};
