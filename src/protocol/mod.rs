//! Protocol module - envelope, registry and dispatch.
//!
//! This module implements the framing of the bridge protocol:
//! - 4-byte header (magic + type code) encoding/decoding
//! - [`MessageKind`] / [`Message`] envelope contract
//! - [`MessageRegistry`] mapping type codes to factories
//! - [`Dispatcher`] reading a header and delegating the body to its kind
//! - [`MessageBuffer`] for accumulating partial reads from a stream

mod dispatcher;
mod message;
mod message_buffer;
mod registry;
mod wire_format;

pub use dispatcher::Dispatcher;
pub use message::{Message, MessageKind};
pub use message_buffer::MessageBuffer;
pub use registry::{MessageFactory, MessageRegistry, RegistryBuilder};
pub use wire_format::{type_codes, Header, TypeCode, HEADER_SIZE, MAGIC, RESERVED_TYPE_CODE};
