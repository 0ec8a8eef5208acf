//! Handler module - what happens to a message once it is decoded.
//!
//! Provides:
//! - [`Resolver`] - runtime hook that constructs objects by class name
//! - [`ConstructorTable`] - in-process resolver with registered constructors
//! - [`MessageHandler`] - turns an incoming message into an optional reply
//! - [`BridgeHandler`] - default handler built on a resolver
//!
//! # Example
//!
//! ```
//! use bridgewire::codec::{Value, ValueKind};
//! use bridgewire::handler::{BridgeHandler, ConstructorTable, MessageHandler};
//! use bridgewire::messages::{CreateObjectMessage, ObjectRefMessage};
//!
//! let mut table = ConstructorTable::new();
//! table.register("Greeting", &[ValueKind::String], |args| {
//!     Ok(args[0].as_str().unwrap_or_default().to_string())
//! });
//!
//! let handler = BridgeHandler::new(table);
//! let request = CreateObjectMessage::new("Greeting", vec![Value::from("hi")]);
//! let reply = handler.handle(Box::new(request)).unwrap().unwrap();
//! assert!(reply.is::<ObjectRefMessage>());
//! ```

mod processor;
mod resolver;

pub use processor::{BridgeHandler, MessageHandler};
pub use resolver::{ConstructorTable, Instance, ObjectHandle, ObjectStore, Resolver};
