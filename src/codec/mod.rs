//! Codec module - the tagged value union and its wire encoding.
//!
//! - [`Value`] - closed set of runtime values passed across the bridge
//! - [`ValueKind`] - one-byte tag for each variant
//! - [`encode_value`] / [`decode_value`] - strict tag + payload codec
//!
//! # Wire layout
//!
//! ```text
//! ┌──────┬────────────────────────────────────────────┐
//! │ tag  │ payload                                    │
//! │ u8   │ Null: -  Bool: u8  Int32: 4  Int64: 8      │
//! │      │ Real64: 8 (raw bits)                       │
//! │      │ String: [len u32][utf-8]                   │
//! │      │ Sequence: [count u32][value]*              │
//! └──────┴────────────────────────────────────────────┘
//! ```
//!
//! The codec never widens or coerces: a value decodes to exactly the kind
//! that was written.
//!
//! # Example
//!
//! ```
//! use bridgewire::codec::{decode_value, encode_value, Value};
//! use bridgewire::channel::BytesReader;
//! use bridgewire::config::Limits;
//!
//! let value = Value::Sequence(vec![Value::Int32(1), Value::from("two")]);
//! let mut buf: Vec<u8> = Vec::new();
//! encode_value(&mut buf, &value).unwrap();
//!
//! let mut reader = BytesReader::new(&buf[..], Limits::default());
//! assert_eq!(decode_value(&mut reader).unwrap(), value);
//! ```

mod encoding;
mod json;
mod value;

pub use encoding::{decode_value, encode_value};
pub(crate) use encoding::decode_bool;
pub use value::{Value, ValueKind};
