//! Messages module - the message kinds shipped with the bridge.
//!
//! | Kind | Type code | Body |
//! |------|-----------|------|
//! | [`CreateObjectMessage`] | 1 | class name, u16 count, values |
//! | [`ObjectRefMessage`] | 2 | u64 handle |
//! | [`ErrorMessage`] | 3 | u8 code, string |
//! | [`BoolMessage`] | 16 | u8 |
//! | [`Int32Message`] | 17 | i32 |
//! | [`Int64Message`] | 18 | i64 |
//! | [`Real64Message`] | 19 | f64 bits |
//! | [`StringMessage`] | 20 | string |
//! | [`ValueArrayMessage`] | 21 | u32 count, values |
//!
//! All integers are little-endian; strings are `[len: u32][utf-8]`.

mod create;
mod error;
mod object_ref;
mod scalar;
mod values;

pub use create::{CreateObjectMessage, MAX_PARAMETERS};
pub use error::ErrorMessage;
pub use object_ref::ObjectRefMessage;
pub use scalar::{BoolMessage, Int32Message, Int64Message, Real64Message};
pub use values::{StringMessage, ValueArrayMessage};
