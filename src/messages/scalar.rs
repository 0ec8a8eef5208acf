//! Scalar value messages.
//!
//! Each kind carries exactly one fixed-width primitive, written raw with no
//! length prefix. All of them are generated from `scalar_message!`, using
//! [`Real64Message`] as the template: `[8 bytes, IEEE-754 bits, LE]`.

use crate::channel::{ChannelReader, ChannelWriter};
use crate::codec::Value;
use crate::error::Result;
use crate::protocol::{type_codes, MessageKind, TypeCode};

macro_rules! scalar_message {
    (
        $(#[$doc:meta])*
        $name:ident($ty:ty) {
            code: $code:expr,
            kind_name: $kind_name:literal,
            write: $write:ident,
            read: $read:expr,
            value: $variant:ident,
        }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name {
            /// Carried value.
            pub value: $ty,
        }

        impl $name {
            /// Create a bound message.
            pub fn new(value: $ty) -> Self {
                Self { value }
            }

            /// The carried value as a tagged [`Value`].
            pub fn to_value(&self) -> Value {
                Value::$variant(self.value)
            }
        }

        // Compared through `Value` so floats compare by bit pattern.
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.to_value() == other.to_value()
            }
        }

        impl From<$ty> for $name {
            fn from(value: $ty) -> Self {
                Self::new(value)
            }
        }

        impl MessageKind for $name {
            const TYPE_CODE: TypeCode = $code;
            const NAME: &'static str = $kind_name;

            fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()> {
                w.$write(self.value.into())
            }

            fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
                let read: fn(&mut dyn ChannelReader) -> Result<$ty> = $read;
                self.value = read(r)?;
                Ok(())
            }
        }
    };
}

scalar_message! {
    /// A single 64-bit float, bit-exact (NaN payloads and infinities included).
    Real64Message(f64) {
        code: type_codes::REAL64,
        kind_name: "real64",
        write: write_f64,
        read: |r| r.read_f64(),
        value: Real64,
    }
}

scalar_message! {
    /// A single 64-bit signed integer.
    Int64Message(i64) {
        code: type_codes::INT64,
        kind_name: "int64",
        write: write_i64,
        read: |r| r.read_i64(),
        value: Int64,
    }
}

scalar_message! {
    /// A single 32-bit signed integer.
    Int32Message(i32) {
        code: type_codes::INT32,
        kind_name: "int32",
        write: write_i32,
        read: |r| r.read_i32(),
        value: Int32,
    }
}

scalar_message! {
    /// A single boolean, one byte: 0 or 1.
    BoolMessage(bool) {
        code: type_codes::BOOL,
        kind_name: "bool",
        write: write_u8,
        read: crate::codec::decode_bool,
        value: Bool,
    }
}
