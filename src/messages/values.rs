//! Variable-length value messages.

use crate::channel::{ChannelReader, ChannelWriter};
use crate::codec::{decode_value, encode_value, Value};
use crate::error::Result;
use crate::protocol::{type_codes, MessageKind, TypeCode};

/// A single string. Body: `[len: u32][utf-8]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringMessage {
    /// Carried string.
    pub value: String,
}

impl StringMessage {
    /// Create a bound message.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The carried string as a tagged [`Value`].
    pub fn to_value(&self) -> Value {
        Value::String(self.value.clone())
    }
}

impl MessageKind for StringMessage {
    const TYPE_CODE: TypeCode = type_codes::STRING;
    const NAME: &'static str = "string";

    fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()> {
        w.write_string(&self.value)
    }

    fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
        self.value = r.read_string()?;
        Ok(())
    }
}

/// An array of tagged values. Body: `[count: u32][value]*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueArrayMessage {
    /// Carried values, in order.
    pub values: Vec<Value>,
}

impl ValueArrayMessage {
    /// Create a bound message.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// The carried values as one `Sequence`.
    pub fn to_value(&self) -> Value {
        Value::Sequence(self.values.clone())
    }
}

impl MessageKind for ValueArrayMessage {
    const TYPE_CODE: TypeCode = type_codes::VALUE_ARRAY;
    const NAME: &'static str = "value_array";

    fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()> {
        w.write_len(self.values.len(), "value array")?;
        for value in &self.values {
            encode_value(w, value)?;
        }
        Ok(())
    }

    fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
        let count = r.read_len(r.limits().max_sequence_len, "value array")?;
        let mut values = Vec::with_capacity(r.element_capacity(count)?);
        for _ in 0..count {
            values.push(decode_value(r)?);
        }
        self.values = values;
        Ok(())
    }
}
