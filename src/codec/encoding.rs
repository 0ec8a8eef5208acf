//! Tag + payload encoding for [`Value`].

use super::value::{Value, ValueKind};
use crate::channel::{ChannelReader, ChannelWriter};
use crate::error::{BridgeError, Result};

/// Encode `value` as a tag byte followed by its payload.
///
/// # Errors
///
/// Fails if a string or sequence length does not fit the u32 prefix.
pub fn encode_value(w: &mut dyn ChannelWriter, value: &Value) -> Result<()> {
    w.write_u8(value.kind().tag())?;
    match value {
        Value::Null => Ok(()),
        Value::Bool(v) => w.write_u8(u8::from(*v)),
        Value::Int32(v) => w.write_i32(*v),
        Value::Int64(v) => w.write_i64(*v),
        Value::Real64(v) => w.write_f64(*v),
        Value::String(s) => w.write_string(s),
        Value::Sequence(items) => {
            w.write_len(items.len(), "sequence")?;
            for item in items {
                encode_value(w, item)?;
            }
            Ok(())
        }
    }
}

/// Decode one tagged value.
///
/// # Errors
///
/// - [`BridgeError::UnsupportedValueKind`] for a tag outside the closed set
/// - [`BridgeError::MalformedMessage`] for an invalid payload, a length over
///   the reader's limits, or nesting deeper than `max_nesting_depth`
/// - [`BridgeError::Truncated`] if the input ends early
pub fn decode_value(r: &mut dyn ChannelReader) -> Result<Value> {
    decode_at_depth(r, 0)
}

fn decode_at_depth(r: &mut dyn ChannelReader, depth: usize) -> Result<Value> {
    let kind = ValueKind::try_from(r.read_u8()?)?;
    Ok(match kind {
        ValueKind::Null => Value::Null,
        ValueKind::Bool => Value::Bool(decode_bool(r)?),
        ValueKind::Int32 => Value::Int32(r.read_i32()?),
        ValueKind::Int64 => Value::Int64(r.read_i64()?),
        ValueKind::Real64 => Value::Real64(r.read_f64()?),
        ValueKind::String => Value::String(r.read_string()?),
        ValueKind::Sequence => {
            let limits = r.limits();
            if depth >= limits.max_nesting_depth {
                return Err(BridgeError::malformed(format!(
                    "sequence nesting exceeds maximum depth {}",
                    limits.max_nesting_depth
                )));
            }
            let count = r.read_len(limits.max_sequence_len, "sequence")?;
            let mut items = Vec::with_capacity(r.element_capacity(count)?);
            for _ in 0..count {
                items.push(decode_at_depth(r, depth + 1)?);
            }
            Value::Sequence(items)
        }
    })
}

/// Decode a boolean byte; only 0 and 1 are valid.
pub(crate) fn decode_bool(r: &mut dyn ChannelReader) -> Result<bool> {
    match r.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(BridgeError::malformed(format!(
            "invalid boolean byte {:#04x}",
            other
        ))),
    }
}
