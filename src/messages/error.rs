//! Error reply.

use crate::channel::{ChannelReader, ChannelWriter};
use crate::error::{BridgeError, ErrorCode, Result};
use crate::protocol::{type_codes, MessageKind, TypeCode};

/// Reports a failed request without closing the stream.
///
/// Body: `[code: u8][text_len: u32][text: utf-8]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Error category.
    pub code: ErrorCode,
    /// Human-readable description.
    pub text: String,
}

impl Default for ErrorMessage {
    fn default() -> Self {
        Self {
            code: ErrorCode::Internal,
            text: String::new(),
        }
    }
}

impl ErrorMessage {
    /// Create a bound message.
    pub fn new(code: ErrorCode, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }
}

impl From<&BridgeError> for ErrorMessage {
    fn from(err: &BridgeError) -> Self {
        Self::new(err.error_code(), err.to_string())
    }
}

impl MessageKind for ErrorMessage {
    const TYPE_CODE: TypeCode = type_codes::ERROR;
    const NAME: &'static str = "error";

    fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()> {
        w.write_u8(self.code as u8)?;
        w.write_string(&self.text)
    }

    fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
        self.code = ErrorCode::from_u8(r.read_u8()?);
        self.text = r.read_string()?;
        Ok(())
    }
}
