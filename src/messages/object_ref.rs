//! Object reference reply.

use crate::channel::{ChannelReader, ChannelWriter};
use crate::error::{BridgeError, Result};
use crate::handler::ObjectHandle;
use crate::protocol::{type_codes, MessageKind, TypeCode};

/// Handle of an object living in the remote runtime.
///
/// Sent in reply to a successful [`CreateObjectMessage`](super::CreateObjectMessage).
/// Body: `[handle: u64]`, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectRefMessage {
    /// The object's handle.
    pub handle: ObjectHandle,
}

impl ObjectRefMessage {
    /// Create a bound message.
    pub fn new(handle: ObjectHandle) -> Self {
        Self { handle }
    }
}

impl MessageKind for ObjectRefMessage {
    const TYPE_CODE: TypeCode = type_codes::OBJECT_REF;
    const NAME: &'static str = "object_ref";

    fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()> {
        if self.handle.is_null() {
            return Err(BridgeError::malformed("object handle must not be zero"));
        }
        w.write_u64(self.handle.get())
    }

    fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
        let handle = ObjectHandle::new(r.read_u64()?);
        if handle.is_null() {
            return Err(BridgeError::malformed("object handle must not be zero"));
        }
        self.handle = handle;
        Ok(())
    }
}
