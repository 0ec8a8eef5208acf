//! Create-object command.
//!
//! Asks the receiving runtime to construct an instance of `class_name` from
//! `parameters`. Constructor selection happens entirely on the receiving
//! side, by name, argument count and decoded value kinds.
//!
//! Body layout:
//! ```text
//! [class_name_len: u32][class_name: utf-8][arg_count: u16][value]*
//! ```

use crate::channel::{ChannelReader, ChannelWriter};
use crate::codec::{decode_value, encode_value, Value};
use crate::error::{BridgeError, Result};
use crate::handler::{ObjectHandle, Resolver};
use crate::protocol::{type_codes, MessageKind, TypeCode};

/// Most parameters a create command can carry (u16 count on the wire).
pub const MAX_PARAMETERS: usize = u16::MAX as usize;

/// Construct an object from a class name and positional arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateObjectMessage {
    /// Fully-qualified class name; never empty once bound.
    pub class_name: String,
    /// Constructor arguments, in order.
    pub parameters: Vec<Value>,
}

impl CreateObjectMessage {
    /// Create a bound command.
    pub fn new(class_name: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            class_name: class_name.into(),
            parameters,
        }
    }

    /// Hand the command to the runtime-integration layer.
    pub fn process(&self, resolver: &dyn Resolver) -> Result<ObjectHandle> {
        resolver.resolve(&self.class_name, &self.parameters)
    }
}

impl MessageKind for CreateObjectMessage {
    const TYPE_CODE: TypeCode = type_codes::CREATE_OBJECT;
    const NAME: &'static str = "create_object";

    fn write_body(&self, w: &mut dyn ChannelWriter) -> Result<()> {
        if self.class_name.is_empty() {
            return Err(BridgeError::malformed("class name must not be empty"));
        }
        // Checked before anything is written so a rejected command leaves
        // no partial bytes behind.
        let count = u16::try_from(self.parameters.len()).map_err(|_| {
            BridgeError::malformed(format!(
                "{} parameters exceed the maximum of {}",
                self.parameters.len(),
                MAX_PARAMETERS
            ))
        })?;

        w.write_string(&self.class_name)?;
        w.write_u16(count)?;
        for parameter in &self.parameters {
            encode_value(w, parameter)?;
        }
        Ok(())
    }

    fn read_body(&mut self, r: &mut dyn ChannelReader) -> Result<()> {
        let class_name = r.read_string()?;
        if class_name.is_empty() {
            return Err(BridgeError::malformed("class name must not be empty"));
        }

        let count = usize::from(r.read_u16()?);
        let mut parameters = Vec::with_capacity(r.element_capacity(count)?);
        for _ in 0..count {
            parameters.push(decode_value(r)?);
        }

        self.class_name = class_name;
        self.parameters = parameters;
        Ok(())
    }
}
