//! Message processing.

use std::sync::{Mutex, MutexGuard};

use super::resolver::Resolver;
use crate::codec::Value;
use crate::config::{BridgeConfig, DEFAULT_MAX_STORED_VALUES};
use crate::error::{BridgeError, Result};
use crate::messages::{
    BoolMessage, CreateObjectMessage, Int32Message, Int64Message, ObjectRefMessage,
    Real64Message, StringMessage, ValueArrayMessage,
};
use crate::protocol::Message;

/// Processes decoded messages.
///
/// An `Err` is a processing failure: the message itself was well formed, so
/// the session reports the error to the peer and keeps reading.
pub trait MessageHandler: Send + Sync {
    /// Handle one message, optionally producing a reply.
    fn handle(&self, message: Box<dyn Message>) -> Result<Option<Box<dyn Message>>>;
}

/// Default handler.
///
/// - create-object commands go to the resolver and are answered with an
///   object reference
/// - value-carrying messages are collected, see [`BridgeHandler::take_values`]
/// - anything else is rejected
///
/// At most `max_stored_values` values are held; further value messages
/// fail until the collected ones are drained.
pub struct BridgeHandler<R> {
    resolver: R,
    values: Mutex<Vec<Value>>,
    max_stored_values: usize,
}

impl<R: Resolver> BridgeHandler<R> {
    /// Create a handler over `resolver`.
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            values: Mutex::new(Vec::new()),
            max_stored_values: DEFAULT_MAX_STORED_VALUES,
        }
    }

    /// Create a handler taking its value limit from `config`.
    pub fn with_config(resolver: R, config: &BridgeConfig) -> Self {
        Self::new(resolver).max_stored_values(config.max_stored_values)
    }

    /// Set how many undrained values are held.
    pub fn max_stored_values(mut self, count: usize) -> Self {
        self.max_stored_values = count;
        self
    }

    /// The resolver used for create-object commands.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Drain the values received so far, in arrival order.
    pub fn take_values(&self) -> Vec<Value> {
        std::mem::take(&mut *self.lock_values())
    }

    fn lock_values(&self) -> MutexGuard<'_, Vec<Value>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<R: Resolver> MessageHandler for BridgeHandler<R> {
    fn handle(&self, message: Box<dyn Message>) -> Result<Option<Box<dyn Message>>> {
        let message = match message.downcast::<CreateObjectMessage>() {
            Ok(create) => {
                let handle = create.process(&self.resolver)?;
                if handle.is_null() {
                    return Err(BridgeError::ConstructionFailure {
                        class_name: create.class_name,
                        reason: "resolver returned the zero handle".to_string(),
                    });
                }
                return Ok(Some(Box::new(ObjectRefMessage::new(handle))));
            }
            Err(other) => other,
        };

        match carried_value(message.as_ref()) {
            Some(value) => {
                let mut values = self.lock_values();
                if values.len() >= self.max_stored_values {
                    return Err(BridgeError::malformed(format!(
                        "{} undrained values already held",
                        values.len()
                    )));
                }
                values.push(value);
                Ok(None)
            }
            None => Err(BridgeError::malformed(format!(
                "{} messages are not accepted by this endpoint",
                message.name()
            ))),
        }
    }
}

/// The value carried by a value message.
fn carried_value(message: &dyn Message) -> Option<Value> {
    if let Some(m) = message.downcast_ref::<Real64Message>() {
        return Some(m.to_value());
    }
    if let Some(m) = message.downcast_ref::<Int64Message>() {
        return Some(m.to_value());
    }
    if let Some(m) = message.downcast_ref::<Int32Message>() {
        return Some(m.to_value());
    }
    if let Some(m) = message.downcast_ref::<BoolMessage>() {
        return Some(m.to_value());
    }
    if let Some(m) = message.downcast_ref::<StringMessage>() {
        return Some(m.to_value());
    }
    message
        .downcast_ref::<ValueArrayMessage>()
        .map(ValueArrayMessage::to_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ValueKind;
    use crate::handler::{ConstructorTable, ObjectHandle};
    use crate::messages::ErrorMessage;

    /// Claims success without an object.
    struct ZeroHandle;

    impl Resolver for ZeroHandle {
        fn resolve(&self, _class_name: &str, _parameters: &[Value]) -> Result<ObjectHandle> {
            Ok(ObjectHandle::default())
        }
    }

    fn handler() -> BridgeHandler<ConstructorTable> {
        let mut table = ConstructorTable::new();
        table.register("System.String", &[ValueKind::String], |args| {
            Ok(args[0].as_str().unwrap_or_default().to_string())
        });
        BridgeHandler::new(table)
    }

    #[test]
    fn test_create_object_replies_with_ref() {
        let h = handler();
        let request = CreateObjectMessage::new("System.String", vec![Value::from("hi")]);
        let reply = h.handle(Box::new(request)).unwrap().unwrap();

        let object_ref = reply.downcast_ref::<ObjectRefMessage>().unwrap();
        assert_eq!(object_ref.handle, ObjectHandle::new(1));
        assert_eq!(
            h.resolver().with_object(object_ref.handle, |s: &String| s.clone()),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_construction_failure() {
        let h = handler();
        let request = CreateObjectMessage::new("System.String", vec![Value::Int32(1)]);
        let err = h.handle(Box::new(request)).unwrap_err();
        assert!(matches!(err, BridgeError::ConstructionFailure { .. }));
    }

    #[test]
    fn test_values_collected_in_order() {
        let h = handler();
        assert!(h.handle(Box::new(Real64Message::new(1.5))).unwrap().is_none());
        assert!(h.handle(Box::new(StringMessage::new("s"))).unwrap().is_none());
        assert!(h
            .handle(Box::new(ValueArrayMessage::new(vec![Value::Null])))
            .unwrap()
            .is_none());

        assert_eq!(
            h.take_values(),
            vec![
                Value::Real64(1.5),
                Value::from("s"),
                Value::Sequence(vec![Value::Null]),
            ]
        );
        assert!(h.take_values().is_empty());
    }

    #[test]
    fn test_reply_kinds_rejected() {
        let h = handler();
        let err = h.handle(Box::new(ErrorMessage::default())).unwrap_err();
        assert!(err.to_string().contains("error messages are not accepted"));
    }

    #[test]
    fn test_zero_handle_is_construction_failure() {
        let h = BridgeHandler::new(ZeroHandle);
        let err = h
            .handle(Box::new(CreateObjectMessage::new("Ghost", vec![])))
            .unwrap_err();
        match err {
            BridgeError::ConstructionFailure { class_name, .. } => assert_eq!(class_name, "Ghost"),
            other => panic!("expected ConstructionFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_stored_values_bounded() {
        let config = BridgeConfig::default().max_stored_values(2);
        let h = BridgeHandler::with_config(ZeroHandle, &config);
        h.handle(Box::new(Int32Message::new(1))).unwrap();
        h.handle(Box::new(Int64Message::new(2))).unwrap();

        let err = h.handle(Box::new(BoolMessage::new(true))).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("2 undrained values"));

        assert_eq!(h.take_values(), vec![Value::Int32(1), Value::Int64(2)]);
        assert!(h.handle(Box::new(BoolMessage::new(true))).unwrap().is_none());
        assert_eq!(h.take_values(), vec![Value::Bool(true)]);
    }
}
