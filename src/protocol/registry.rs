//! Registry mapping type codes to message-kind factories.
//!
//! The registry is built once, before any channel activity, and is read-only
//! afterwards. Share it between connections with an `Arc`.
//!
//! # Example
//!
//! ```
//! use bridgewire::messages::{CreateObjectMessage, Real64Message};
//! use bridgewire::protocol::{MessageKind, MessageRegistry};
//!
//! let registry = MessageRegistry::builder()
//!     .register::<CreateObjectMessage>()
//!     .register::<Real64Message>()
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.contains(Real64Message::TYPE_CODE));
//! assert_eq!(registry.len(), 2);
//! ```

use std::collections::HashMap;

use super::message::{Message, MessageKind};
use super::wire_format::{TypeCode, RESERVED_TYPE_CODE};
use crate::error::{BridgeError, Result};
use crate::messages::{
    BoolMessage, CreateObjectMessage, ErrorMessage, Int32Message, Int64Message, ObjectRefMessage,
    Real64Message, StringMessage, ValueArrayMessage,
};

/// Zero-argument constructor for an unbound message.
pub type MessageFactory = fn() -> Box<dyn Message>;

fn new_unbound<K: MessageKind>() -> Box<dyn Message> {
    Box::new(K::default())
}

/// Entry for a registered kind.
#[derive(Debug)]
struct KindEntry {
    /// Kind name, for logs.
    name: &'static str,
    /// Factory for an unbound instance.
    factory: MessageFactory,
}

/// Immutable table of message kinds.
#[derive(Debug)]
pub struct MessageRegistry {
    kinds: HashMap<TypeCode, KindEntry>,
}

impl MessageRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Builder pre-populated with every kind shipped by this crate.
    ///
    /// Add application kinds to it before calling `build()`.
    pub fn standard_builder() -> RegistryBuilder {
        Self::builder()
            .register::<CreateObjectMessage>()
            .register::<ObjectRefMessage>()
            .register::<ErrorMessage>()
            .register::<BoolMessage>()
            .register::<Int32Message>()
            .register::<Int64Message>()
            .register::<Real64Message>()
            .register::<StringMessage>()
            .register::<ValueArrayMessage>()
    }

    /// Registry with every kind shipped by this crate.
    pub fn standard() -> Result<Self> {
        Self::standard_builder().build()
    }

    /// Construct an unbound message for `type_code`.
    pub fn create(&self, type_code: TypeCode) -> Option<Box<dyn Message>> {
        self.kinds.get(&type_code).map(|entry| (entry.factory)())
    }

    /// Check if a kind is registered for `type_code`.
    pub fn contains(&self, type_code: TypeCode) -> bool {
        self.kinds.contains_key(&type_code)
    }

    /// Get the kind name for `type_code`.
    pub fn name_of(&self, type_code: TypeCode) -> Option<&'static str> {
        self.kinds.get(&type_code).map(|entry| entry.name)
    }

    /// Registered type codes in ascending order.
    pub fn type_codes(&self) -> Vec<TypeCode> {
        let mut codes: Vec<TypeCode> = self.kinds.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Builder for [`MessageRegistry`].
///
/// Registration errors are collected and reported by [`build`](Self::build),
/// keeping the chain fluent.
#[derive(Debug)]
pub struct RegistryBuilder {
    kinds: HashMap<TypeCode, KindEntry>,
    error: Option<BridgeError>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
            error: None,
        }
    }

    /// Register kind `K` under `K::TYPE_CODE`.
    pub fn register<K: MessageKind>(self) -> Self {
        self.register_factory(K::TYPE_CODE, K::NAME, new_unbound::<K>)
    }

    /// Register a factory under an explicit type code.
    ///
    /// The factory must produce messages whose `type_code()` equals `type_code`;
    /// this is checked once here.
    pub fn register_factory(
        mut self,
        type_code: TypeCode,
        name: &'static str,
        factory: MessageFactory,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        if type_code == RESERVED_TYPE_CODE {
            self.error = Some(BridgeError::Registry(format!(
                "type code {} is reserved ({})",
                type_code, name
            )));
            return self;
        }

        let produced = factory().type_code();
        if produced != type_code {
            self.error = Some(BridgeError::Registry(format!(
                "factory for {} produces type code {}, registered as {}",
                name, produced, type_code
            )));
            return self;
        }

        if let Some(existing) = self.kinds.get(&type_code) {
            self.error = Some(BridgeError::Registry(format!(
                "type code {} already registered to {}, cannot register {}",
                type_code, existing.name, name
            )));
            return self;
        }

        self.kinds.insert(type_code, KindEntry { name, factory });
        self
    }

    /// Finish the registry.
    ///
    /// # Errors
    ///
    /// Returns the first registration error (reserved, duplicate or
    /// mismatched type code).
    pub fn build(self) -> Result<MessageRegistry> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(MessageRegistry { kinds: self.kinds }),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
