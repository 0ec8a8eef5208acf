//! Runtime-integration layer: turning a class name and arguments into an object.
//!
//! The protocol core only delivers `(class_name, parameters)`. A
//! [`Resolver`] decides which constructor applies and builds the instance.
//! Each hosting runtime supplies its own resolver; [`ConstructorTable`] is
//! the in-process variant, with constructors registered up front.
//!
//! # Example
//!
//! ```
//! use bridgewire::codec::{Value, ValueKind};
//! use bridgewire::handler::{ConstructorTable, Resolver};
//!
//! let mut table = ConstructorTable::new();
//! table.register("Point", &[ValueKind::Int32, ValueKind::Int32], |args| {
//!     match (args[0].as_i32(), args[1].as_i32()) {
//!         (Some(x), Some(y)) => Ok((x, y)),
//!         _ => Err("expected two int32".to_string()),
//!     }
//! });
//!
//! let handle = table.resolve("Point", &[Value::Int32(1), Value::Int32(2)]).unwrap();
//! assert_eq!(table.with_object(handle, |p: &(i32, i32)| *p), Some((1, 2)));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::codec::{Value, ValueKind};
use crate::error::{BridgeError, Result};

/// Opaque handle of an object held by the runtime. Zero means "no object".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    /// Wrap a raw handle.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Check if this is the zero handle.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolves a class name and decoded arguments to a constructed instance.
///
/// Any numeric coercion (e.g. binding an `Int32` to a float parameter) is
/// the implementor's decision; the codec never coerces.
pub trait Resolver: Send + Sync {
    /// Construct an instance, or fail with [`BridgeError::ConstructionFailure`].
    fn resolve(&self, class_name: &str, parameters: &[Value]) -> Result<ObjectHandle>;
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve(&self, class_name: &str, parameters: &[Value]) -> Result<ObjectHandle> {
        (**self).resolve(class_name, parameters)
    }
}

/// A constructed object.
pub type Instance = Box<dyn Any + Send + Sync>;

/// Boxed constructor function.
type Constructor = Box<dyn Fn(&[Value]) -> std::result::Result<Instance, String> + Send + Sync>;

/// One constructor of a class.
struct Overload {
    /// Exact argument kinds accepted.
    signature: Vec<ValueKind>,
    /// Builds the instance.
    construct: Constructor,
}

impl Overload {
    fn accepts(&self, parameters: &[Value]) -> bool {
        self.signature.len() == parameters.len()
            && self
                .signature
                .iter()
                .zip(parameters)
                .all(|(kind, value)| *kind == value.kind())
    }
}

/// Objects constructed through a [`ConstructorTable`], keyed by handle.
pub struct ObjectStore {
    next_handle: AtomicU64,
    objects: Mutex<HashMap<ObjectHandle, Instance>>,
}

impl ObjectStore {
    /// Create an empty store. Handles start at 1.
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            objects: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ObjectHandle, Instance>> {
        // A panicking constructor cannot leave the map half-updated.
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store an instance under a fresh handle.
    pub fn insert(&self, instance: Instance) -> ObjectHandle {
        let handle = ObjectHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(handle, instance);
        handle
    }

    /// Drop the instance behind `handle`. Returns whether it existed.
    pub fn remove(&self, handle: ObjectHandle) -> bool {
        self.lock().remove(&handle).is_some()
    }

    /// Borrow the instance behind `handle` as `T`.
    pub fn with<T: Any, F: FnOnce(&T) -> U, U>(&self, handle: ObjectHandle, f: F) -> Option<U> {
        let objects = self.lock();
        objects.get(&handle)?.downcast_ref::<T>().map(f)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no objects are live.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

/// In-process resolver with constructors registered per class name.
///
/// Overloads are matched on exact argument count and value kinds.
pub struct ConstructorTable {
    classes: HashMap<String, Vec<Overload>>,
    objects: ObjectStore,
}

impl ConstructorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            objects: ObjectStore::new(),
        }
    }

    /// Register a constructor for `class_name` accepting `signature`.
    ///
    /// Overloads are tried in registration order.
    pub fn register<F, T>(&mut self, class_name: &str, signature: &[ValueKind], construct: F)
    where
        F: Fn(&[Value]) -> std::result::Result<T, String> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let construct: Constructor =
            Box::new(move |args| construct(args).map(|obj| Box::new(obj) as Instance));
        self.classes
            .entry(class_name.to_string())
            .or_default()
            .push(Overload {
                signature: signature.to_vec(),
                construct,
            });
    }

    /// Check if any constructor is registered for `class_name`.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// Borrow a constructed object as `T`.
    pub fn with_object<T: Any, F: FnOnce(&T) -> U, U>(
        &self,
        handle: ObjectHandle,
        f: F,
    ) -> Option<U> {
        self.objects.with(handle, f)
    }

    /// Release a constructed object.
    pub fn release(&self, handle: ObjectHandle) -> bool {
        self.objects.remove(handle)
    }

    /// Objects currently held.
    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }
}

impl Default for ConstructorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for ConstructorTable {
    fn resolve(&self, class_name: &str, parameters: &[Value]) -> Result<ObjectHandle> {
        let failure = |reason: String| BridgeError::ConstructionFailure {
            class_name: class_name.to_string(),
            reason,
        };

        let overloads = self
            .classes
            .get(class_name)
            .ok_or_else(|| failure("unknown class".to_string()))?;

        let overload = overloads
            .iter()
            .find(|o| o.accepts(parameters))
            .ok_or_else(|| {
                let kinds: Vec<&str> = parameters.iter().map(|p| p.kind().name()).collect();
                failure(format!("no constructor accepts ({})", kinds.join(", ")))
            })?;

        let instance = (overload.construct)(parameters).map_err(failure)?;
        let handle = self.objects.insert(instance);

        tracing::debug!("Constructed {} as {}", class_name, handle);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ConstructorTable {
        let mut table = ConstructorTable::new();
        table.register("System.String", &[ValueKind::String], |args| {
            args[0]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| "expected string".to_string())
        });
        table.register("System.String", &[], |_| Ok(String::new()));
        table.register("Fails", &[], |_| Err::<(), _>("always fails".to_string()));
        table
    }

    #[test]
    fn test_resolve_by_signature() {
        let table = table();
        let a = table.resolve("System.String", &[Value::from("hi")]).unwrap();
        let b = table.resolve("System.String", &[]).unwrap();

        assert_ne!(a, b);
        assert_eq!(table.with_object(a, |s: &String| s.clone()), Some("hi".to_string()));
        assert_eq!(table.with_object(b, |s: &String| s.len()), Some(0));
        assert_eq!(table.objects().len(), 2);
    }

    #[test]
    fn test_handles_start_at_one() {
        let table = table();
        let handle = table.resolve("System.String", &[]).unwrap();
        assert_eq!(handle.get(), 1);
        assert!(!handle.is_null());
    }

    #[test]
    fn test_unknown_class() {
        let err = table().resolve("Nope", &[]).unwrap_err();
        assert!(matches!(err, BridgeError::ConstructionFailure { .. }));
        assert!(err.to_string().contains("unknown class"));
    }

    #[test]
    fn test_no_coercion_in_matching() {
        let err = table()
            .resolve("System.String", &[Value::Int32(1)])
            .unwrap_err();
        assert!(err.to_string().contains("no constructor accepts (int32)"));
    }

    #[test]
    fn test_constructor_failure_propagates() {
        let err = table().resolve("Fails", &[]).unwrap_err();
        assert!(err.to_string().contains("always fails"));
    }

    #[test]
    fn test_release() {
        let table = table();
        let handle = table.resolve("System.String", &[]).unwrap();
        assert!(table.release(handle));
        assert!(!table.release(handle));
        assert!(table.objects().is_empty());
    }

    #[test]
    fn test_wrong_downcast_type() {
        let table = table();
        let handle = table.resolve("System.String", &[]).unwrap();
        assert_eq!(table.with_object(handle, |_: &i32| ()), None);
    }

    #[test]
    fn test_arc_resolver() {
        let shared = Arc::new(table());
        let resolver: &dyn Resolver = &shared;
        assert!(resolver.resolve("System.String", &[]).is_ok());
        assert!(shared.has_class("Fails"));
    }
}
