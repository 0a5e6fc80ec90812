//! Caller-provided dispatch context.
//!
//! The mediator is cancellation-transparent: it never inspects the context
//! it is handed, it only threads it through middleware and into handlers.
//! `Context` is a typed value bag so middleware can hand data to later
//! middleware in the same chain, and callers can hand request-scoped state
//! to handlers.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A typed, cheaply clonable bag of request-scoped values.
///
/// Values are stored behind `Arc`, so cloning a context is a shallow map
/// copy. Inserting a second value of the same type replaces the first.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, PartialEq)]
/// struct RequestId(u64);
///
/// let mut ctx = Context::new();
/// ctx.insert(RequestId(7));
/// assert_eq!(ctx.get::<RequestId>(), Some(&RequestId(7)));
/// ```
#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Builder-style insert for fluent construction.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Look up a value by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Whether a value of type `T` is present.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Remove and drop the value of type `T`, if present.
    ///
    /// Returns whether a value was removed.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> bool {
        self.values.remove(&TypeId::of::<T>()).is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .finish()
    }
}
