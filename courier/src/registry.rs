//! Type-indexed handler storage.
//!
//! The registry is the only shared mutable state in the mediator. It maps a
//! [`TypeKey`] to exactly one request handler entry (commands/queries) or to
//! an ordered, name-deduplicated set of event handler entries.
//!
//! Access follows a reader/writer discipline: registration takes the write
//! lock, lookups take the read lock and hand out cloned `Arc`-backed entries
//! so no lock is ever held across a handler invocation.

use courier_core::{DynEventHandler, DynRequestHandler, TypeKey};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The stored registration record for a command/query handler.
#[derive(Clone)]
pub struct RequestEntry {
    key: TypeKey,
    name: Arc<str>,
    response_type: &'static str,
    handler: Arc<dyn DynRequestHandler>,
}

impl RequestEntry {
    /// Create an entry binding `key` to an erased handler.
    pub fn new(
        key: TypeKey,
        name: Arc<str>,
        response_type: &'static str,
        handler: Arc<dyn DynRequestHandler>,
    ) -> Self {
        Self {
            key,
            name,
            response_type,
            handler,
        }
    }

    /// The request type key this entry is registered under.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The handler's name, used to key its middleware chains.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name of the response the handler produces.
    pub fn response_type(&self) -> &'static str {
        self.response_type
    }

    /// The erased handler.
    pub fn handler(&self) -> &Arc<dyn DynRequestHandler> {
        &self.handler
    }
}

/// The stored registration record for one event handler.
#[derive(Clone)]
pub struct EventEntry {
    name: Arc<str>,
    handler: Arc<dyn DynEventHandler>,
}

impl EventEntry {
    /// Create an entry for an erased event handler.
    pub fn new(name: Arc<str>, handler: Arc<dyn DynEventHandler>) -> Self {
        Self { name, handler }
    }

    /// The handler's name; entries are deduplicated by it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The erased handler.
    pub fn handler(&self) -> &Arc<dyn DynEventHandler> {
        &self.handler
    }
}

/// Concurrency-safe store of request and event handler entries.
#[derive(Default)]
pub struct HandlerRegistry {
    singles: RwLock<HashMap<TypeKey, RequestEntry>>,
    multis: RwLock<HashMap<TypeKey, Vec<EventEntry>>>,
}

// The maps stay consistent through a poisoned lock: every write is a single
// insert/push, so recovery just continues with the last completed state.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the single entry for its key, overwriting any previous one.
    ///
    /// Last-write-wins by design; replacing a handler is not an error.
    pub fn register_single(&self, entry: RequestEntry) {
        write(&self.singles).insert(entry.key(), entry);
    }

    /// Look up the single entry for `key`.
    pub fn lookup_single(&self, key: TypeKey) -> Option<RequestEntry> {
        read(&self.singles).get(&key).cloned()
    }

    /// Merge `entries` into the ordered set for `key`.
    ///
    /// Entries whose name already exists in the set are skipped, making
    /// repeated registration idempotent. Insertion order is preserved.
    pub fn register_many(&self, key: TypeKey, entries: Vec<EventEntry>) {
        if entries.is_empty() {
            return;
        }
        let mut multis = write(&self.multis);
        let registered = multis.entry(key).or_default();
        for entry in entries {
            if !registered.iter().any(|e| e.name() == entry.name()) {
                registered.push(entry);
            }
        }
    }

    /// Look up the ordered entry set for `key`.
    pub fn lookup_many(&self, key: TypeKey) -> Option<Vec<EventEntry>> {
        read(&self.multis).get(&key).cloned()
    }

    /// Whether any handler (single or fan-out) is registered for `key`.
    pub fn contains(&self, key: TypeKey) -> bool {
        read(&self.singles).contains_key(&key) || read(&self.multis).contains_key(&key)
    }

    /// Number of registered request types plus event types.
    pub fn len(&self) -> usize {
        read(&self.singles).len() + read(&self.multis).len()
    }

    /// Whether the registry holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
