//! Store slots for graph nodes.
//!
//! A node owns exactly one store slot holding its current data. The slot is
//! abstract — hosts with their own reactive state primitive implement
//! [`StoreCell`] and hand it to [`crate::GraphNode::with_store`] — and
//! [`MemoryCell`] is the default in-memory implementation.

use crate::value::GraphValue;
use std::sync::Mutex;

/// The mutable-store capability a graph node requires.
///
/// Semantics are a `(get, set)` pair: `get` returns the current data, `set`
/// replaces it. Subscription and change scheduling belong to the host; the
/// core only reads and writes through this interface, always fetching fresh
/// data at the moment an update executes.
pub trait StoreCell: Send + Sync {
    /// Current stored value.
    fn get(&self) -> GraphValue;

    /// Replace the stored value.
    fn set(&self, value: GraphValue);
}

type Watcher = Box<dyn Fn(&GraphValue) + Send + Sync>;

/// Default in-memory store slot.
///
/// A mutex-guarded cell plus watcher callbacks invoked after every write, so
/// an embedding host can schedule re-reads without supplying its own cell.
#[derive(Default)]
pub struct MemoryCell {
    value: Mutex<GraphValue>,
    watchers: Mutex<Vec<Watcher>>,
}

impl MemoryCell {
    /// Create a cell holding `value`.
    pub fn new(value: GraphValue) -> Self {
        Self {
            value: Mutex::new(value),
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback invoked with the new value after each write.
    pub fn watch(&self, watcher: impl Fn(&GraphValue) + Send + Sync + 'static) {
        self.watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(watcher));
    }
}

impl StoreCell for MemoryCell {
    fn get(&self) -> GraphValue {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, value: GraphValue) {
        tracing::trace!("store write");
        {
            let mut guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
            *guard = value.clone();
        }
        // Watchers run after the lock is released; a watcher may read back.
        let watchers = self.watchers.lock().unwrap_or_else(|e| e.into_inner());
        for watcher in watchers.iter() {
            watcher(&value);
        }
    }
}

impl std::fmt::Debug for MemoryCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MemoryCell").field(&self.get()).finish()
    }
}
