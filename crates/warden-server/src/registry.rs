//! Handle-indexed instance registry.
//!
//! - `handle -> Arc<T>` in a concurrent map
//! - handles come from an atomic counter, taken only once the instance is fully
//!   built, so they are dense, unique and never reused
//! - entries are never removed

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use warden_core::error::{Result, WardenError};

/// Wire representation of a handle.
pub type Handle = i32;

pub struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: DashMap<u32, Arc<T>>,
    next: AtomicU32,
}

impl<T: ?Sized> Registry<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: DashMap::new(),
            next: AtomicU32::new(0),
        }
    }

    /// Store a constructed instance and hand out its handle.
    pub fn insert(&self, item: Arc<T>) -> Result<Handle> {
        let idx = self.next.fetch_add(1, Ordering::SeqCst);
        let handle = Handle::try_from(idx)
            .map_err(|_| WardenError::Internal(format!("{} handle space exhausted", self.kind)))?;
        self.entries.insert(idx, item);
        Ok(handle)
    }

    pub fn resolve(&self, handle: Handle) -> Result<Arc<T>> {
        u32::try_from(handle)
            .ok()
            .and_then(|idx| self.entries.get(&idx).map(|e| Arc::clone(e.value())))
            .ok_or(WardenError::NotFound {
                kind: self.kind,
                handle: i64::from(handle),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
