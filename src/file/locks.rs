//! Per-identifier mutual exclusion.
//!
//! Delete and rename both resolve an identifier and then mutate the
//! directory. Holding the identifier's lock across both steps keeps two
//! requests for the same file from interleaving.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::identifier::FileId;

type Slot = Arc<AsyncMutex<()>>;

/// Registry of per-identifier locks.
///
/// Entries exist only while some request holds or awaits them.
#[derive(Debug, Default)]
pub struct IdLocks {
    slots: Mutex<HashMap<FileId, Slot>>,
}

impl IdLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn lock(&self, id: FileId) -> IdGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(id).or_default().clone()
        };

        let guard = slot.lock_owned().await;

        IdGuard {
            locks: self,
            id,
            guard: Some(guard),
        }
    }

    /// Number of identifiers currently locked or awaited.
    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, id: &FileId) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.get(id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            slots.remove(id);
        }
    }
}

/// Exclusive access to one identifier, released on drop.
#[derive(Debug)]
pub struct IdGuard<'a> {
    locks: &'a IdLocks,
    id: FileId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl IdGuard<'_> {
    /// The locked identifier.
    #[cfg(test)]
    pub(crate) fn id(&self) -> FileId {
        self.id
    }
}

impl Drop for IdGuard<'_> {
    fn drop(&mut self) {
        // The guard owns a reference to the slot; drop it before pruning.
        self.guard.take();
        self.locks.release(&self.id);
    }
}
