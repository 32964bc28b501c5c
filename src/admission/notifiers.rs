//! Live notifier tracking
//!
//! Advisory set of request ids currently observed through an open position
//! feed. The reaper consults it to leave observed records alone. Each open
//! feed holds a [`NotifierGuard`]; dropping the guard is the only place a
//! registration is released, so a client disconnect always deregisters.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct LiveNotifierSet {
    // Observer count per id; multiple feeds may watch the same request.
    inner: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl LiveNotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for an id, held until the guard drops.
    pub fn register(&self, id: Uuid) -> NotifierGuard {
        *self.inner.lock().entry(id).or_insert(0) += 1;
        NotifierGuard {
            id,
            set: self.clone(),
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.inner.lock().contains_key(&id)
    }

    fn release(&self, id: Uuid) {
        let mut observers = self.inner.lock();
        if let Some(count) = observers.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                observers.remove(&id);
            }
        }
    }
}

/// Keeps an id in the live set for the lifetime of one position feed.
pub struct NotifierGuard {
    id: Uuid,
    set: LiveNotifierSet,
}

impl NotifierGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for NotifierGuard {
    fn drop(&mut self) {
        self.set.release(self.id);
    }
}
