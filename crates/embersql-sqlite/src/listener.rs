//! Per-table change-notification registry.
//!
//! Fan-out iterates a snapshot taken under the read lock and invokes the
//! callbacks after releasing it, so a listener may add or remove listeners
//! (even on the same table) without corrupting iteration or deadlocking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::driver::{ListenerId, TableListener};

struct Registered {
    id: ListenerId,
    callback: TableListener,
}

/// Table-keyed listener lists with snapshot-read fan-out.
#[derive(Default)]
pub struct ListenerRegistry {
    inner: RwLock<HashMap<String, Vec<Registered>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for a table and returns its removal handle.
    pub fn add(&self, table: &str, listener: TableListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.entry(String::from(table)).or_default().push(Registered {
            id,
            callback: listener,
        });
        id
    }

    /// Removes a listener; unknown ids are ignored.
    pub fn remove(&self, table: &str, id: ListenerId) {
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = map.get_mut(table) {
            list.retain(|registered| registered.id != id);
            if list.is_empty() {
                map.remove(table);
            }
        }
    }

    /// Invokes the table's listeners synchronously, in registration order.
    pub fn notify(&self, table: &str) {
        let snapshot: Vec<TableListener> = {
            let map = self
                .inner
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match map.get(table) {
                Some(list) => list
                    .iter()
                    .map(|registered| TableListener::clone(&registered.callback))
                    .collect(),
                None => return,
            }
        };
        for listener in snapshot {
            listener();
        }
    }
}
