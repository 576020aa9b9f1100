//! In-process adapters backed by mutex-guarded maps.
//!
//! They implement the same ports as the PostgreSQL adapters and are used for
//! local runs without a database and by the integration tests. State lives
//! only as long as the process.

mod admin_messages;
mod skills;
mod swaps;
mod users;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

pub use admin_messages::InMemoryAdminMessageRepository;
pub use skills::InMemorySkillRepository;
pub use swaps::InMemorySwapRepository;
pub use users::InMemoryUserRepository;

/// Raised when a previous holder of the lock panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("in-memory store lock poisoned")]
pub(crate) struct PoisonedStore;

/// Keyed entity storage shared by the in-memory adapters.
#[derive(Debug)]
pub(crate) struct Store<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for Store<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Run `f` with exclusive access to the map.
    pub(crate) fn with<R>(
        &self,
        f: impl FnOnce(&mut HashMap<K, V>) -> R,
    ) -> Result<R, PoisonedStore> {
        let mut guard = self.entries.lock().map_err(|_| PoisonedStore)?;
        Ok(f(&mut guard))
    }

    /// Clone every value accepted by `keep`.
    pub(crate) fn collect(&self, keep: impl Fn(&V) -> bool) -> Result<Vec<V>, PoisonedStore> {
        self.with(|entries| entries.values().filter(|value| keep(value)).cloned().collect())
    }
}

/// Sort newest first, breaking creation-time ties by descending id so that
/// paging is stable.
pub(crate) fn newest_first<T, K: Ord>(items: &mut [T], key: impl Fn(&T) -> K) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
