//! Per-key async mutexes
//!
//! Serializes writers of one aggregate (e.g. a KYC entry keyed by
//! `(auth_session_id, user_id)`) while unrelated keys proceed in parallel.
//! A key's entry lives only while someone holds or waits on it.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub struct KeyedLocks<K>
where
    K: Eq + Hash,
{
    locks: DashMap<K, Arc<Mutex<()>>>,
}

/// Exclusive access to one key. Dropping it releases the key and evicts
/// the entry when nobody else is queued on it.
pub struct KeyedGuard<'a, K>
where
    K: Eq + Hash,
{
    locks: &'a DashMap<K, Arc<Mutex<()>>>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> Drop for KeyedGuard<'_, K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        // The owned guard holds a clone of the Arc; release it first so only
        // the map's reference is left when no waiter has cloned one.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        // Clone the Arc out so the shard guard is released before awaiting.
        let mutex = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        KeyedGuard {
            locks: &self.locks,
            key,
            guard: Some(guard),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
