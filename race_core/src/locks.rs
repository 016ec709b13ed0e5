// keyed logical mutexes for per-resource serialization

use dashmap::DashMap;
use std::{hash::Hash, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-memory registry of lightweight async mutexes, one per key, created on
/// first use. Time events of the same `(race_id, timing_point)` and
/// generation commands of the same event serialize on these; disjoint keys
/// proceed in parallel.
pub struct KeyedLocks<K: Eq + Hash + Clone> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        KeyedLocks {
            locks: DashMap::new(),
        }
    }

    /// Acquire the mutex for `key`, creating it on first use. The guard is
    /// owned, so it can be held across await points and is released on drop
    /// before the HTTP response leaves the handler.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn same_key_serializes_critical_sections() {
        let locks = Arc::new(KeyedLocks::new());
        let in_section = Arc::new(AtomicU32::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_section = in_section.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("race-1").await;
                assert_eq!(in_section.fetch_add(1, Ordering::SeqCst), 0);
                tokio::task::yield_now().await;
                assert_eq!(in_section.fetch_sub(1, Ordering::SeqCst), 1);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn disjoint_keys_do_not_block_each_other() {
        let locks = KeyedLocks::new();
        let _a = locks.lock(("race-1", "Finish")).await;
        // must not deadlock
        let _b = locks.lock(("race-2", "Finish")).await;
    }
}
