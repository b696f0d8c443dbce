// Copyright 2026 trove Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    fmt::Debug,
    hash::{BuildHasher, Hash},
    sync::Arc,
};

use equivalent::Equivalent;
use hashbrown::{DefaultHashBuilder, HashMap};
use parking_lot::{lock_api::ArcRwLockReadGuard, RawRwLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Owned read guard over the map of a [`Store`].
pub type StoreReadGuard<K, V, S> = ArcRwLockReadGuard<RawRwLock, HashMap<K, V, S>>;

/// A shared key-value store guarded by a reader-writer lock.
///
/// The store is written by a single external owner and read by any number of cache views. Cloning a store
/// clones the handle, not the entries.
pub struct Store<K, V, S = DefaultHashBuilder> {
    inner: Arc<RwLock<HashMap<K, V, S>>>,
}

impl<K, V, S> Debug for Store<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl<K, V, S> Clone for Store<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Default for Store<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Store<K, V> {
    /// Create an empty store with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> Store<K, V, S> {
    /// Create an empty store with the given hash builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::with_hasher(hash_builder))),
        }
    }

    /// Number of entries. Takes the read lock for the duration of the call only.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Acquire a scoped read lock over the entries.
    ///
    /// Writers are blocked until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V, S>> {
        self.inner.read()
    }

    /// Acquire an owned read lock over the entries.
    ///
    /// Unlike [`Store::read`], the guard keeps the store alive and is not tied to the borrow of `self`.
    pub fn read_owned(&self) -> StoreReadGuard<K, V, S> {
        self.inner.read_arc()
    }

    /// Acquire the write lock. Only the owner of the store is supposed to call this.
    pub fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V, S>> {
        self.inner.write()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<K, V, S> Store<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Insert an entry, returning the replaced value if any.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    /// Remove an entry by key.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.write().remove(key)
    }

    /// Returns `true` if the store holds an entry for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    /// Clone the value stored for the key.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Copy all entries out of the store under a single read lock.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.inner
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_store_basic() {
        let store: Store<u64, String> = Store::new();
        assert!(store.is_empty());

        assert_eq!(store.insert(1, "alice".to_string()), None);
        assert_eq!(store.insert(2, "bob".to_string()), None);
        assert_eq!(store.insert(1, "carol".to_string()), Some("alice".to_string()));
        assert_eq!(store.len(), 2);
        assert!(store.contains_key(&2));
        assert_eq!(store.get(&1).as_deref(), Some("carol"));

        assert_eq!(store.remove(&2), Some("bob".to_string()));
        assert!(!store.contains_key(&2));

        let handle = store.clone();
        handle.insert(3, "dave".to_string());
        let snapshot = store.snapshot().into_iter().sorted().collect_vec();
        assert_eq!(snapshot, vec![(1, "carol".to_string()), (3, "dave".to_string())]);

        store.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_owned_guard_outlives_handle() {
        let store: Store<u64, u64> = Store::new();
        store.insert(1, 1);
        let guard = {
            let handle = store.clone();
            handle.read_owned()
        };
        assert_eq!(guard.get(&1), Some(&1));
        assert!(store.inner.try_write().is_none());
        drop(guard);
        assert!(store.inner.try_write().is_some());
    }
}
