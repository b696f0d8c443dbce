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

use std::{cmp::Ordering, fmt::Debug, hash::Hash, sync::Arc};

use equivalent::Equivalent;
use parking_lot::Mutex;
use trove_common::error::Result;

use crate::{
    eviction::{lru::LruPolicy, EvictionPolicy},
    store::Store,
    view::{SortedView, StoreView},
};

/// A cache owning a [`Store`] whose content is governed by an [`EvictionPolicy`] on its keys.
///
/// The cache is the single writer of its store. Views created from it observe every later mutation.
pub struct Cache<K, V> {
    store: Store<K, V>,
    policy: Arc<dyn EvictionPolicy<K>>,
    /// Serializes consulting the policy with storing the entry.
    admission: Arc<Mutex<()>>,
}

impl<K, V> Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("store", &self.store).finish()
    }
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            policy: self.policy.clone(),
            admission: self.admission.clone(),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Create a cache governed by `policy`.
    pub fn new<P>(policy: P) -> Self
    where
        P: EvictionPolicy<K>,
    {
        Self {
            store: Store::new(),
            policy: Arc::new(policy),
            admission: Arc::new(Mutex::new(())),
        }
    }

    /// Create a cache bounded by an [`LruPolicy`] of `max_items`.
    ///
    /// Keys evicted by the lru policy are removed from the store unless `sub_policy` retains them.
    pub fn with_lru<P>(max_items: usize, sub_policy: P) -> Result<Self>
    where
        P: EvictionPolicy<K>,
    {
        let store = Store::new();
        let policy = LruPolicy::new(max_items)?.unload_unless(sub_policy).with_listener({
            let store = store.clone();
            move |key: K| {
                if store.remove(&key).is_some() {
                    tracing::debug!("[cache]: unloaded evicted entry");
                }
            }
        });
        Ok(Self {
            store,
            policy: Arc::new(policy),
            admission: Arc::new(Mutex::new(())),
        })
    }

    /// Insert an entry if the policy retains its key.
    ///
    /// Returns `true` if the entry was stored. Inserts are serialized, so an entry evicted by a concurrent insert is
    /// never stored after its eviction. The policy is consulted before the store lock is taken, so eviction
    /// listeners may write to the store.
    pub fn insert(&self, key: K, value: V) -> bool {
        let _admission = self.admission.lock();
        if !self.policy.cache_item(&key) {
            tracing::trace!("[cache]: entry rejected by policy");
            return false;
        }
        self.store.insert(key, value);
        true
    }

    /// Remove an entry.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.store.remove(key)
    }

    /// Clone the value stored for the key.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
        V: Clone,
    {
        self.store.get(key)
    }

    /// Returns `true` if the cache holds an entry for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.store.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove all entries. The policy keeps its bookkeeping.
    pub fn clear(&self) {
        self.store.clear()
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<K, V> {
        &self.store
    }

    /// An unordered view over the cached values.
    pub fn view(&self) -> StoreView<K, V> {
        StoreView::new(self.store.clone())
    }

    /// A view over the cached values ordered by `compare`.
    pub fn sorted_view<F>(&self, compare: F) -> SortedView<K, V>
    where
        F: Fn(&V, &V) -> Ordering + Send + Sync + 'static,
    {
        SortedView::new(self.store.clone(), compare)
    }
}
