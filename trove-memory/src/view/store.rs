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

use hashbrown::DefaultHashBuilder;
use trove_common::error::{Error, Result};

use super::{name_matches, CacheView, KeyedCacheView, LockedIter, NameFn};
use crate::store::Store;

/// Unordered view over a [`Store`].
///
/// Single-pass operations run under the store's read lock and never copy.
pub struct StoreView<K, V, S = DefaultHashBuilder> {
    store: Store<K, V, S>,
    name: Option<NameFn<V>>,
}

impl<K, V, S> Debug for StoreView<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreView")
            .field("store", &self.store)
            .field("named", &self.name.is_some())
            .finish()
    }
}

impl<K, V, S> Clone for StoreView<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name.clone(),
        }
    }
}

impl<K, V, S> StoreView<K, V, S> {
    /// Create a view over the store without a name extractor.
    pub fn new(store: Store<K, V, S>) -> Self {
        Self { store, name: None }
    }

    /// Set the name extractor used by [`CacheView::elements_by_name`].
    pub fn with_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&V) -> &str + Send + Sync + 'static,
    {
        self.name = Some(Arc::new(f));
        self
    }
}

impl<K, V, S> CacheView for StoreView<K, V, S>
where
    K: Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    type Item = V;

    fn len(&self) -> usize {
        self.store.len()
    }

    fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn to_vec(&self) -> Vec<V> {
        self.store.read().values().cloned().collect()
    }

    fn elements_by_name(&self, name: &str, ignore_case: bool) -> Result<Vec<V>> {
        let extract = self
            .name
            .as_ref()
            .ok_or_else(|| Error::unsupported("view has no name extractor"))?;
        let guard = self.store.read();
        let matched = guard
            .values()
            .filter(|v| name_matches(extract(*v), name, ignore_case))
            .cloned()
            .collect();
        Ok(matched)
    }

    fn locked_iter(&self) -> LockedIter<V> {
        LockedIter::guarded(self.store.read_owned())
    }

    fn for_each_unordered(&self, f: &mut dyn FnMut(&V)) {
        let guard = self.store.read();
        for v in guard.values() {
            f(v);
        }
    }
}

impl<K, V, S> KeyedCacheView for StoreView<K, V, S>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    type Key = K;

    fn get(&self, key: &K) -> Option<V> {
        self.store.get(key)
    }
}
