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

use std::{fmt::Debug, sync::Arc};

use trove_common::error::Result;

use super::{CacheView, KeyedCacheView, LockedIter};

type ViewSupplier<VW> = Arc<dyn Fn() -> Vec<Arc<VW>> + Send + Sync + 'static>;

/// A projection spanning several underlying views without merging their stores.
///
/// The set of underlying views is produced by a supplier on every call, so a unified view follows shards being
/// added or removed. Every operation is applied to each underlying view and the results are combined.
pub struct UnifiedView<VW: ?Sized> {
    views: ViewSupplier<VW>,
}

impl<VW: ?Sized> Debug for UnifiedView<VW> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiedView").finish_non_exhaustive()
    }
}

impl<VW: ?Sized> Clone for UnifiedView<VW> {
    fn clone(&self) -> Self {
        Self {
            views: self.views.clone(),
        }
    }
}

impl<VW: ?Sized> UnifiedView<VW> {
    /// Create a unified view over the views returned by `supplier` at the time of each call.
    pub fn from_fn<F>(supplier: F) -> Self
    where
        F: Fn() -> Vec<Arc<VW>> + Send + Sync + 'static,
    {
        Self {
            views: Arc::new(supplier),
        }
    }

    /// Create a unified view over a fixed set of views.
    pub fn new(views: Vec<Arc<VW>>) -> Self
    where
        VW: Send + Sync + 'static,
    {
        Self::from_fn(move || views.clone())
    }

    fn views(&self) -> Vec<Arc<VW>> {
        (self.views)()
    }
}

impl<VW> CacheView for UnifiedView<VW>
where
    VW: CacheView + ?Sized + 'static,
{
    type Item = VW::Item;

    fn len(&self) -> usize {
        self.views().iter().map(|v| v.len()).sum()
    }

    fn is_empty(&self) -> bool {
        self.views().iter().all(|v| v.is_empty())
    }

    fn to_vec(&self) -> Vec<Self::Item> {
        self.views().iter().flat_map(|v| v.to_vec()).collect()
    }

    fn elements_by_name(&self, name: &str, ignore_case: bool) -> Result<Vec<Self::Item>> {
        let mut matched = vec![];
        for view in self.views() {
            matched.extend(view.elements_by_name(name, ignore_case)?);
        }
        Ok(matched)
    }

    /// Chains the locked iterators of the underlying views.
    ///
    /// Each underlying lock is acquired when its view is reached and released once that view is exhausted, so at
    /// most one store is locked at a time.
    fn locked_iter(&self) -> LockedIter<Self::Item> {
        LockedIter::new(self.views().into_iter().flat_map(|v| v.locked_iter()))
    }

    fn for_each_unordered(&self, f: &mut dyn FnMut(&Self::Item)) {
        for view in self.views() {
            view.for_each_unordered(f);
        }
    }

    fn for_each(&self, f: &mut dyn FnMut(&Self::Item)) {
        for view in self.views() {
            view.for_each(f);
        }
    }

    fn iter(&self) -> LockedIter<Self::Item> {
        LockedIter::new(self.views().into_iter().flat_map(|v| v.iter()))
    }
}

impl<VW> KeyedCacheView for UnifiedView<VW>
where
    VW: KeyedCacheView + ?Sized + 'static,
{
    type Key = VW::Key;

    /// Returns the first hit in supplier order.
    fn get(&self, key: &Self::Key) -> Option<Self::Item> {
        self.views().iter().find_map(|v| v.get(key))
    }
}

/// A unified view over per-guild member views.
///
/// The same user is a member of many guilds, so lookups by key return every hit instead of the first one.
pub struct UnifiedMemberView<K, T> {
    inner: UnifiedView<dyn KeyedCacheView<Key = K, Item = T>>,
}

impl<K, T> Debug for UnifiedMemberView<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiedMemberView").finish_non_exhaustive()
    }
}

impl<K, T> Clone for UnifiedMemberView<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, T> UnifiedMemberView<K, T>
where
    K: 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create a unified member view over the views returned by `supplier` at the time of each call.
    pub fn from_fn<F>(supplier: F) -> Self
    where
        F: Fn() -> Vec<Arc<dyn KeyedCacheView<Key = K, Item = T>>> + Send + Sync + 'static,
    {
        Self {
            inner: UnifiedView::from_fn(supplier),
        }
    }

    /// Collect the item stored under `key` in every underlying view.
    pub fn get_all(&self, key: &K) -> Vec<T> {
        self.inner.views().iter().filter_map(|v| v.get(key)).collect()
    }
}

impl<K, T> CacheView for UnifiedMemberView<K, T>
where
    K: 'static,
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn to_vec(&self) -> Vec<T> {
        self.inner.to_vec()
    }

    fn elements_by_name(&self, name: &str, ignore_case: bool) -> Result<Vec<T>> {
        self.inner.elements_by_name(name, ignore_case)
    }

    fn locked_iter(&self) -> LockedIter<T> {
        self.inner.locked_iter()
    }

    fn for_each_unordered(&self, f: &mut dyn FnMut(&T)) {
        self.inner.for_each_unordered(f)
    }

    fn for_each(&self, f: &mut dyn FnMut(&T)) {
        self.inner.for_each(f)
    }

    fn iter(&self) -> LockedIter<T> {
        self.inner.iter()
    }
}

/// Combine views of the same item type into one.
pub fn all<T>(views: Vec<Arc<dyn CacheView<Item = T>>>) -> UnifiedView<dyn CacheView<Item = T>>
where
    T: Clone + Send + Sync + 'static,
{
    UnifiedView::new(views)
}

/// Combine keyed views (for example, per-shard guild caches) into one keyed view.
pub fn all_snowflakes<K, T>(
    views: Vec<Arc<dyn KeyedCacheView<Key = K, Item = T>>>,
) -> UnifiedView<dyn KeyedCacheView<Key = K, Item = T>>
where
    K: 'static,
    T: Clone + Send + Sync + 'static,
{
    UnifiedView::new(views)
}

/// Combine per-guild member views into one member view.
pub fn all_members<K, T>(views: Vec<Arc<dyn KeyedCacheView<Key = K, Item = T>>>) -> UnifiedMemberView<K, T>
where
    K: 'static,
    T: Clone + Send + Sync + 'static,
{
    UnifiedMemberView::from_fn(move || views.clone())
}
