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
    cmp::Ordering,
    fmt::Debug,
    hash::{BuildHasher, Hash},
    sync::Arc,
};

use hashbrown::DefaultHashBuilder;
use trove_common::error::Result;

use super::{CacheView, CompareFn, KeyedCacheView, LockedIter, StoreView};
use crate::store::Store;

/// View over a [`Store`] that yields items in a stable order.
///
/// Ordered operations (`to_vec`, `for_each`, `iter`, `elements_by_name`) take a sorted copy first and run without
/// holding the store lock afterwards. `for_each_unordered` and `locked_iter` skip the copy and the sort.
pub struct SortedView<K, V, S = DefaultHashBuilder> {
    view: StoreView<K, V, S>,
    compare: CompareFn<V>,
}

impl<K, V, S> Debug for SortedView<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedView").field("view", &self.view).finish()
    }
}

impl<K, V, S> Clone for SortedView<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            compare: self.compare.clone(),
        }
    }
}

impl<K, V, S> SortedView<K, V, S> {
    /// Create a sorted view ordered by `compare`.
    pub fn new<F>(store: Store<K, V, S>, compare: F) -> Self
    where
        F: Fn(&V, &V) -> Ordering + Send + Sync + 'static,
    {
        Self {
            view: StoreView::new(store),
            compare: Arc::new(compare),
        }
    }

    /// Create a sorted view using the natural order of the items.
    pub fn natural(store: Store<K, V, S>) -> Self
    where
        V: Ord + 'static,
    {
        Self::new(store, V::cmp)
    }

    /// Set the name extractor used by [`CacheView::elements_by_name`].
    pub fn with_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&V) -> &str + Send + Sync + 'static,
    {
        self.view = self.view.with_name(f);
        self
    }

    fn sort(&self, items: &mut [V]) {
        items.sort_by(|a, b| (self.compare)(a, b));
    }
}

impl<K, V, S> CacheView for SortedView<K, V, S>
where
    K: Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    type Item = V;

    fn len(&self) -> usize {
        self.view.len()
    }

    fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    fn to_vec(&self) -> Vec<V> {
        let mut items = self.view.to_vec();
        self.sort(&mut items);
        items
    }

    fn elements_by_name(&self, name: &str, ignore_case: bool) -> Result<Vec<V>> {
        let mut items = self.view.elements_by_name(name, ignore_case)?;
        self.sort(&mut items);
        Ok(items)
    }

    fn locked_iter(&self) -> LockedIter<V> {
        self.view.locked_iter()
    }

    fn for_each_unordered(&self, f: &mut dyn FnMut(&V)) {
        self.view.for_each_unordered(f)
    }

    fn for_each(&self, f: &mut dyn FnMut(&V)) {
        for item in self.to_vec().iter() {
            f(item);
        }
    }

    fn iter(&self) -> LockedIter<V> {
        LockedIter::new(self.to_vec().into_iter())
    }
}

impl<K, V, S> KeyedCacheView for SortedView<K, V, S>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    type Key = K;

    fn get(&self, key: &K) -> Option<V> {
        self.view.get(key)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Role {
        id: u64,
        position: u32,
        name: String,
    }

    fn roles() -> Store<u64, Role> {
        let store = Store::new();
        for (id, position, name) in [(10, 3, "admin"), (11, 1, "member"), (12, 2, "mod"), (13, 0, "Member")] {
            store.insert(
                id,
                Role {
                    id,
                    position,
                    name: name.to_string(),
                },
            );
        }
        store
    }

    fn by_position() -> SortedView<u64, Role> {
        SortedView::new(roles(), |a: &Role, b: &Role| b.position.cmp(&a.position))
            .with_name(|r: &Role| r.name.as_str())
    }

    #[test]
    fn test_ordered_operations() {
        let view = by_position();
        let expected = vec![10, 12, 11, 13];

        assert_eq!(view.to_vec().into_iter().map(|r| r.id).collect_vec(), expected);
        assert_eq!(view.iter().map(|r| r.id).collect_vec(), expected);

        let mut visited = vec![];
        view.for_each(&mut |r| visited.push(r.id));
        assert_eq!(visited, expected);

        let members = view.elements_by_name("member", true).unwrap();
        assert_eq!(members.into_iter().map(|r| r.id).collect_vec(), vec![11, 13]);

        assert_eq!(view.get(&12).map(|r| r.position), Some(2));
    }

    #[test]
    fn test_unordered_operations_skip_sort() {
        let view = by_position();

        let mut visited = vec![];
        view.for_each_unordered(&mut |r| visited.push(r.id));
        assert_eq!(visited.into_iter().sorted().collect_vec(), vec![10, 11, 12, 13]);

        assert_eq!(view.locked_iter().count(), 4);
    }

    #[test]
    fn test_natural_order() {
        let store: Store<u64, u64> = Store::new();
        for i in [5, 3, 9, 1] {
            store.insert(i, i);
        }
        let view = SortedView::natural(store.clone());
        assert_eq!(view.to_vec(), vec![1, 3, 5, 9]);

        store.insert(4, 4);
        assert_eq!(view.iter().collect_vec(), vec![1, 3, 4, 5, 9]);
    }

    #[test]
    fn test_sorted_copy_is_detached() {
        let store: Store<u64, u64> = Store::new();
        for i in 0..8 {
            store.insert(i, i);
        }
        let view = SortedView::natural(store.clone());

        let mut iter = view.iter();
        assert_eq!(iter.next(), Some(0));
        // The copy holds no lock, so the writer proceeds while the iterator is alive.
        store.insert(100, 100);
        assert_eq!(iter.collect_vec(), (1..8).collect_vec());
    }
}
