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

//! Read-only views over live, externally mutated stores.
//!
//! A view never copies for `len`/`is_empty`, copies once for listings (`to_vec`, `to_set`), and offers
//! lock-held iteration through [`LockedIter`] for everything in between.
//!
//! Any operation that runs under a read lock of a store blocks the store's writer for its duration. Callbacks
//! passed to [`CacheView::for_each_unordered`] and consumers of [`LockedIter`] must not block, and must not write
//! to the store they are reading.

use std::{cmp::Ordering, hash::Hash, sync::Arc};

use hashbrown::HashSet;
use rayon::iter::{IterBridge, ParallelBridge};
use trove_common::error::Result;

mod locked;
mod sorted;
mod store;
mod unified;

pub use locked::LockedIter;
pub use sorted::SortedView;
pub use store::StoreView;
pub use unified::{all, all_members, all_snowflakes, UnifiedMemberView, UnifiedView};

/// Extracts the name used by [`CacheView::elements_by_name`] from an item.
pub type NameFn<V> = Arc<dyn Fn(&V) -> &str + Send + Sync + 'static>;

/// Total order used by [`SortedView`].
pub type CompareFn<V> = Arc<dyn Fn(&V, &V) -> Ordering + Send + Sync + 'static>;

/// A read-oriented, concurrency-safe view over a live collection of items.
pub trait CacheView: Send + Sync {
    /// Item type yielded by the view.
    type Item: Clone + Send + Sync + 'static;

    /// Number of items currently visible, without copying.
    fn len(&self) -> usize;

    /// Returns `true` if the view holds no items, without copying.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy all items into a freshly allocated list.
    fn to_vec(&self) -> Vec<Self::Item>;

    /// Collect every item whose name equals `name`.
    ///
    /// Returns an [`ErrorKind::Unsupported`](trove_common::error::ErrorKind::Unsupported) error if the view has no
    /// name extractor.
    fn elements_by_name(&self, name: &str, ignore_case: bool) -> Result<Vec<Self::Item>>;

    /// Iterate the live structure while holding its read lock.
    ///
    /// No particular order is guaranteed. The lock is released when the iterator is dropped.
    fn locked_iter(&self) -> LockedIter<Self::Item>;

    /// Apply `f` to each item in no particular order, without taking a copy.
    fn for_each_unordered(&self, f: &mut dyn FnMut(&Self::Item)) {
        for item in self.locked_iter() {
            f(&item);
        }
    }

    /// Apply `f` to each item in the view's order.
    ///
    /// Unordered views delegate to [`CacheView::for_each_unordered`].
    fn for_each(&self, f: &mut dyn FnMut(&Self::Item)) {
        self.for_each_unordered(f)
    }

    /// Iterate the items in the view's order.
    fn iter(&self) -> LockedIter<Self::Item> {
        self.locked_iter()
    }
}

/// A cache view that supports direct lookup by key, such as a snowflake id.
pub trait KeyedCacheView: CacheView {
    /// Lookup key type.
    type Key;

    /// Lookup a single item by key.
    fn get(&self, key: &Self::Key) -> Option<Self::Item>;
}

/// Extension methods available on every [`CacheView`].
pub trait CacheViewExt: CacheView {
    /// Copy all items into a freshly allocated set.
    fn to_set(&self) -> HashSet<Self::Item>
    where
        Self::Item: Hash + Eq,
    {
        self.iter().collect()
    }

    /// Iterate the items with rayon.
    ///
    /// Only the processing is parallel. Items are produced by [`CacheView::iter`], so the locks it holds are held
    /// until the parallel iterator is fully consumed.
    fn par_iter(&self) -> IterBridge<LockedIter<Self::Item>> {
        self.iter().par_bridge()
    }
}

impl<V> CacheViewExt for V where V: CacheView + ?Sized {}

pub(crate) fn name_matches(candidate: &str, name: &str, ignore_case: bool) -> bool {
    if ignore_case {
        candidate
            .chars()
            .flat_map(char::to_lowercase)
            .eq(name.chars().flat_map(char::to_lowercase))
    } else {
        candidate == name
    }
}
