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

use std::fmt::Debug;

use hashbrown::{hash_map::Values, HashMap};

use crate::store::StoreReadGuard;

/// A scoped iteration handle.
///
/// Depending on the view it came from, the handle either holds the read lock(s) of the underlying store(s) or
/// iterates over a private copy. Locks are released when the handle is dropped, on every exit path including
/// unwinding.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LockedIter<T> {
    inner: Box<dyn Iterator<Item = T> + Send>,
}

impl<T> Debug for LockedIter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedIter").finish_non_exhaustive()
    }
}

impl<T> LockedIter<T> {
    pub(crate) fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = T> + Send + 'static,
    {
        Self { inner: Box::new(iter) }
    }

    /// Iterate the values of a store while holding its read lock.
    pub(crate) fn guarded<K, S>(guard: StoreReadGuard<K, T, S>) -> Self
    where
        K: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
        S: Send + Sync + 'static,
    {
        Self::new(GuardedValues::new(guard))
    }
}

impl<T> Iterator for LockedIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Clones the values of a read-locked map one at a time.
struct GuardedValues<K, V, S>
where
    K: 'static,
    V: 'static,
    S: 'static,
{
    // Declared before `guard`: `values` borrows the map the guard protects and must be dropped first.
    values: Values<'static, K, V>,
    _guard: StoreReadGuard<K, V, S>,
}

impl<K, V, S> GuardedValues<K, V, S>
where
    K: 'static,
    V: 'static,
    S: 'static,
{
    fn new(guard: StoreReadGuard<K, V, S>) -> Self {
        // Safety: The map lives inside the `Arc` owned by `guard`, so its address is stable for as long as the guard
        // exists, and the read lock held by the guard rules out mutation. `values` never escapes this struct and is
        // dropped before the guard.
        let map: &'static HashMap<K, V, S> = unsafe { &*(&*guard as *const HashMap<K, V, S>) };
        Self {
            values: map.values(),
            _guard: guard,
        }
    }
}

impl<K, V, S> Iterator for GuardedValues<K, V, S>
where
    V: Clone,
{
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.values.next().cloned()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}
