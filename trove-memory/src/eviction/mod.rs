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

//! Eviction policies deciding which items a cache keeps.

use std::{fmt::Debug, sync::Arc};

pub mod lru;

/// Decides whether an item should be kept by its cache.
pub trait EvictionPolicy<T: ?Sized>: Send + Sync + 'static {
    /// Returns `true` if the item should be retained.
    ///
    /// Called by the owning cache every time it wants an access or insertion tracked.
    fn cache_item(&self, item: &T) -> bool;
}

impl<T, F> EvictionPolicy<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn cache_item(&self, item: &T) -> bool {
        self(item)
    }
}

/// Receives the items a policy has decided to evict.
///
/// The owning cache is expected to remove the item from its own storage and run any unload side effects. Failures
/// of those side effects are the owner's concern.
pub trait EvictionListener<T>: Send + Sync + 'static {
    /// Called once per evicted item, never while the policy holds its internal lock.
    fn on_evict(&self, item: T);
}

impl<T, F> EvictionListener<T> for F
where
    F: Fn(T) + Send + Sync + 'static,
{
    fn on_evict(&self, item: T) {
        self(item)
    }
}

/// Combinators available on every [`EvictionPolicy`].
pub trait EvictionPolicyExt<T: ?Sized>: EvictionPolicy<T> {
    /// Retain an item if either policy retains it.
    ///
    /// Both policies are consulted so stateful policies keep tracking every item.
    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: EvictionPolicy<T>,
    {
        Or { a: self, b: other }
    }

    /// Retain an item only if both policies retain it.
    ///
    /// Both policies are consulted so stateful policies keep tracking every item.
    fn and<P>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
        P: EvictionPolicy<T>,
    {
        And { a: self, b: other }
    }
}

impl<T, P> EvictionPolicyExt<T> for P
where
    T: ?Sized,
    P: EvictionPolicy<T>,
{
}

/// See [`EvictionPolicyExt::or`].
#[derive(Debug, Clone)]
pub struct Or<A, B> {
    a: A,
    b: B,
}

impl<T, A, B> EvictionPolicy<T> for Or<A, B>
where
    T: ?Sized,
    A: EvictionPolicy<T>,
    B: EvictionPolicy<T>,
{
    fn cache_item(&self, item: &T) -> bool {
        let a = self.a.cache_item(item);
        let b = self.b.cache_item(item);
        a || b
    }
}

/// See [`EvictionPolicyExt::and`].
#[derive(Debug, Clone)]
pub struct And<A, B> {
    a: A,
    b: B,
}

impl<T, A, B> EvictionPolicy<T> for And<A, B>
where
    T: ?Sized,
    A: EvictionPolicy<T>,
    B: EvictionPolicy<T>,
{
    fn cache_item(&self, item: &T) -> bool {
        let a = self.a.cache_item(item);
        let b = self.b.cache_item(item);
        a && b
    }
}

/// Retains an item if any of the policies retains it. See [`any`].
pub struct Any<T: ?Sized> {
    policies: Vec<Arc<dyn EvictionPolicy<T>>>,
}

impl<T: ?Sized> Debug for Any<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Any").field("policies", &self.policies.len()).finish()
    }
}

impl<T: ?Sized + 'static> EvictionPolicy<T> for Any<T> {
    fn cache_item(&self, item: &T) -> bool {
        self.policies
            .iter()
            .fold(false, |retain, policy| policy.cache_item(item) || retain)
    }
}

/// Retains an item only if all of the policies retain it. See [`all`].
pub struct All<T: ?Sized> {
    policies: Vec<Arc<dyn EvictionPolicy<T>>>,
}

impl<T: ?Sized> Debug for All<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("All").field("policies", &self.policies.len()).finish()
    }
}

impl<T: ?Sized + 'static> EvictionPolicy<T> for All<T> {
    fn cache_item(&self, item: &T) -> bool {
        self.policies
            .iter()
            .fold(true, |retain, policy| policy.cache_item(item) && retain)
    }
}

/// Combine policies: an item is retained if any of them retains it.
///
/// An empty list retains nothing.
pub fn any<T: ?Sized>(policies: Vec<Arc<dyn EvictionPolicy<T>>>) -> Any<T> {
    Any { policies }
}

/// Combine policies: an item is retained only if all of them retain it.
///
/// An empty list retains everything.
pub fn all<T: ?Sized>(policies: Vec<Arc<dyn EvictionPolicy<T>>>) -> All<T> {
    All { policies }
}

/// Retains every item.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainAll;

impl<T: ?Sized> EvictionPolicy<T> for RetainAll {
    fn cache_item(&self, _: &T) -> bool {
        true
    }
}

/// Retains no item.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainNone;

impl<T: ?Sized> EvictionPolicy<T> for RetainNone {
    fn cache_item(&self, _: &T) -> bool {
        false
    }
}

/// A policy that retains every item.
pub fn retain_all() -> RetainAll {
    RetainAll
}

/// A policy that retains no item.
pub fn retain_none() -> RetainNone {
    RetainNone
}
