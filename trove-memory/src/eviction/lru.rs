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

use std::{collections::VecDeque, fmt::Debug, hash::Hash, sync::Arc};

use hashbrown::HashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use trove_common::error::{Error, Result};

use super::{EvictionListener, EvictionPolicy, RetainNone};

/// Lru eviction policy config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LruConfig {
    /// The number of distinct items the policy works towards.
    ///
    /// Items retained by the sub-policy are dropped from tracking without being evicted, so a cache may hold more
    /// than `max_items` items. Must be greater than 0.
    pub max_items: usize,
}

impl Default for LruConfig {
    fn default() -> Self {
        Self { max_items: 1000 }
    }
}

/// Bookkeeping guarded by the policy mutex.
///
/// Every tracked item has exactly `counters[item]` references pending in `queue`.
#[derive(Debug)]
struct LruState<T> {
    counters: HashMap<T, usize>,
    queue: VecDeque<T>,
}

impl<T> LruState<T>
where
    T: Hash + Eq + Clone,
{
    fn touch(&mut self, item: &T) {
        *self.counters.entry(item.clone()).or_insert(0) += 1;
        self.queue.push_back(item.clone());
    }

    /// Drop the oldest references until at most `max_items` distinct items are tracked.
    ///
    /// Returns the items whose last reference was dropped.
    fn evict_oldest(&mut self, max_items: usize) -> Vec<T> {
        let mut stale = vec![];
        while self.counters.len() > max_items {
            let Some(head) = self.queue.pop_front() else {
                break;
            };
            match self.counters.get_mut(&head) {
                Some(count) if *count > 1 => *count -= 1,
                Some(_) => {
                    self.counters.remove(&head);
                    stale.push(head);
                }
                None => {}
            }
        }
        stale
    }

    /// Collapse duplicate references at the head of the queue.
    fn trim(&mut self) {
        while let Some(head) = self.queue.front() {
            match self.counters.get_mut(head) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    self.queue.pop_front();
                }
                _ => break,
            }
        }
    }
}

/// Approximate lru eviction policy.
///
/// Recency is tracked with a counting queue: every touch enqueues one more reference to the item, and the stale
/// references of re-touched items are collapsed lazily. The policy only decides; evicted items are handed to the
/// [`EvictionListener`], which unloads them from the owning cache.
pub struct LruPolicy<T> {
    state: Mutex<LruState<T>>,
    max_items: usize,
    sub_policy: Arc<dyn EvictionPolicy<T>>,
    listener: Option<Arc<dyn EvictionListener<T>>>,
}

impl<T> Debug for LruPolicy<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruPolicy")
            .field("state", &self.state)
            .field("max_items", &self.max_items)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<T> LruPolicy<T>
where
    T: Hash + Eq + Clone + Send + Sync + 'static,
{
    /// Create an lru policy tracking at most `max_items` distinct items.
    pub fn new(max_items: usize) -> Result<Self> {
        Self::from_config(&LruConfig { max_items })
    }

    /// Create an lru policy from its config.
    pub fn from_config(config: &LruConfig) -> Result<Self> {
        if config.max_items == 0 {
            return Err(
                Error::invalid_argument("lru policy must track at least one item").with_context("max_items", 0)
            );
        }
        Ok(Self {
            state: Mutex::new(LruState {
                counters: HashMap::new(),
                queue: VecDeque::new(),
            }),
            max_items: config.max_items,
            sub_policy: Arc::new(RetainNone),
            listener: None,
        })
    }

    /// Consult `sub_policy` before evicting an item; items it retains are not evicted.
    pub fn unload_unless<P>(mut self, sub_policy: P) -> Self
    where
        P: EvictionPolicy<T>,
    {
        self.sub_policy = Arc::new(sub_policy);
        self
    }

    /// Set the listener that receives evicted items.
    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: EvictionListener<T>,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// The number of distinct items the policy works towards.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// The number of distinct items currently tracked.
    pub fn tracked(&self) -> usize {
        self.state.lock().counters.len()
    }

    /// The number of references pending in the recency queue.
    pub fn pending_references(&self) -> usize {
        self.state.lock().queue.len()
    }
}

impl<T> EvictionPolicy<T> for LruPolicy<T>
where
    T: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn cache_item(&self, item: &T) -> bool {
        let stale = {
            let mut state = self.state.lock();
            state.touch(item);
            let stale = state.evict_oldest(self.max_items);
            state.trim();
            stale
        };

        for item in stale {
            if self.sub_policy.cache_item(&item) {
                tracing::trace!("[lru]: stale item retained by sub-policy");
                continue;
            }
            tracing::trace!("[lru]: evict stale item");
            if let Some(listener) = self.listener.as_ref() {
                listener.on_evict(item);
            }
        }

        true
    }
}
