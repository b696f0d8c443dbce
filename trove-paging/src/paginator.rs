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
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use futures::{future::BoxFuture, lock::Mutex as AsyncMutex, stream::BoxStream, FutureExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use rayon::iter::{IterBridge, ParallelBridge};
use trove_common::{
    error::{Error, Result},
    spawn::Spawner,
};

use crate::{
    config::{limit_in_bounds, PaginatorBuilder, PaginatorConfig},
    fetcher::{Fetcher, PageRequest, PaginationOrder},
    iter::{Pages, PaginatorIter},
    traversal::{Completion, TraversalHandle},
};

/// Request state shared by the limit setter and the fetch bookkeeping.
struct State<I, C> {
    limit: usize,
    cursor: Option<C>,
    last: Option<I>,
}

pub(crate) struct Inner<F: Fetcher> {
    fetcher: F,
    min_limit: usize,
    max_limit: usize,
    order: PaginationOrder,
    state: Mutex<State<F::Item, F::Cursor>>,
    /// Held from reading the cursor until the cursor and the replay buffer reflect the fetched page.
    fetching: AsyncMutex<()>,
    cached: RwLock<Vec<F::Item>>,
    cache_enabled: AtomicBool,
    spawner: Spawner,
}

impl<F: Fetcher> Inner<F> {
    pub(crate) fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// Page size used by iteration and traversal.
    fn iteration_limit(&self) -> usize {
        match self.max_limit {
            0 => self.state.lock().limit,
            max => max,
        }
    }

    /// Fetch the page after the current cursor with the given page size.
    ///
    /// The cursor and the replay buffer are only updated once the fetch succeeded. At most one fetch is in flight
    /// across all clones of the paginator.
    pub(crate) async fn fetch_page(&self, limit: usize) -> Result<Page<F::Item>> {
        let _fetching = self.fetching.lock().await;
        let cursor = self.state.lock().cursor.clone();
        let request = PageRequest {
            cursor,
            limit,
            order: self.order,
        };
        tracing::trace!(limit, order = ?self.order, "[paginator]: fetch page");

        let records = self.fetcher.fetch(request).await?;
        let received = records.len();

        let mut items = Vec::with_capacity(received);
        for record in records {
            match record {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(error = %e, "[paginator]: skip unparsable record"),
            }
        }

        if let Some(last) = items.last() {
            let cursor = self.fetcher.cursor(last);
            let mut state = self.state.lock();
            state.cursor = Some(cursor);
            state.last = Some(last.clone());
        }
        if !items.is_empty() && self.cache_enabled.load(Ordering::Acquire) {
            self.cached.write().extend(items.iter().cloned());
        }

        // A page without a single parsable record cannot move the cursor, so it ends iteration as well.
        let last = received < limit || items.is_empty();
        tracing::debug!(received, parsed = items.len(), last, "[paginator]: page fetched");
        Ok(Page { items, last })
    }
}

/// A successfully fetched page.
pub(crate) struct Page<I> {
    pub(crate) items: Vec<I>,
    /// The remote returned less than requested: there is nothing after this page.
    pub(crate) last: bool,
}

/// Retrieves an unbounded remote collection page by page.
///
/// Every page continues from the cursor of the last retrieved item. Items retrieved by any consumption style are
/// kept in a replay buffer (unless disabled) that later iterations yield first.
///
/// Blocking operations drive fetches with the paginator's [`Spawner`] and panic when called from within an async
/// execution context, the same as [`Spawner::block_on`]. Use the async counterparts there.
///
/// Cloning a paginator clones the handle; all clones share cursor and replay buffer.
pub struct Paginator<F: Fetcher> {
    inner: Arc<Inner<F>>,
}

impl<F: Fetcher> Clone for Paginator<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: Fetcher> Debug for Paginator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("limit", &self.limit())
            .field("min_limit", &self.inner.min_limit)
            .field("max_limit", &self.inner.max_limit)
            .field("order", &self.inner.order)
            .field("cache_size", &self.cache_size())
            .field("cache_enabled", &self.is_cache_enabled())
            .finish()
    }
}

impl<F: Fetcher> Paginator<F> {
    /// Create a [`PaginatorBuilder`] over `fetcher`.
    pub fn builder(fetcher: F) -> PaginatorBuilder<F> {
        PaginatorBuilder::new(fetcher)
    }

    pub(crate) fn new(fetcher: F, config: PaginatorConfig, spawner: Spawner) -> Self {
        let inner = Inner {
            fetcher,
            min_limit: config.min_limit,
            max_limit: config.max_limit,
            order: config.order,
            state: Mutex::new(State {
                limit: config.initial_limit,
                cursor: None,
                last: None,
            }),
            fetching: AsyncMutex::new(()),
            cached: RwLock::new(vec![]),
            cache_enabled: AtomicBool::new(config.cache_enabled),
            spawner,
        };
        Self { inner: Arc::new(inner) }
    }

    pub(crate) fn inner(&self) -> &Arc<Inner<F>> {
        &self.inner
    }

    /// Set the page size of the next explicit fetch.
    ///
    /// Fails with [`ErrorKind::OutOfRange`](trove_common::error::ErrorKind::OutOfRange) if `limit` is `0` or
    /// violates an enabled bound.
    pub fn set_limit(&self, limit: usize) -> Result<()> {
        if !limit_in_bounds(limit, self.inner.min_limit, self.inner.max_limit) {
            return Err(Error::out_of_range(
                "limit",
                limit,
                self.inner.min_limit,
                self.inner.max_limit,
            ));
        }
        self.inner.state.lock().limit = limit;
        Ok(())
    }

    /// The page size of the next explicit fetch.
    pub fn limit(&self) -> usize {
        self.inner.state.lock().limit
    }

    /// The smallest accepted page size, `0` if unbounded.
    pub fn min_limit(&self) -> usize {
        self.inner.min_limit
    }

    /// The largest accepted page size, `0` if unbounded.
    pub fn max_limit(&self) -> usize {
        self.inner.max_limit
    }

    /// The paging direction.
    pub fn order(&self) -> PaginationOrder {
        self.inner.order
    }

    /// Enable or disable the replay buffer for items retrieved from now on.
    ///
    /// Items already in the buffer are kept.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.inner.cache_enabled.store(enabled, Ordering::Release);
    }

    /// Returns `true` if retrieved items are kept in the replay buffer.
    pub fn is_cache_enabled(&self) -> bool {
        self.inner.cache_enabled.load(Ordering::Acquire)
    }

    /// A snapshot of every item retrieved and buffered so far.
    pub fn cached(&self) -> Vec<F::Item> {
        self.inner.cached.read().clone()
    }

    /// The number of buffered items.
    pub fn cache_size(&self) -> usize {
        self.inner.cached.read().len()
    }

    /// Returns `true` if no item is buffered.
    pub fn is_cache_empty(&self) -> bool {
        self.inner.cached.read().is_empty()
    }

    /// The first buffered item.
    pub fn first(&self) -> Option<F::Item> {
        self.inner.cached.read().first().cloned()
    }

    /// The last buffered item.
    pub fn last(&self) -> Option<F::Item> {
        self.inner.cached.read().last().cloned()
    }

    /// The item the cursor currently points at.
    ///
    /// `None` before the first non-empty page and after [`Paginator::skip_to`].
    pub fn last_retrieved(&self) -> Option<F::Item> {
        self.inner.state.lock().last.clone()
    }

    /// The cursor the next fetch continues from.
    pub fn cursor(&self) -> Option<F::Cursor> {
        self.inner.state.lock().cursor.clone()
    }

    /// Move the cursor, so that successive fetches continue from `cursor`.
    ///
    /// The replay buffer is left untouched.
    pub fn skip_to(&self, cursor: F::Cursor) {
        let mut state = self.inner.state.lock();
        state.cursor = Some(cursor);
        state.last = None;
    }

    /// Fetch the next page with the configured limit.
    ///
    /// Unlike iteration, explicit fetches never consider the remote exhausted; an empty result means there was
    /// nothing after the cursor at the time of the call.
    pub async fn fetch_next(&self) -> Result<Vec<F::Item>> {
        let limit = self.limit();
        let page = self.inner.fetch_page(limit).await?;
        Ok(page.items)
    }

    /// Blocking version of [`Paginator::fetch_next`].
    pub fn fetch_next_blocking(&self) -> Result<Vec<F::Item>> {
        self.inner.spawner.block_on(self.fetch_next())
    }

    /// Blocking iterator over the buffered items followed by the rest of the remote collection.
    ///
    /// The iterator fetches one page of `max_limit` items (or the configured limit if unbounded) each time its
    /// buffer runs dry. It ends after the first page shorter than requested, which includes an empty page. A failed
    /// fetch is yielded once and ends the iteration.
    pub fn iter(&self) -> PaginatorIter<F> {
        PaginatorIter::new(self.clone(), self.cached(), self.inner.iteration_limit())
    }

    /// Parallel iterator over [`Paginator::iter`].
    ///
    /// Only the processing of items is parallel; each fetch depends on the previous cursor, so pages are still
    /// retrieved one after another.
    pub fn par_iter(&self) -> IterBridge<PaginatorIter<F>> {
        self.iter().par_bridge()
    }

    /// Async stream with the same semantics as [`Paginator::iter`].
    pub fn stream(&self) -> BoxStream<'static, Result<F::Item>> {
        Pages::new(self.clone(), self.cached(), self.inner.iteration_limit())
            .into_stream()
            .boxed()
    }

    /// Apply `predicate` to the remote items after the cursor until it returns `false` or the collection ends.
    ///
    /// Buffered items are skipped.
    pub fn for_each_remaining<P>(&self, mut predicate: P) -> Result<Completion>
    where
        P: FnMut(F::Item) -> bool,
    {
        let limit = self.inner.iteration_limit();
        loop {
            let page = self.inner.spawner.block_on(self.inner.fetch_page(limit))?;
            for item in page.items {
                if !predicate(item) {
                    return Ok(Completion::Stopped);
                }
            }
            if page.last {
                return Ok(Completion::Exhausted);
            }
        }
    }

    /// Apply `predicate` to the buffered items and then to the rest of the remote collection, in a spawned task.
    pub fn for_each_async<P>(&self, predicate: P) -> TraversalHandle
    where
        P: FnMut(F::Item) -> bool + Send + 'static,
    {
        TraversalHandle::spawn(self.inner.clone(), self.cached(), self.inner.iteration_limit(), predicate)
    }

    /// Apply `predicate` to the remote items after the cursor, in a spawned task.
    pub fn for_each_remaining_async<P>(&self, predicate: P) -> TraversalHandle
    where
        P: FnMut(F::Item) -> bool + Send + 'static,
    {
        TraversalHandle::spawn(self.inner.clone(), vec![], self.inner.iteration_limit(), predicate)
    }

    /// Collect up to `amount` items, starting with the buffered ones.
    pub fn take_async(&self, amount: usize) -> BoxFuture<'static, Result<Vec<F::Item>>> {
        self.collect_async(true, Some(amount), |_| true)
    }

    /// Collect up to `amount` remote items after the cursor.
    pub fn take_remaining_async(&self, amount: usize) -> BoxFuture<'static, Result<Vec<F::Item>>> {
        self.collect_async(false, Some(amount), |_| true)
    }

    /// Collect items, starting with the buffered ones, for as long as `rule` holds.
    pub fn take_while_async<R>(&self, mut rule: R) -> BoxFuture<'static, Result<Vec<F::Item>>>
    where
        R: FnMut(&F::Item) -> bool + Send + 'static,
    {
        self.collect_async(true, None, move |item| rule(item))
    }

    /// Collect items, starting with the buffered ones, until `rule` holds for an item.
    ///
    /// The matching item is not included.
    pub fn take_until_async<R>(&self, mut rule: R) -> BoxFuture<'static, Result<Vec<F::Item>>>
    where
        R: FnMut(&F::Item) -> bool + Send + 'static,
    {
        self.collect_async(true, None, move |item| !rule(item))
    }

    /// Collect items while `accept` holds, at most `amount` of them.
    fn collect_async<A>(
        &self,
        from_cache: bool,
        amount: Option<usize>,
        mut accept: A,
    ) -> BoxFuture<'static, Result<Vec<F::Item>>>
    where
        A: FnMut(&F::Item) -> bool + Send + 'static,
    {
        if let Some(amount) = amount {
            if amount == 0 {
                return async move { Ok(vec![]) }.boxed();
            }
            if from_cache {
                // The replay buffer alone may satisfy the request.
                let cached = self.inner.cached.read().iter().take(amount).cloned().collect::<Vec<_>>();
                if cached.len() == amount {
                    return async move { Ok(cached) }.boxed();
                }
            }
        }

        let collected = Arc::new(Mutex::new(vec![]));
        let predicate = {
            let collected = collected.clone();
            move |item: F::Item| {
                if !accept(&item) {
                    return false;
                }
                let mut collected = collected.lock();
                collected.push(item);
                amount.is_none_or(|amount| collected.len() < amount)
            }
        };

        let handle = match from_cache {
            true => self.for_each_async(predicate),
            false => self.for_each_remaining_async(predicate),
        };
        async move {
            handle.await?;
            let items = std::mem::take(&mut *collected.lock());
            Ok(items)
        }
        .boxed()
    }
}
