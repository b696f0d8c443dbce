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
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    task::{ready, Context, Poll},
};

use pin_project::pin_project;
use trove_common::{error::Result, spawn::SpawnHandle};

use crate::{fetcher::Fetcher, paginator::Inner};

/// How a traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// The remote collection has no more items.
    Exhausted,
    /// The predicate returned `false`.
    Stopped,
    /// The traversal was cancelled through its [`TraversalHandle`].
    Cancelled,
}

/// Handle of an async traversal.
///
/// Awaiting the handle returns how the traversal ended, or the fetch error that aborted it. Dropping the handle
/// detaches the traversal; it keeps running in the background.
#[must_use]
#[pin_project]
#[derive(Debug)]
pub struct TraversalHandle {
    #[pin]
    inner: SpawnHandle<Result<Completion>>,
    cancelled: Arc<AtomicBool>,
}

impl TraversalHandle {
    /// Run `predicate` over `replay` and then over the remote items after the cursor, one fetch at a time.
    pub(crate) fn spawn<F, P>(paginator: Arc<Inner<F>>, replay: Vec<F::Item>, limit: usize, mut predicate: P) -> Self
    where
        F: Fetcher,
        P: FnMut(F::Item) -> bool + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let spawner = paginator.spawner().clone();

        let inner = spawner.spawn(async move {
            let mut batch = replay;
            let mut last = false;
            loop {
                for item in batch {
                    if flag.load(Ordering::Acquire) {
                        return Ok(Completion::Cancelled);
                    }
                    if !predicate(item) {
                        return Ok(Completion::Stopped);
                    }
                }
                // An empty replay buffer is not an exhausted remote: only a fetched page can end the traversal.
                if last {
                    return Ok(Completion::Exhausted);
                }
                if flag.load(Ordering::Acquire) {
                    return Ok(Completion::Cancelled);
                }
                let page = paginator.fetch_page(limit).await?;
                batch = page.items;
                last = page.last;
            }
        });

        Self { inner, cancelled }
    }

    /// Request cancellation.
    ///
    /// Takes effect before the next item or fetch; a fetch already in flight completes first.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns `true` if the traversal has ended.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl Future for TraversalHandle {
    type Output = Result<Completion>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let res = ready!(this.inner.poll(cx));
        Poll::Ready(res.and_then(|completion| completion))
    }
}
