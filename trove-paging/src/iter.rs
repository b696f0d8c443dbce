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

use std::collections::VecDeque;

use futures::Stream;
use trove_common::error::Result;

use crate::{fetcher::Fetcher, paginator::Paginator};

/// Replay-then-fetch cursor shared by the blocking iterator and the async stream.
pub(crate) struct Pages<F: Fetcher> {
    paginator: Paginator<F>,
    buffer: VecDeque<F::Item>,
    limit: usize,
    done: bool,
}

impl<F: Fetcher> Pages<F> {
    pub(crate) fn new(paginator: Paginator<F>, replay: Vec<F::Item>, limit: usize) -> Self {
        Self {
            paginator,
            buffer: replay.into(),
            limit,
            done: false,
        }
    }

    async fn next(&mut self) -> Option<Result<F::Item>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            match self.paginator.inner().fetch_page(self.limit).await {
                Ok(page) => {
                    self.done = page.last;
                    self.buffer.extend(page.items);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }

    pub(crate) fn into_stream(self) -> impl Stream<Item = Result<F::Item>> + Send + 'static {
        futures::stream::unfold(self, |mut pages| async move {
            let item = pages.next().await?;
            Some((item, pages))
        })
    }
}

/// Blocking iterator returned by [`Paginator::iter`].
pub struct PaginatorIter<F: Fetcher> {
    pages: Pages<F>,
}

impl<F: Fetcher> std::fmt::Debug for PaginatorIter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatorIter")
            .field("buffered", &self.pages.buffer.len())
            .field("limit", &self.pages.limit)
            .field("done", &self.pages.done)
            .finish()
    }
}

impl<F: Fetcher> PaginatorIter<F> {
    pub(crate) fn new(paginator: Paginator<F>, replay: Vec<F::Item>, limit: usize) -> Self {
        Self {
            pages: Pages::new(paginator, replay, limit),
        }
    }
}

impl<F: Fetcher> Iterator for PaginatorIter<F> {
    type Item = Result<F::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pages.buffer.pop_front() {
            return Some(Ok(item));
        }
        if self.pages.done {
            return None;
        }
        let spawner = self.pages.paginator.inner().spawner().clone();
        spawner.block_on(self.pages.next())
    }
}
