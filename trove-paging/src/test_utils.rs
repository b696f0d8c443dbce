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
    collections::BTreeSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use futures::{future::BoxFuture, FutureExt};
use parking_lot::Mutex;
use trove_common::error::{Error, Result};

use crate::fetcher::{Fetcher, PageRequest, PaginationOrder};

#[derive(Debug, Default)]
struct MockState {
    requests: Mutex<Vec<PageRequest<u64>>>,
    fail_next: AtomicBool,
}

/// An in-memory remote collection of ids, paged like a snowflake endpoint.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    items: Arc<Vec<u64>>,
    broken: Arc<BTreeSet<u64>>,
    backward_only: bool,
    state: Arc<MockState>,
}

impl MockFetcher {
    pub fn new(items: impl IntoIterator<Item = u64>) -> Self {
        let mut items = items.into_iter().collect::<Vec<_>>();
        items.sort_unstable();
        items.dedup();
        Self {
            items: Arc::new(items),
            broken: Arc::default(),
            backward_only: false,
            state: Arc::default(),
        }
    }

    /// Records of these ids fail to parse.
    pub fn with_broken(mut self, broken: impl IntoIterator<Item = u64>) -> Self {
        self.broken = Arc::new(broken.into_iter().collect());
        self
    }

    pub fn backward_only(mut self) -> Self {
        self.backward_only = true;
        self
    }

    /// Fail the next request with a transport error.
    pub fn fail_next(&self) {
        self.state.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<PageRequest<u64>> {
        self.state.requests.lock().clone()
    }

    pub fn fetches(&self) -> usize {
        self.state.requests.lock().len()
    }
}

impl Fetcher for MockFetcher {
    type Item = u64;
    type Cursor = u64;

    fn cursor(&self, item: &u64) -> u64 {
        *item
    }

    fn fetch(&self, request: PageRequest<u64>) -> BoxFuture<'static, Result<Vec<Result<u64>>>> {
        self.state.requests.lock().push(request.clone());
        let fail = self.state.fail_next.swap(false, Ordering::SeqCst);

        let PageRequest { cursor, limit, order } = request;
        let page = match order {
            PaginationOrder::Forward => self
                .items
                .iter()
                .filter(|id| cursor.is_none_or(|c| **id > c))
                .take(limit)
                .copied()
                .collect::<Vec<_>>(),
            PaginationOrder::Backward => self
                .items
                .iter()
                .rev()
                .filter(|id| cursor.is_none_or(|c| **id < c))
                .take(limit)
                .copied()
                .collect::<Vec<_>>(),
        };
        let records = page
            .into_iter()
            .map(|id| match self.broken.contains(&id) {
                true => Err(Error::parse(std::io::Error::other(format!("malformed record {id}")))),
                false => Ok(id),
            })
            .collect::<Vec<_>>();

        async move {
            tokio::task::yield_now().await;
            if fail {
                return Err(Error::fetch(std::io::Error::other("connection reset")));
            }
            Ok(records)
        }
        .boxed()
    }

    fn supports_order(&self, order: PaginationOrder) -> bool {
        !self.backward_only || order == PaginationOrder::Backward
    }
}
