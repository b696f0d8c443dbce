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

//! End-to-end tests for paging a remote message history into a bounded cache.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures::{future::BoxFuture, FutureExt, StreamExt};
use itertools::Itertools;
use trove::{
    Cache, CacheView, Completion, Error, ErrorKind, Fetcher, KeyedCacheView, PageRequest, PaginationOrder, Paginator,
    Result, Spawner,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Message {
    id: u64,
    content: String,
}

/// Serves a fixed channel history, newest first, and counts requests.
#[derive(Debug, Clone)]
struct History {
    messages: Arc<Vec<Message>>,
    fetches: Arc<AtomicUsize>,
}

impl History {
    fn new(len: u64) -> Self {
        let messages = (1..=len)
            .map(|id| Message {
                id,
                content: format!("message #{id}"),
            })
            .collect();
        Self {
            messages: Arc::new(messages),
            fetches: Arc::default(),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Fetcher for History {
    type Item = Message;
    type Cursor = u64;

    fn cursor(&self, item: &Message) -> u64 {
        item.id
    }

    fn fetch(&self, request: PageRequest<u64>) -> BoxFuture<'static, Result<Vec<Result<Message>>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let page = self
            .messages
            .iter()
            .rev()
            .filter(|m| request.cursor.is_none_or(|c| m.id < c))
            .take(request.limit)
            .cloned()
            .map(Ok)
            .collect_vec();
        async move { Ok(page) }.boxed()
    }

    fn supports_order(&self, order: PaginationOrder) -> bool {
        order == PaginationOrder::Backward
    }
}

#[test_log::test]
fn test_stream_count_end_to_end() {
    let history = History::new(120);
    let spawner = Spawner::dedicated("trove-it", 2).unwrap();
    let paginator = Paginator::builder(history.clone())
        .with_limits(1, 50)
        .with_spawner(spawner.clone())
        .build()
        .unwrap();

    let count = spawner.block_on(paginator.stream().count());
    assert_eq!(count, 120);
    assert_eq!(history.fetches(), 3);

    // Replaying needs one more request to find nothing after the oldest message.
    assert_eq!(paginator.iter().count(), 120);
    assert_eq!(history.fetches(), 4);
}

#[test_log::test]
fn test_unsupported_order() {
    let err = Paginator::builder(History::new(1))
        .with_order(PaginationOrder::Forward)
        .with_spawner(Spawner::dedicated("trove-it", 1).unwrap())
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_traversal_fills_bounded_cache() {
    let history = History::new(300);
    let paginator = Paginator::builder(history.clone())
        .with_limits(1, 100)
        .with_cache_enabled(false)
        .build()
        .unwrap();

    let cache = Cache::with_lru(64, |_: &u64| false).unwrap();
    let completion = paginator
        .for_each_remaining_async({
            let cache = cache.clone();
            move |message: Message| {
                cache.insert(message.id, message);
                true
            }
        })
        .await
        .unwrap();
    assert_eq!(completion, Completion::Exhausted);
    assert!(paginator.is_cache_empty());

    // The oldest 64 messages are the most recently inserted ones.
    assert_eq!(cache.len(), 64);
    let view = cache.sorted_view(|a: &Message, b: &Message| a.id.cmp(&b.id));
    assert_eq!(view.to_vec().into_iter().map(|m| m.id).collect_vec(), (1..=64).collect_vec());
    assert_eq!(view.get(&1).map(|m| m.content), Some("message #1".to_string()));
    assert_eq!(view.get(&65), None);
}

#[test_log::test(tokio::test)]
async fn test_take_until_and_failure() {
    let history = History::new(40);
    let paginator = Paginator::builder(history.clone()).with_limits(1, 10).build().unwrap();

    let recent = paginator.take_until_async(|m| m.id == 25).await.unwrap();
    assert_eq!(recent.iter().map(|m| m.id).collect_vec(), (26..=40).rev().collect_vec());
    assert_eq!(paginator.first().map(|m| m.id), Some(40));

    struct Broken;

    impl Fetcher for Broken {
        type Item = Message;
        type Cursor = u64;

        fn cursor(&self, item: &Message) -> u64 {
            item.id
        }

        fn fetch(&self, _: PageRequest<u64>) -> BoxFuture<'static, Result<Vec<Result<Message>>>> {
            async move { Err(Error::fetch(std::io::Error::other("gateway timeout"))) }.boxed()
        }
    }

    let broken = Paginator::builder(Broken).build().unwrap();
    let err = broken.take_async(5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(broken.cached().is_empty());
    assert_eq!(broken.last_retrieved(), None);
}
