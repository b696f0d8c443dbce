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

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use trove_common::error::Result;

/// The direction in which a remote collection is paged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationOrder {
    /// Oldest first. Each page continues after the cursor.
    Forward,
    /// Newest first. Each page continues before the cursor.
    #[default]
    Backward,
}

impl PaginationOrder {
    /// The query parameter remote endpoints conventionally use for the cursor in this order.
    pub fn key(&self) -> &'static str {
        match self {
            PaginationOrder::Forward => "after",
            PaginationOrder::Backward => "before",
        }
    }
}

/// A single page request handed to a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<C> {
    /// The cursor to continue from, `None` for the first page.
    pub cursor: Option<C>,
    /// The maximum number of items to return.
    pub limit: usize,
    /// The paging direction.
    pub order: PaginationOrder,
}

/// Retrieves pages of a remote collection.
///
/// A fetcher is a pure function of the request to one remote call. Retries and backoff belong to the transport
/// behind it.
pub trait Fetcher: Send + Sync + 'static {
    /// The item type of the remote collection.
    type Item: Clone + Send + Sync + 'static;
    /// The cursor type, usually the id of an item.
    type Cursor: Clone + Send + Sync + 'static;

    /// Extract the cursor pointing at `item`.
    fn cursor(&self, item: &Self::Item) -> Self::Cursor;

    /// Fetch one page.
    ///
    /// The outer error is a failed request and is returned to the caller as is. Every inner error is a record of an
    /// otherwise successful page that could not be parsed; those are skipped.
    fn fetch(&self, request: PageRequest<Self::Cursor>) -> BoxFuture<'static, Result<Vec<Result<Self::Item>>>>;

    /// Returns `true` if the remote endpoint can be paged in `order`.
    fn supports_order(&self, order: PaginationOrder) -> bool {
        let _ = order;
        true
    }
}
