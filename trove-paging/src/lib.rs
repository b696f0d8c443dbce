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

//! Cursor-based pagination over remote collections.
//!
//! A [`Paginator`](paginator::Paginator) retrieves a remote collection page by page through an injected
//! [`Fetcher`](fetcher::Fetcher), and offers blocking, parallel, streaming and spawned consumption styles over the
//! same fetch logic.

/// Paginator config and builder.
pub mod config;
/// The fetcher contract of remote endpoints.
pub mod fetcher;
/// Iterators over paginated collections.
pub mod iter;
/// The pagination engine.
pub mod paginator;
/// The prelude.
pub mod prelude;
/// Async traversal handles.
pub mod traversal;

#[cfg(test)]
mod test_utils;
