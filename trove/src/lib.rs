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

//! Incremental retrieval and caching core for chat service clients.
//!
//! - [`memory`] holds live, concurrently read cache views over stores and the eviction policies bounding them.
//! - [`paging`] retrieves unbounded remote collections page by page through an injected fetcher.
//!
//! Everything commonly needed is re-exported by the prelude, which is glob re-exported at the crate root.

pub use trove_common as common;
pub use trove_memory as memory;
pub use trove_paging as paging;

mod prelude;
pub use prelude::*;
