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

//! Concurrent cache views and eviction policies.
//!
//! A [`Store`](store::Store) is written by a single owner. Any number of views read it concurrently without copying
//! for simple queries, and an [`EvictionPolicy`](eviction::EvictionPolicy) decides which entries the owner keeps.

/// The owning cache composed of a store and an eviction policy.
pub mod cache;
/// Eviction policies and their combinators.
pub mod eviction;
/// The prelude.
pub mod prelude;
/// The shared store read by views.
pub mod store;
/// Read-only views over stores.
pub mod view;
