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

use serde::{Deserialize, Serialize};
use trove_common::{
    error::{Error, Result},
    spawn::Spawner,
};

use crate::{
    fetcher::{Fetcher, PaginationOrder},
    paginator::Paginator,
};

/// Paginator config.
///
/// A deserialized config without `initial_limit` starts at `max_limit`, or at the default initial limit if
/// `max_limit` is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PaginatorConfigFields")]
pub struct PaginatorConfig {
    /// The smallest page size the remote endpoint accepts. `0` disables the bound.
    pub min_limit: usize,
    /// The largest page size the remote endpoint accepts. `0` disables the bound.
    ///
    /// Iteration fetches pages of this size to minimize round trips.
    pub max_limit: usize,
    /// The page size of explicit single page fetches until [`Paginator::set_limit`] is called.
    pub initial_limit: usize,
    /// Whether retrieved items are kept in the replay buffer.
    pub cache_enabled: bool,
    /// The paging direction.
    pub order: PaginationOrder,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            min_limit: 1,
            max_limit: 100,
            initial_limit: 100,
            cache_enabled: true,
            order: PaginationOrder::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct PaginatorConfigFields {
    min_limit: usize,
    max_limit: usize,
    initial_limit: Option<usize>,
    cache_enabled: bool,
    order: PaginationOrder,
}

impl Default for PaginatorConfigFields {
    fn default() -> Self {
        let PaginatorConfig {
            min_limit,
            max_limit,
            cache_enabled,
            order,
            ..
        } = PaginatorConfig::default();
        Self {
            min_limit,
            max_limit,
            initial_limit: None,
            cache_enabled,
            order,
        }
    }
}

impl From<PaginatorConfigFields> for PaginatorConfig {
    fn from(fields: PaginatorConfigFields) -> Self {
        let initial_limit = match (fields.initial_limit, fields.max_limit) {
            (Some(initial_limit), _) => initial_limit,
            (None, 0) => PaginatorConfig::default().initial_limit,
            (None, max_limit) => max_limit,
        };
        Self {
            min_limit: fields.min_limit,
            max_limit: fields.max_limit,
            initial_limit,
            cache_enabled: fields.cache_enabled,
            order: fields.order,
        }
    }
}

impl PaginatorConfig {
    /// Check the limit bounds.
    pub fn validate(&self) -> Result<()> {
        let Self {
            min_limit,
            max_limit,
            initial_limit,
            ..
        } = *self;
        let invalid = |reason: &str| {
            Error::invalid_argument(format!("invalid paginator limits: {reason}"))
                .with_context("min_limit", min_limit)
                .with_context("max_limit", max_limit)
                .with_context("initial_limit", initial_limit)
        };
        if min_limit > 0 && max_limit > 0 && min_limit > max_limit {
            return Err(invalid("min_limit exceeds max_limit"));
        }
        if !limit_in_bounds(initial_limit, min_limit, max_limit) {
            return Err(invalid("initial_limit outside of bounds"));
        }
        Ok(())
    }
}

/// Returns `true` if `limit` is a usable page size within the enabled bounds.
pub(crate) fn limit_in_bounds(limit: usize, min_limit: usize, max_limit: usize) -> bool {
    limit > 0 && (min_limit == 0 || limit >= min_limit) && (max_limit == 0 || limit <= max_limit)
}

/// Paginator builder.
pub struct PaginatorBuilder<F> {
    fetcher: F,
    config: PaginatorConfig,
    spawner: Option<Spawner>,
}

impl<F> std::fmt::Debug for PaginatorBuilder<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatorBuilder")
            .field("config", &self.config)
            .field("spawner", &self.spawner)
            .finish()
    }
}

impl<F> PaginatorBuilder<F>
where
    F: Fetcher,
{
    /// Create a paginator builder over `fetcher` with the default config.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            config: PaginatorConfig::default(),
            spawner: None,
        }
    }

    /// Replace the whole config.
    pub fn with_config(mut self, config: PaginatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the page size bounds of the remote endpoint. `0` disables a bound.
    ///
    /// The initial limit is reset to `max_limit` if it is enabled, otherwise it is kept.
    pub fn with_limits(mut self, min_limit: usize, max_limit: usize) -> Self {
        self.config.min_limit = min_limit;
        self.config.max_limit = max_limit;
        if max_limit > 0 {
            self.config.initial_limit = max_limit;
        }
        self
    }

    /// Set the page size of explicit single page fetches.
    pub fn with_initial_limit(mut self, initial_limit: usize) -> Self {
        self.config.initial_limit = initial_limit;
        self
    }

    /// Set whether retrieved items are kept in the replay buffer.
    pub fn with_cache_enabled(mut self, cache_enabled: bool) -> Self {
        self.config.cache_enabled = cache_enabled;
        self
    }

    /// Set the paging direction.
    pub fn with_order(mut self, order: PaginationOrder) -> Self {
        self.config.order = order;
        self
    }

    /// Set the spawner used to run async traversals and to block on fetches.
    ///
    /// Defaults to the tokio runtime the paginator is built in.
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Build the paginator.
    pub fn build(self) -> Result<Paginator<F>> {
        self.config.validate()?;
        if !self.fetcher.supports_order(self.config.order) {
            return Err(Error::unsupported("pagination order not supported by the fetcher")
                .with_context("order", format!("{:?}", self.config.order)));
        }
        let spawner = match self.spawner {
            Some(spawner) => spawner,
            None => Spawner::try_current()?,
        };
        Ok(Paginator::new(self.fetcher, self.config, spawner))
    }
}

#[cfg(test)]
mod tests {
    use trove_common::error::ErrorKind;

    use super::*;
    use crate::test_utils::MockFetcher;

    #[test]
    fn test_validate() {
        assert!(PaginatorConfig::default().validate().is_ok());

        let config = PaginatorConfig {
            min_limit: 10,
            max_limit: 5,
            initial_limit: 5,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);

        let config = PaginatorConfig {
            min_limit: 0,
            max_limit: 0,
            initial_limit: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = PaginatorConfig {
            initial_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_config_serde() {
        let config: PaginatorConfig = serde_json::from_str(r#"{ "max_limit": 50, "order": "forward" }"#).unwrap();
        assert_eq!(config.min_limit, 1);
        assert_eq!(config.max_limit, 50);
        assert_eq!(config.order, PaginationOrder::Forward);
        // The initial limit follows the configured bound.
        assert_eq!(config.initial_limit, 50);
        config.validate().unwrap();

        let config: PaginatorConfig = serde_json::from_str(r#"{ "max_limit": 0 }"#).unwrap();
        assert_eq!(config.initial_limit, PaginatorConfig::default().initial_limit);

        let config: PaginatorConfig = serde_json::from_str(r#"{ "max_limit": 50, "initial_limit": 20 }"#).unwrap();
        assert_eq!(config.initial_limit, 20);

        let config: PaginatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PaginatorConfig::default());

        let config: PaginatorConfig = serde_json::from_str(r#"{ "max_limit": 50, "initial_limit": 80 }"#).unwrap();
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_build_requires_runtime() {
        let err = PaginatorBuilder::new(MockFetcher::new(0..10)).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);

        let spawner = Spawner::dedicated("trove-paging-test", 1).unwrap();
        let paginator = PaginatorBuilder::new(MockFetcher::new(0..10))
            .with_limits(2, 20)
            .with_spawner(spawner)
            .build()
            .unwrap();
        assert_eq!(paginator.limit(), 20);
    }

    #[test]
    fn test_build_rejects_unsupported_order() {
        let spawner = Spawner::dedicated("trove-paging-test", 1).unwrap();
        let err = PaginatorBuilder::new(MockFetcher::new(0..10).backward_only())
            .with_order(PaginationOrder::Forward)
            .with_spawner(spawner)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
