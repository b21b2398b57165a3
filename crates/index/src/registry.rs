//! Per-variable index registry
//!
//! Hosts keep one spatial index per array variable. The registry owns them,
//! each behind its own reader/writer lock: inserts take the write lock,
//! resolutions share the read lock.

use crate::config::IndexConfig;
use crate::engine::IndexId;
use crate::liveness::LivenessCheck;
use crate::resolver::{CacheResolver, Resolution};
use crate::spatial_index::SpatialIndex;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use kvcache_core::{Error, QueryBox, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Shared handle to one variable's index
pub type SharedIndex = Arc<RwLock<SpatialIndex>>;

/// Spatial indexes keyed by variable name
pub struct IndexRegistry {
    config: IndexConfig,
    indexes: DashMap<String, SharedIndex>,
}

impl IndexRegistry {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            indexes: DashMap::new(),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Index for `variable`, created and initialized on first use.
    /// Fails if the existing index has a different dimensionality.
    pub fn get_or_create(&self, variable: &str, dim: usize) -> Result<SharedIndex> {
        let index = match self.indexes.entry(variable.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let mut index = SpatialIndex::new(dim, self.config.engine);
                index.create(self.config.node_capacity)?;
                info!(variable, dim, engine = %self.config.engine, "Registered index");
                Arc::clone(entry.insert(Arc::new(RwLock::new(index))).value())
            }
        };

        let actual = index.read().dim();
        if actual != dim {
            return Err(Error::dimension_mismatch(actual, dim, "get_or_create"));
        }
        Ok(index)
    }

    pub fn get(&self, variable: &str) -> Option<SharedIndex> {
        self.indexes.get(variable).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop and tear down the index for `variable`. Returns whether it existed.
    pub fn remove(&self, variable: &str) -> bool {
        match self.indexes.remove(variable) {
            Some((_, index)) => {
                index.write().teardown();
                info!(variable, "Removed index");
                true
            }
            None => false,
        }
    }

    /// Record that `region` of `variable` has been written to the cache
    pub fn record(&self, variable: &str, region: QueryBox) -> Result<IndexId> {
        let index = self.get_or_create(variable, region.dim())?;
        let mut guard = index.write();
        guard.insert(region)
    }

    /// Resolve `requested` against `variable`'s index. Unknown variables
    /// resolve to a full miss.
    pub fn resolve<L>(
        &self,
        variable: &str,
        requested: &QueryBox,
        max_depth: usize,
        key_prefix: &str,
        live: &L,
    ) -> Result<Resolution>
    where
        L: LivenessCheck + ?Sized,
    {
        let Some(index) = self.get(variable) else {
            return Ok(Resolution::full_miss(requested.clone()));
        };
        let guard = index.read();
        let resolver = CacheResolver::new(&guard, self.config.resolver.clone());
        resolver.resolve(requested, max_depth, key_prefix, live)
    }

    /// Registered variable names, sorted
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}
