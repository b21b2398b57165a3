//! Region index for one array variable
//!
//! `SpatialIndex` assigns insertion identifiers, enforces the index's
//! dimensionality and owns the engine selected by configuration. It has no
//! notion of eviction: entries stay until the index is torn down, and the
//! resolver re-checks liveness against the cache store.

use crate::engine::{create_engine, EngineKind, IndexId, IndexedRegion, SpatialEngine};
use kvcache_core::{Error, QueryBox, Result};
use std::fmt;
use tracing::{debug, trace};

/// Snapshot of an index's size and shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub engine: EngineKind,
    pub dim: usize,
    pub initialized: bool,
    pub entries: usize,
    pub nodes: usize,
    pub height: usize,
    pub next_id: IndexId,
}

/// Insert / range-query index over boxes of a fixed dimensionality
pub struct SpatialIndex {
    dim: usize,
    kind: EngineKind,
    engine: Option<Box<dyn SpatialEngine>>,
    next_id: IndexId,
}

impl SpatialIndex {
    /// Describe an index; call [`SpatialIndex::create`] before using it.
    pub fn new(dim: usize, kind: EngineKind) -> Self {
        Self {
            dim,
            kind,
            engine: None,
            next_id: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// Initialize an empty engine with `capacity` entries per node.
    pub fn create(&mut self, capacity: usize) -> Result<()> {
        if self.engine.is_some() {
            return Err(Error::IndexAlreadyInitialized);
        }
        self.engine = Some(create_engine(self.kind, capacity)?);
        debug!(engine = %self.kind, dim = self.dim, capacity, "Created spatial index");
        Ok(())
    }

    fn check_dim(&self, region: &QueryBox, operation: &'static str) -> Result<()> {
        if region.dim() != self.dim {
            return Err(Error::dimension_mismatch(self.dim, region.dim(), operation));
        }
        Ok(())
    }

    /// Store `region` under the next identifier. Inserting the same box twice
    /// creates two entries.
    pub fn insert(&mut self, region: QueryBox) -> Result<IndexId> {
        self.check_dim(&region, "insert")?;
        let engine = self
            .engine
            .as_mut()
            .ok_or(Error::IndexNotInitialized { operation: "insert" })?;

        let id = self.next_id;
        trace!(id, region = %region, "Indexing region");
        engine.insert(id, region);
        self.next_id += 1;
        Ok(id)
    }

    /// Every indexed region whose extent intersects `query`, in no particular
    /// order. Regions that merely touch `query` may be included.
    pub fn range_query(&self, query: &QueryBox) -> Result<Vec<IndexedRegion>> {
        self.check_dim(query, "range query")?;
        let engine = self.engine.as_ref().ok_or(Error::IndexNotInitialized {
            operation: "range query",
        })?;
        Ok(engine.intersecting(query))
    }

    pub fn len(&self) -> usize {
        self.engine.as_ref().map_or(0, |e| e.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the engine. Identifiers keep counting up afterwards so they are
    /// never reused by a later `create`.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            let entries = engine.len();
            engine.clear();
            debug!(engine = %self.kind, entries, "Tore down spatial index");
        }
    }

    pub fn stats(&self) -> IndexStats {
        let engine = self.engine.as_ref().map(|e| e.stats()).unwrap_or_default();
        IndexStats {
            engine: self.kind,
            dim: self.dim,
            initialized: self.engine.is_some(),
            entries: engine.entries,
            nodes: engine.nodes,
            height: engine.height,
            next_id: self.next_id,
        }
    }
}

impl fmt::Display for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        if !stats.initialized {
            return write!(f, "{} index (dim {}): not initialized", stats.engine, stats.dim);
        }
        write!(
            f,
            "{} index (dim {}): {} entries, {} nodes, height {}, next id {}",
            stats.engine, stats.dim, stats.entries, stats.nodes, stats.height, stats.next_id
        )
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("stats", &self.stats())
            .finish()
    }
}

impl Drop for SpatialIndex {
    fn drop(&mut self) {
        if self.engine.is_some() {
            debug!(index = %self, "Dropping spatial index");
        }
    }
}
