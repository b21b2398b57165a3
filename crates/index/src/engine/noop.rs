//! Engine that stores nothing

use kvcache_core::QueryBox;

use super::traits::{EngineKind, EngineStats, IndexId, IndexedRegion, SpatialEngine};

/// Discards inserts and answers every query with no candidates, so every
/// resolution is a full miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEngine;

impl SpatialEngine for NoopEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Noop
    }

    fn insert(&mut self, _id: IndexId, _region: QueryBox) {}

    fn intersecting(&self, _query: &QueryBox) -> Vec<IndexedRegion> {
        Vec::new()
    }

    fn len(&self) -> usize {
        0
    }

    fn clear(&mut self) {}

    fn stats(&self) -> EngineStats {
        EngineStats::default()
    }
}
