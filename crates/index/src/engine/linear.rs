//! Flat vector engine with linear scans

use kvcache_core::QueryBox;

use super::regions_touch;
use super::traits::{EngineKind, EngineStats, IndexId, IndexedRegion, SpatialEngine};

/// Stores regions in insertion order and scans all of them per query
#[derive(Debug, Default)]
pub struct LinearEngine {
    entries: Vec<IndexedRegion>,
}

impl LinearEngine {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }
}

impl SpatialEngine for LinearEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Linear
    }

    fn insert(&mut self, id: IndexId, region: QueryBox) {
        self.entries.push(IndexedRegion { id, region });
    }

    fn intersecting(&self, query: &QueryBox) -> Vec<IndexedRegion> {
        self.entries
            .iter()
            .filter(|entry| regions_touch(&entry.region, query))
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn stats(&self) -> EngineStats {
        EngineStats {
            entries: self.entries.len(),
            nodes: usize::from(!self.entries.is_empty()),
            height: usize::from(!self.entries.is_empty()),
        }
    }
}
