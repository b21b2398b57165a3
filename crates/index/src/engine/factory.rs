//! Factory for creating spatial engines

use kvcache_core::{Error, Result};

use super::linear::LinearEngine;
use super::noop::NoopEngine;
use super::rtree::RTreeEngine;
use super::traits::{EngineKind, SpatialEngine};

/// Spatial engine factory.
///
/// `capacity` is the maximum number of entries per tree node; it must be at
/// least 2 for every engine so configurations stay portable between them.
pub fn create_engine(kind: EngineKind, capacity: usize) -> Result<Box<dyn SpatialEngine>> {
    if capacity < 2 {
        return Err(Error::configuration(format!(
            "node capacity must be at least 2, got {capacity}"
        )));
    }
    match kind {
        EngineKind::RTree => Ok(Box::new(RTreeEngine::new(capacity))),
        EngineKind::Linear => Ok(Box::new(LinearEngine::with_capacity(capacity))),
        EngineKind::Noop => Ok(Box::new(NoopEngine)),
    }
}
