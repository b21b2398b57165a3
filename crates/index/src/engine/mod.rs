//! Spatial engines backing the region index
//!
//! An engine stores boxes under caller-assigned identifiers and answers
//! range queries. The tree engine is the default; the linear engine is a
//! flat scan for small indexes and cross-checking, and the no-op engine keeps
//! hosts without spatial indexing working as "always miss".

mod factory;
mod linear;
mod noop;
mod rtree;
mod traits;

// Re-export public API
pub use factory::create_engine;
pub use linear::LinearEngine;
pub use noop::NoopEngine;
pub use rtree::RTreeEngine;
pub use traits::{EngineKind, EngineStats, IndexId, IndexedRegion, SpatialEngine};

use kvcache_core::QueryBox;

/// Engine-level intersection test on closed intervals.
///
/// Boxes that only share a boundary pass this test even though their
/// geometric overlap is empty; callers refine with `QueryBox::intersect`.
pub(crate) fn regions_touch(a: &QueryBox, b: &QueryBox) -> bool {
    a.dim() == b.dim()
        && a.start()
            .iter()
            .zip(a.uppers())
            .zip(b.start().iter().zip(b.uppers()))
            .all(|((alo, ahi), (blo, bhi))| *alo <= bhi && *blo <= ahi)
}
