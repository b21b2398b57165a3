//! Box-region cache metadata for N-dimensional arrays
//!
//! This crate tracks which rectangular regions of an array have been written
//! to a key-value cache and resolves new requests into cached and regular
//! (fetch fresh) pieces:
//! - Pluggable spatial engines (R-tree, linear scan, no-op)
//! - A per-variable spatial index with insertion identifiers
//! - Depth-bounded recursive cache resolution with liveness re-checks
//! - A registry holding one locked index per variable
//! - Configuration with file and environment precedence

pub mod config;
pub mod engine;
pub mod liveness;
pub mod registry;
pub mod resolver;
pub mod spatial_index;

// Re-export main types and traits
pub use config::{ConfigSource, IndexConfig, IndexConfigBuilder, IndexConfigLoader, ResolverConfig};
pub use engine::{create_engine, EngineKind, EngineStats, IndexId, IndexedRegion, SpatialEngine};
pub use kvcache_core::{Error, QueryBox, Result};
pub use liveness::{LivenessCheck, MemoryStore};
pub use registry::{IndexRegistry, SharedIndex};
pub use resolver::{CacheHit, CacheResolver, Resolution, ResolveStats};
pub use spatial_index::{IndexStats, SpatialIndex};
