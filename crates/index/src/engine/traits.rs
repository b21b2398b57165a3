//! Core spatial engine trait definition

use kvcache_core::{Error, QueryBox, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned to a region when it is inserted
pub type IndexId = u64;

/// A box stored in the index together with its insertion identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRegion {
    pub id: IndexId,
    pub region: QueryBox,
}

/// Which engine an index is built on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    RTree,
    Linear,
    Noop,
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rtree" | "r-tree" => Ok(Self::RTree),
            "linear" => Ok(Self::Linear),
            "noop" | "none" => Ok(Self::Noop),
            _ => Err(Error::configuration(format!("Unknown spatial engine: {s}"))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RTree => "rtree",
            Self::Linear => "linear",
            Self::Noop => "noop",
        };
        f.write_str(name)
    }
}

/// Shape of an engine's internal structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub entries: usize,
    pub nodes: usize,
    pub height: usize,
}

/// Spatial engine trait
pub trait SpatialEngine: Send + Sync {
    /// Which implementation this is
    fn kind(&self) -> EngineKind;

    /// Store `region` under `id`
    fn insert(&mut self, id: IndexId, region: QueryBox);

    /// Every stored region whose closed extent intersects `query`
    fn intersecting(&self, query: &QueryBox) -> Vec<IndexedRegion>;

    /// Number of stored regions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored region
    fn clear(&mut self);

    fn stats(&self) -> EngineStats;
}
