//! Cache resolution for requested boxes
//!
//! Given a requested box, the resolver picks the live indexed box with the
//! largest overlap, records it as a cache hit, splits the request around the
//! overlap and resolves the remaining pieces recursively, up to a depth
//! budget. Every call ends in one of four states:
//!
//! - depth exceeded: nothing is emitted,
//! - fully regular: no live, useful overlap, so the whole box is fetched fresh,
//! - fully cached: the best overlap covers the whole box,
//! - mixed: the overlap is cached and the remainder is resolved again, or
//!   emitted as regular once the depth budget is spent.

use crate::config::ResolverConfig;
use crate::liveness::LivenessCheck;
use crate::spatial_index::SpatialIndex;
use kvcache_core::{Error, QueryBox, Result};
use tracing::{debug, trace};

/// An indexed box chosen to serve part of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    /// The indexed box whose cache entry should be retrieved
    pub source: QueryBox,
    /// The part of `source` that lies inside the request
    pub overlap: QueryBox,
}

/// Counters collected while resolving one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Resolution steps that ran past the depth guard
    pub nodes: usize,
    /// Candidates returned by range queries
    pub candidates: usize,
    /// Candidates skipped because their key was gone from the store
    pub evicted: usize,
    /// Candidates skipped by the minimum-benefit filter
    pub below_threshold: usize,
    /// Deepest recursion level reached (1 for a single decision)
    pub deepest: usize,
}

/// Result of resolving a requested box
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Boxes that must be fetched or computed fresh
    pub regular: Vec<QueryBox>,
    /// Boxes served from cache
    pub cached: Vec<CacheHit>,
    /// Counters for this resolution
    pub stats: ResolveStats,
}

impl Resolution {
    /// A resolution that fetches all of `requested`
    pub fn full_miss(requested: QueryBox) -> Self {
        Self {
            regular: vec![requested],
            ..Self::default()
        }
    }

    /// Indexed boxes to retrieve from the cache
    pub fn cached_boxes(&self) -> impl Iterator<Item = &QueryBox> {
        self.cached.iter().map(|hit| &hit.source)
    }

    /// Elements of the request served from cache
    pub fn cached_volume(&self) -> u64 {
        self.cached.iter().map(|hit| hit.overlap.volume()).sum()
    }

    /// Elements of the request that must be fetched fresh
    pub fn regular_volume(&self) -> u64 {
        self.regular.iter().map(QueryBox::volume).sum()
    }

    /// Whether the whole request is served from cache
    pub fn is_full_hit(&self) -> bool {
        self.regular.is_empty() && !self.cached.is_empty()
    }

    /// Whether the whole request must be fetched fresh. An empty resolution,
    /// as produced past the depth budget, is neither a hit nor a miss.
    pub fn is_full_miss(&self) -> bool {
        self.cached.is_empty() && !self.regular.is_empty()
    }

    /// Whether nothing was emitted at all
    pub fn is_empty(&self) -> bool {
        self.cached.is_empty() && self.regular.is_empty()
    }
}

/// Resolves requested boxes against one spatial index
pub struct CacheResolver<'a> {
    index: &'a SpatialIndex,
    config: ResolverConfig,
}

impl<'a> CacheResolver<'a> {
    pub fn new(index: &'a SpatialIndex, config: ResolverConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `requested` starting at depth 0.
    ///
    /// `key_prefix` is prepended to each candidate's key string before asking
    /// `live` whether the cached entry still exists.
    pub fn resolve<L>(
        &self,
        requested: &QueryBox,
        max_depth: usize,
        key_prefix: &str,
        live: &L,
    ) -> Result<Resolution>
    where
        L: LivenessCheck + ?Sized,
    {
        self.resolve_from(requested, max_depth, 0, key_prefix, live)
    }

    /// Resolve `requested` as if already `current_depth` levels deep.
    /// Returns an empty resolution when `current_depth > max_depth`.
    pub fn resolve_from<L>(
        &self,
        requested: &QueryBox,
        max_depth: usize,
        current_depth: usize,
        key_prefix: &str,
        live: &L,
    ) -> Result<Resolution>
    where
        L: LivenessCheck + ?Sized,
    {
        if requested.dim() != self.index.dim() {
            return Err(Error::dimension_mismatch(
                self.index.dim(),
                requested.dim(),
                "resolve",
            ));
        }

        let mut resolution = Resolution::default();
        self.resolve_into(
            requested,
            max_depth,
            current_depth,
            key_prefix,
            live,
            &mut resolution,
        )?;
        debug!(
            requested = %requested,
            cached = resolution.cached.len(),
            regular = resolution.regular.len(),
            nodes = resolution.stats.nodes,
            "Resolved request"
        );
        Ok(resolution)
    }

    fn resolve_into<L>(
        &self,
        requested: &QueryBox,
        max_depth: usize,
        current_depth: usize,
        key_prefix: &str,
        live: &L,
        out: &mut Resolution,
    ) -> Result<()>
    where
        L: LivenessCheck + ?Sized,
    {
        if current_depth > max_depth {
            trace!(current_depth, max_depth, "Depth budget exceeded");
            return Ok(());
        }
        let depth = current_depth + 1;
        out.stats.nodes += 1;
        out.stats.deepest = out.stats.deepest.max(depth);

        // Scan in insertion order so equal overlaps resolve to the oldest entry
        let mut candidates = self.index.range_query(requested)?;
        candidates.sort_unstable_by_key(|c| c.id);

        let bounded = !self.config.is_unbounded(max_depth);
        let min_overlap = self.config.min_useful_overlap();

        let mut best: Option<(QueryBox, QueryBox)> = None;
        let mut best_volume = 0;
        let mut covered = false;
        for candidate in candidates {
            out.stats.candidates += 1;
            let overlap = candidate.region.intersect(requested)?;
            let volume = overlap.volume();
            if volume <= best_volume {
                continue;
            }
            if bounded && volume < min_overlap {
                out.stats.below_threshold += 1;
                trace!(region = %candidate.region, volume, min_overlap, "Overlap below benefit threshold");
                continue;
            }

            let key = format!("{key_prefix}{}", candidate.region.to_key_string());
            if !live.exists(&key) {
                out.stats.evicted += 1;
                debug!(key = %key, "Key has been evicted");
                continue;
            }

            // Volumes saturate, so coverage is decided on the boxes themselves
            covered = overlap == *requested;
            best_volume = volume;
            best = Some((candidate.region, overlap));
            if covered {
                break;
            }
        }

        let Some((source, overlap)) = best else {
            trace!(requested = %requested, "No usable overlap");
            out.regular.push(requested.clone());
            return Ok(());
        };

        debug!(source = %source, reuse = %overlap, depth, "Partial cache hit");
        let remainder = if covered {
            Vec::new()
        } else {
            requested.complement_split(&overlap)?
        };
        out.cached.push(CacheHit { source, overlap });
        if covered {
            return Ok(());
        }

        if depth >= max_depth {
            out.regular.extend(remainder);
            return Ok(());
        }
        for next in &remainder {
            self.resolve_into(next, max_depth, depth, key_prefix, live, out)?;
        }
        Ok(())
    }
}
