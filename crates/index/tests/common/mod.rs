//! Shared helpers for integration tests

use kvcache_index::QueryBox;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn qb(start: &[u64], count: &[u64]) -> QueryBox {
    QueryBox::new(start.to_vec(), count.to_vec()).unwrap()
}

/// Total elements of the cached overlaps and regular boxes, checking along
/// the way that no two pieces overlap
pub fn covered_volume(resolution: &kvcache_index::Resolution) -> u64 {
    let pieces: Vec<&QueryBox> = resolution
        .regular
        .iter()
        .chain(resolution.cached.iter().map(|hit| &hit.overlap))
        .collect();
    for (i, a) in pieces.iter().enumerate() {
        for b in &pieces[i + 1..] {
            assert!(a.intersect(b).unwrap().is_empty(), "{a} overlaps {b}");
        }
    }
    pieces.iter().map(|p| p.volume()).sum()
}
