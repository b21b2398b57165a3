/// Constants shared across the kvcache crates
// Depth value that marks an interactive (unbounded) query. Scheduler-driven
// queries pass any other depth and are subject to the benefit threshold.
pub const UNBOUNDED_DEPTH: usize = 999;

// Smallest partial hit worth a round trip to the cache, in bytes
pub const MIN_BENEFIT_BYTES: u64 = 1024;

// Width of one array element, in bytes (double precision)
pub const ELEMENT_SIZE: u64 = 8;

// Default maximum number of entries per spatial index node
pub const DEFAULT_NODE_CAPACITY: usize = 16;

// Separator between the start and count halves of a box key
pub const KEY_SECTION_SEPARATOR: char = '|';

// Separator between per-dimension values inside a key section
pub const KEY_VALUE_SEPARATOR: char = ',';

// Environment variable names
pub const KVCACHE_INDEX_CONFIG_VAR: &str = "KVCACHE_INDEX_CONFIG";
pub const KVCACHE_INDEX_ENGINE_VAR: &str = "KVCACHE_INDEX_ENGINE";
pub const KVCACHE_NODE_CAPACITY_VAR: &str = "KVCACHE_NODE_CAPACITY";
pub const KVCACHE_UNBOUNDED_DEPTH_VAR: &str = "KVCACHE_UNBOUNDED_DEPTH";
pub const KVCACHE_MIN_BENEFIT_BYTES_VAR: &str = "KVCACHE_MIN_BENEFIT_BYTES";
pub const KVCACHE_ELEMENT_SIZE_VAR: &str = "KVCACHE_ELEMENT_SIZE";
