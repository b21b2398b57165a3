//! Index configuration management with precedence and validation
use crate::engine::EngineKind;
use kvcache_core::{
    Error, Result, DEFAULT_NODE_CAPACITY, ELEMENT_SIZE, KVCACHE_ELEMENT_SIZE_VAR,
    KVCACHE_INDEX_CONFIG_VAR, KVCACHE_INDEX_ENGINE_VAR, KVCACHE_MIN_BENEFIT_BYTES_VAR,
    KVCACHE_NODE_CAPACITY_VAR, KVCACHE_UNBOUNDED_DEPTH_VAR, MIN_BENEFIT_BYTES, UNBOUNDED_DEPTH,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Tuning for the cache resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Depth value marking an interactive query; such queries skip the
    /// minimum-benefit filter
    pub unbounded_depth: usize,
    /// Smallest partial hit worth retrieving, in bytes
    pub min_benefit_bytes: u64,
    /// Width of one array element, in bytes
    pub element_size: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            unbounded_depth: UNBOUNDED_DEPTH,
            min_benefit_bytes: MIN_BENEFIT_BYTES,
            element_size: ELEMENT_SIZE,
        }
    }
}

impl ResolverConfig {
    /// Minimum overlap, in elements, for a bounded query to use a cached box
    pub fn min_useful_overlap(&self) -> u64 {
        self.min_benefit_bytes
            .checked_div(self.element_size)
            .unwrap_or(0)
    }

    /// Whether `max_depth` is the interactive sentinel
    pub fn is_unbounded(&self, max_depth: usize) -> bool {
        max_depth == self.unbounded_depth
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default configuration
    #[default]
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
    /// Set programmatically through the builder
    Builder,
}

/// Configuration for spatial indexes and the resolver that queries them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Engine backing each index
    pub engine: EngineKind,
    /// Maximum entries per index node
    pub node_capacity: usize,
    /// Resolver tuning
    pub resolver: ResolverConfig,
    /// Where this configuration came from
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            node_capacity: DEFAULT_NODE_CAPACITY,
            resolver: ResolverConfig::default(),
            source: ConfigSource::Default,
        }
    }
}

impl IndexConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.node_capacity < 2 {
            return Err(Error::configuration(format!(
                "node_capacity must be at least 2, got {}",
                self.node_capacity
            )));
        }
        if self.resolver.element_size == 0 {
            return Err(Error::configuration("element_size must be non-zero"));
        }
        Ok(())
    }
}

/// Builder for creating index configurations
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: IndexConfig {
                source: ConfigSource::Builder,
                ..IndexConfig::default()
            },
        }
    }

    /// Set the spatial engine
    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.config.engine = engine;
        self
    }

    /// Set maximum entries per node
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.config.node_capacity = capacity;
        self
    }

    /// Set the interactive depth sentinel
    pub fn with_unbounded_depth(mut self, depth: usize) -> Self {
        self.config.resolver.unbounded_depth = depth;
        self
    }

    /// Set the minimum-benefit threshold in bytes
    pub fn with_min_benefit_bytes(mut self, bytes: u64) -> Self {
        self.config.resolver.min_benefit_bytes = bytes;
        self
    }

    /// Set the element width in bytes
    pub fn with_element_size(mut self, bytes: u64) -> Self {
        self.config.resolver.element_size = bytes;
        self
    }

    /// Set configuration source
    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.config.source = source;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<IndexConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for IndexConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration loader that handles precedence:
/// defaults, then the JSON file named by `KVCACHE_INDEX_CONFIG`, then
/// individual environment variables.
pub struct IndexConfigLoader;

impl IndexConfigLoader {
    /// Load configuration with full precedence handling
    pub fn load() -> Result<IndexConfig> {
        let mut config = IndexConfig::default();

        if let Some(path) = std::env::var_os(KVCACHE_INDEX_CONFIG_VAR) {
            config = Self::load_from_file(Path::new(&path))?;
        }

        config = Self::apply_env(config)?;
        config.validate()?;
        debug!(source = ?config.source, engine = %config.engine, "Loaded index configuration");
        Ok(config)
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file(path: &Path) -> Result<IndexConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: IndexConfig = serde_json::from_str(&content)?;
        config.source = ConfigSource::ConfigFile(path.to_path_buf());
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn apply_env(mut config: IndexConfig) -> Result<IndexConfig> {
        if let Some(engine) = env_override::<EngineKind>(KVCACHE_INDEX_ENGINE_VAR)? {
            config.engine = engine;
            config.source = ConfigSource::EnvironmentVariable(KVCACHE_INDEX_ENGINE_VAR.to_string());
        }
        if let Some(capacity) = env_override::<usize>(KVCACHE_NODE_CAPACITY_VAR)? {
            config.node_capacity = capacity;
            config.source =
                ConfigSource::EnvironmentVariable(KVCACHE_NODE_CAPACITY_VAR.to_string());
        }
        if let Some(depth) = env_override::<usize>(KVCACHE_UNBOUNDED_DEPTH_VAR)? {
            config.resolver.unbounded_depth = depth;
            config.source =
                ConfigSource::EnvironmentVariable(KVCACHE_UNBOUNDED_DEPTH_VAR.to_string());
        }
        if let Some(bytes) = env_override::<u64>(KVCACHE_MIN_BENEFIT_BYTES_VAR)? {
            config.resolver.min_benefit_bytes = bytes;
            config.source =
                ConfigSource::EnvironmentVariable(KVCACHE_MIN_BENEFIT_BYTES_VAR.to_string());
        }
        if let Some(bytes) = env_override::<u64>(KVCACHE_ELEMENT_SIZE_VAR)? {
            config.resolver.element_size = bytes;
            config.source = ConfigSource::EnvironmentVariable(KVCACHE_ELEMENT_SIZE_VAR.to_string());
        }
        Ok(config)
    }
}

fn env_override<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::configuration(format!("invalid {name}='{value}': {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ALL_VARS: [&str; 6] = [
        KVCACHE_INDEX_CONFIG_VAR,
        KVCACHE_INDEX_ENGINE_VAR,
        KVCACHE_NODE_CAPACITY_VAR,
        KVCACHE_UNBOUNDED_DEPTH_VAR,
        KVCACHE_MIN_BENEFIT_BYTES_VAR,
        KVCACHE_ELEMENT_SIZE_VAR,
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.engine, EngineKind::RTree);
        assert_eq!(config.node_capacity, 16);
        assert_eq!(config.resolver.unbounded_depth, 999);
        assert_eq!(config.resolver.min_useful_overlap(), 128);
        assert!(config.resolver.is_unbounded(999));
        assert!(!config.resolver.is_unbounded(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_validates() {
        let config = IndexConfigBuilder::new()
            .with_engine(EngineKind::Linear)
            .with_node_capacity(4)
            .with_min_benefit_bytes(64)
            .with_element_size(4)
            .build()
            .unwrap();
        assert_eq!(config.engine, EngineKind::Linear);
        assert_eq!(config.resolver.min_useful_overlap(), 16);
        assert_eq!(config.source, ConfigSource::Builder);

        assert!(IndexConfigBuilder::new().with_node_capacity(1).build().is_err());
        assert!(IndexConfigBuilder::new().with_element_size(0).build().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: IndexConfig =
            serde_json::from_str(r#"{"engine":"linear","resolver":{"min_benefit_bytes":0}}"#)
                .unwrap();
        assert_eq!(config.engine, EngineKind::Linear);
        assert_eq!(config.node_capacity, DEFAULT_NODE_CAPACITY);
        assert_eq!(config.resolver.min_benefit_bytes, 0);
        assert_eq!(config.resolver.element_size, ELEMENT_SIZE);
    }

    #[test]
    #[serial]
    fn test_load_defaults_without_env() {
        clear_env();
        let config = IndexConfigLoader::load().unwrap();
        assert_eq!(config, IndexConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_file_then_env_precedence() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"engine":"linear","node_capacity":32}}"#).unwrap();

        std::env::set_var(KVCACHE_INDEX_CONFIG_VAR, file.path());
        std::env::set_var(KVCACHE_NODE_CAPACITY_VAR, "8");
        let config = IndexConfigLoader::load();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.engine, EngineKind::Linear);
        assert_eq!(config.node_capacity, 8);
        assert_eq!(
            config.source,
            ConfigSource::EnvironmentVariable(KVCACHE_NODE_CAPACITY_VAR.to_string())
        );
    }

    #[test]
    #[serial]
    fn test_invalid_env_value() {
        clear_env();
        std::env::set_var(KVCACHE_INDEX_ENGINE_VAR, "quadtree");
        let result = IndexConfigLoader::load();
        clear_env();
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = IndexConfigLoader::load_from_file(Path::new("/nonexistent/kvcache.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
