//! Source registry
//!
//! Maps source kinds to adapter constructors. The registry is an explicitly
//! constructed value owned by the caller (usually through the manager); there
//! is no process-wide instance.

use std::collections::HashMap;

use super::config::SourceConfig;
use super::file::FileWatcherDataSource;
use super::kafka::KafkaDataSource;
use super::traits::DataSource;
use super::types::{DataSourceError, SourceKind};

type SourceFactory =
    Box<dyn Fn(SourceConfig) -> Result<Box<dyn DataSource>, DataSourceError> + Send + Sync>;

/// Registry of source adapter factories
pub struct SourceRegistry {
    factories: HashMap<SourceKind, SourceFactory>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with both built-in source kinds registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(SourceKind::Kafka, |config| match config {
            SourceConfig::Kafka(config) => Ok(Box::new(KafkaDataSource::new(config)?) as _),
            other => Err(DataSourceError::Configuration(format!(
                "Expected kafka configuration, got {}",
                other.kind()
            ))),
        });

        registry.register(SourceKind::FileWatcher, |config| match config {
            SourceConfig::FileWatcher(config) => {
                Ok(Box::new(FileWatcherDataSource::new(config)?) as _)
            }
            other => Err(DataSourceError::Configuration(format!(
                "Expected file_watcher configuration, got {}",
                other.kind()
            ))),
        });

        registry
    }

    /// Register a factory for a source kind, replacing any existing one.
    pub fn register<F>(&mut self, kind: SourceKind, factory: F)
    where
        F: Fn(SourceConfig) -> Result<Box<dyn DataSource>, DataSourceError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    /// Construct an adapter for `kind`, applying the kind's default
    /// configuration when none is supplied.
    pub fn create(
        &self,
        kind: SourceKind,
        config: Option<SourceConfig>,
    ) -> Result<Box<dyn DataSource>, DataSourceError> {
        let config = config.unwrap_or_else(|| SourceConfig::default_for(kind));
        if config.kind() != kind {
            return Err(DataSourceError::Configuration(format!(
                "Configuration kind '{}' does not match requested source kind '{}'",
                config.kind(),
                kind
            )));
        }

        let factory = self.factories.get(&kind).ok_or_else(|| {
            DataSourceError::Configuration(format!(
                "No factory registered for source kind: {}",
                kind
            ))
        })?;

        factory(config)
    }

    pub fn has_kind(&self, kind: SourceKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered source kinds, in stable order.
    pub fn available(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<SourceKind> = self.factories.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
