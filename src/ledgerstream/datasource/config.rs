//! Source configuration types
//!
//! One immutable, kind-specific configuration per source. The kind-specific
//! structs live with their adapters; this module ties them together for the
//! registry and manager.

use serde::{Deserialize, Serialize};

use super::file::FileWatcherSourceConfig;
use super::kafka::KafkaSourceConfig;
use super::types::SourceKind;

/// Kind-specific source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceConfig {
    Kafka(KafkaSourceConfig),
    FileWatcher(FileWatcherSourceConfig),
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Kafka(_) => SourceKind::Kafka,
            SourceConfig::FileWatcher(_) => SourceKind::FileWatcher,
        }
    }

    /// The default configuration for a source kind.
    pub fn default_for(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Kafka => SourceConfig::Kafka(KafkaSourceConfig::default()),
            SourceKind::FileWatcher => {
                SourceConfig::FileWatcher(FileWatcherSourceConfig::default())
            }
        }
    }

    /// Build the configuration for a source kind from environment variables.
    pub fn from_env(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Kafka => SourceConfig::Kafka(KafkaSourceConfig::from_env()),
            SourceKind::FileWatcher => {
                SourceConfig::FileWatcher(FileWatcherSourceConfig::from_env())
            }
        }
    }
}

impl From<KafkaSourceConfig> for SourceConfig {
    fn from(config: KafkaSourceConfig) -> Self {
        SourceConfig::Kafka(config)
    }
}

impl From<FileWatcherSourceConfig> for SourceConfig {
    fn from(config: FileWatcherSourceConfig) -> Self {
        SourceConfig::FileWatcher(config)
    }
}
