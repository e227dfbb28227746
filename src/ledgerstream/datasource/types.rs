//! Generic ingestion type definitions
//!
//! These types are independent of any concrete backend and are shared by the
//! source adapters, the registry, and the manager.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Environment variable selecting the active data source kind.
pub const DATA_SOURCE_ENV: &str = "DATA_SOURCE";

/// An untyped statement record as delivered by a source.
///
/// Record field schema is owned by the downstream validation collaborator;
/// this crate treats records as opaque nested maps and never inspects their
/// business content.
pub type RawRecord = serde_json::Value;

/// Supported data source kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Durable partitioned message-broker topic (Kafka consumer group)
    Kafka,
    /// Watched filesystem directory receiving ad-hoc file drops
    FileWatcher,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Kafka => "kafka",
            SourceKind::FileWatcher => "file_watcher",
        }
    }

    /// Resolve the source kind from the `DATA_SOURCE` environment variable.
    ///
    /// Defaults to the file watcher when the variable is unset; an invalid
    /// value is logged and also falls back to the file watcher.
    pub fn from_env() -> Self {
        match std::env::var(DATA_SOURCE_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                log::warn!(
                    "Invalid data source type '{}', defaulting to file_watcher",
                    value
                );
                SourceKind::FileWatcher
            }),
            Err(_) => SourceKind::FileWatcher,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kafka" => Ok(SourceKind::Kafka),
            "file_watcher" | "filewatcher" | "file" => Ok(SourceKind::FileWatcher),
            _ => Err(format!("Unknown data source kind: {}", s)),
        }
    }
}

/// Live status snapshot for one source adapter
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub connected: bool,
    pub kind: SourceKind,
    /// Records handed to downstream since the adapter was constructed
    pub records_consumed: u64,
    /// Records or files excluded because their payload failed to decode
    pub decode_errors: u64,
    pub detail: StatusDetail,
}

/// Kind-specific status counters and identity
#[derive(Debug, Clone, Serialize)]
pub enum StatusDetail {
    Kafka {
        brokers: String,
        topic: String,
        group_id: String,
    },
    FileWatcher {
        queue_depth: usize,
        input_files_pending: usize,
        archived_files: usize,
        error_files: usize,
        input_dir: PathBuf,
        archive_dir: PathBuf,
        error_dir: PathBuf,
    },
}

/// Error types for data source operations
#[derive(Debug)]
pub enum DataSourceError {
    /// Invalid or missing configuration (unknown kind, bad field value)
    Configuration(String),
    /// Backend could not be reached
    Connection(String),
    /// Operation attempted before any source was initialized
    NoActiveSource,
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            DataSourceError::Connection(msg) => write!(f, "Connection error: {}", msg),
            DataSourceError::NoActiveSource => write!(f, "No data source initialized"),
        }
    }
}

impl Error for DataSourceError {}
