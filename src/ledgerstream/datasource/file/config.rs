//! File watcher source configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names for the directory source
pub mod env {
    pub const INPUT_DIR: &str = "INPUT_DIR";
    pub const ARCHIVE_DIR: &str = "ARCHIVE_DIR";
    pub const ERROR_DIR: &str = "ERROR_DIR";
    pub const FILE_PATTERN: &str = "FILE_PATTERN";
    pub const PROCESS_EXISTING: &str = "PROCESS_EXISTING";
    pub const FILE_BATCH_SIZE: &str = "FILE_BATCH_SIZE";
    pub const FILE_POLLING_INTERVAL: &str = "FILE_POLLING_INTERVAL";
}

/// Configuration for the directory-backed statement source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWatcherSourceConfig {
    /// Directory watched for dropped statement files
    pub input_dir: PathBuf,

    /// Destination for successfully processed files
    pub archive_dir: PathBuf,

    /// Destination for quarantined files and their failure reports
    pub error_dir: PathBuf,

    /// Glob pattern matched against file names (not full paths)
    pub file_pattern: String,

    /// Enqueue files already present in the input directory when the watch
    /// starts
    pub process_existing: bool,

    /// Default batch size used when draining the backlog
    pub batch_size: usize,

    /// Directory poll interval for the watch task, also the assembler's
    /// sleep between drain attempts
    pub poll_interval: Duration,

    /// Settle delay before a newly observed file is considered stable.
    /// Guards against reading a file mid-write.
    pub settle: Duration,
}

impl Default for FileWatcherSourceConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            archive_dir: PathBuf::from("archive"),
            error_dir: PathBuf::from("error"),
            file_pattern: "*.json".to_string(),
            process_existing: true,
            batch_size: 50,
            poll_interval: Duration::from_secs(5),
            settle: Duration::from_millis(500),
        }
    }
}

impl FileWatcherSourceConfig {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            input_dir: env_path(env::INPUT_DIR, defaults.input_dir),
            archive_dir: env_path(env::ARCHIVE_DIR, defaults.archive_dir),
            error_dir: env_path(env::ERROR_DIR, defaults.error_dir),
            file_pattern: std::env::var(env::FILE_PATTERN)
                .unwrap_or(defaults.file_pattern),
            process_existing: std::env::var(env::PROCESS_EXISTING)
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.process_existing),
            batch_size: env_parse(env::FILE_BATCH_SIZE, defaults.batch_size),
            poll_interval: Duration::from_secs(env_parse(
                env::FILE_POLLING_INTERVAL,
                defaults.poll_interval.as_secs(),
            )),
            settle: defaults.settle,
        }
    }

    /// Build the configuration from a caller-supplied property map.
    pub fn from_properties(props: &HashMap<String, String>) -> Self {
        let get = |key: &str| props.get(key).cloned();
        let defaults = Self::default();

        Self {
            input_dir: get("input_dir").map(PathBuf::from).unwrap_or(defaults.input_dir),
            archive_dir: get("archive_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.archive_dir),
            error_dir: get("error_dir").map(PathBuf::from).unwrap_or(defaults.error_dir),
            file_pattern: get("file_pattern").unwrap_or(defaults.file_pattern),
            process_existing: get("process_existing")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(defaults.process_existing),
            batch_size: get("batch_size")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.batch_size),
            poll_interval: get("polling_interval")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            settle: get("settle_ms")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle),
        }
    }

    /// Validate field values; returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.file_pattern.is_empty() {
            return Err("file_pattern cannot be empty".to_string());
        }
        glob::Pattern::new(&self.file_pattern)
            .map_err(|e| format!("Invalid file pattern '{}': {}", self.file_pattern, e))?;
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.poll_interval.is_zero() {
            return Err("polling_interval must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Create the input/archive/error directories if absent.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.input_dir)?;
        std::fs::create_dir_all(&self.archive_dir)?;
        std::fs::create_dir_all(&self.error_dir)?;
        Ok(())
    }
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("Invalid value '{}' for {}, using default", value, key);
            default
        }),
        Err(_) => default,
    }
}
