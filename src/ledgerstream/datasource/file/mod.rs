//! Directory-backed statement source
//!
//! Makes a watched drop directory behave like a message stream: a
//! pending-file queue fed by a backlog scan and a watch task, readiness
//! detection for in-flight writes, archiving of successes, and quarantine of
//! failures with written reports.

pub mod config;
pub mod data_source;
pub mod lifecycle;
pub mod reader;
pub mod watcher;

pub use config::FileWatcherSourceConfig;
pub use data_source::FileWatcherDataSource;
pub use lifecycle::{FileLifecycleManager, FileSourceStatistics, PendingFile};
pub use reader::{read_statement_file, FileReadOutcome};
pub use watcher::DirectoryWatcher;
