//! File watcher data source adapter
//!
//! Presents a watched directory as a statement source with the same
//! batch-with-timeout consumption semantics as the broker adapter.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use super::config::FileWatcherSourceConfig;
use super::lifecycle::FileLifecycleManager;
use super::reader::{read_statement_file, FileReadOutcome};
use super::watcher::DirectoryWatcher;
use crate::ledgerstream::datasource::batch::{BatchAssembler, RecordDrain};
use crate::ledgerstream::datasource::traits::DataSource;
use crate::ledgerstream::datasource::types::{
    DataSourceError, RawRecord, SourceKind, SourceStatus, StatusDetail,
};

/// Directory-backed statement source
pub struct FileWatcherDataSource {
    lifecycle: Arc<FileLifecycleManager>,
    assembler: BatchAssembler,
    watcher: Option<DirectoryWatcher>,
    /// Records from a file that straddled a batch boundary, served first on
    /// the next drain. The file itself is already archived.
    carryover: VecDeque<RawRecord>,
    records_consumed: u64,
    decode_errors: u64,
    connected: bool,
}

impl FileWatcherDataSource {
    pub fn new(config: FileWatcherSourceConfig) -> Result<Self, DataSourceError> {
        config.validate().map_err(DataSourceError::Configuration)?;
        config.ensure_directories().map_err(|e| {
            DataSourceError::Configuration(format!(
                "Cannot create source directories under {}: {}",
                config.input_dir.display(),
                e
            ))
        })?;

        let assembler = BatchAssembler::new(config.poll_interval);
        let lifecycle = Arc::new(FileLifecycleManager::new(config)?);
        info!(
            "Initialized file watcher source for directory: {}",
            lifecycle.config().input_dir.display()
        );

        Ok(Self {
            lifecycle,
            assembler,
            watcher: None,
            carryover: VecDeque::new(),
            records_consumed: 0,
            decode_errors: 0,
            connected: false,
        })
    }

    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, DataSourceError> {
        Self::new(FileWatcherSourceConfig::from_properties(props))
    }

    pub fn config(&self) -> &FileWatcherSourceConfig {
        self.lifecycle.config()
    }
}

#[async_trait]
impl RecordDrain for FileWatcherDataSource {
    /// Drain whatever is queued right now: carryover first, then queued
    /// files in detection order. Never waits for new files to appear.
    async fn drain_ready(&mut self, limit: usize, _wait: Duration) -> Vec<RawRecord> {
        let mut out = Vec::new();

        while out.len() < limit {
            if let Some(record) = self.carryover.pop_front() {
                out.push(record);
                continue;
            }

            let Some(pending) = self.lifecycle.dequeue_next() else {
                break;
            };

            match read_statement_file(&pending.path) {
                FileReadOutcome::Records(records) => {
                    self.records_consumed += records.len() as u64;
                    for record in records {
                        if out.len() < limit {
                            out.push(record);
                        } else {
                            self.carryover.push_back(record);
                        }
                    }
                    self.lifecycle.archive(&pending.path);
                }
                FileReadOutcome::Gone => {
                    warn!("File no longer exists: {}", pending.path.display());
                }
                FileReadOutcome::Malformed(reason) => {
                    self.decode_errors += 1;
                    error!("Invalid content in file {}: {}", pending.path.display(), reason);
                    self.lifecycle.quarantine(&pending.path, &reason);
                }
            }
        }

        out
    }
}

#[async_trait]
impl DataSource for FileWatcherDataSource {
    async fn connect(&mut self) -> bool {
        if self.connected {
            warn!("File watcher is already connected");
            return true;
        }

        if let Err(e) = self.lifecycle.config().ensure_directories() {
            error!("Failed to start file watcher: {}", e);
            return false;
        }

        let process_existing = self.lifecycle.config().process_existing;
        if process_existing {
            self.lifecycle.scan_existing().await;
        }

        self.watcher = Some(DirectoryWatcher::start(
            Arc::clone(&self.lifecycle),
            !process_existing,
        ));
        self.connected = true;
        info!(
            "File watcher started for directory: {}",
            self.lifecycle.config().input_dir.display()
        );
        true
    }

    async fn consume_batch(
        &mut self,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, DataSourceError> {
        if !self.connected && !self.connect().await {
            return Err(DataSourceError::Connection(
                "Failed to establish file watcher connection".to_string(),
            ));
        }

        let assembler = self.assembler.clone();
        let records = assembler.assemble(self, batch_size, timeout).await;
        debug!("Consumed batch of {} records from files", records.len());
        Ok(records)
    }

    async fn close(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        if self.connected {
            self.connected = false;
            info!("File watcher stopped");
        }
    }

    fn status(&self) -> SourceStatus {
        let config = self.lifecycle.config();
        let stats = self.lifecycle.statistics();
        SourceStatus {
            connected: self.connected,
            kind: SourceKind::FileWatcher,
            records_consumed: self.records_consumed,
            decode_errors: self.decode_errors,
            detail: StatusDetail::FileWatcher {
                queue_depth: stats.queue_depth,
                input_files_pending: stats.input_files_pending,
                archived_files: stats.archived_files,
                error_files: stats.error_files,
                input_dir: config.input_dir.clone(),
                archive_dir: config.archive_dir.clone(),
                error_dir: config.error_dir.clone(),
            },
        }
    }
}
