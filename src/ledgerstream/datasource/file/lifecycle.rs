//! Pending-file queue and post-processing disposal
//!
//! The lifecycle manager is what makes directory polling behave like a
//! message stream: files are detected, checked for readiness, queued FIFO by
//! detection time, and after consumption moved to exactly one of the archive
//! or error directories. The queue is fed from two execution contexts (the
//! connect-time backlog scan and the directory watch task) and drained by the
//! consume path; all access goes through the internal mutex.

use chrono::Local;
use glob::Pattern;
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;
use tokio::time::sleep;

use super::config::FileWatcherSourceConfig;
use crate::ledgerstream::datasource::types::DataSourceError;

/// A file observed in the input directory, queued for consumption.
///
/// Lives from detection until the underlying file is archived or quarantined;
/// a crash before disposal leaves the file in the input directory for
/// redelivery on the next startup scan.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub path: PathBuf,
    pub discovered_at: SystemTime,
    /// Size observed at enqueue time
    pub size: u64,
}

/// Live directory and queue counts, for observability only.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileSourceStatistics {
    pub queue_depth: usize,
    pub input_files_pending: usize,
    pub archived_files: usize,
    pub error_files: usize,
}

/// Owns the pending-file queue and disposes of files after processing.
pub struct FileLifecycleManager {
    config: FileWatcherSourceConfig,
    pattern: Pattern,
    queue: Mutex<VecDeque<PendingFile>>,
}

impl FileLifecycleManager {
    pub fn new(config: FileWatcherSourceConfig) -> Result<Self, DataSourceError> {
        let pattern = Pattern::new(&config.file_pattern).map_err(|e| {
            DataSourceError::Configuration(format!(
                "Invalid file pattern '{}': {}",
                config.file_pattern, e
            ))
        })?;
        Ok(Self {
            config,
            pattern,
            queue: Mutex::new(VecDeque::new()),
        })
    }

    pub fn config(&self) -> &FileWatcherSourceConfig {
        &self.config
    }

    /// Whether a path's file name matches the configured pattern.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.pattern.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    pub fn is_queued(&self, path: &Path) -> bool {
        self.queue
            .lock()
            .expect("pending-file queue poisoned")
            .iter()
            .any(|pending| pending.path == path)
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.lock().expect("pending-file queue poisoned").len()
    }

    /// One-time sweep of files already present in the input directory.
    ///
    /// Files are enqueued in modification-time order, oldest first, and only
    /// if they pass the readiness check; non-ready files are skipped this
    /// pass and picked up by the watch task once they stabilize. Returns the
    /// number of files enqueued.
    pub async fn scan_existing(&self) -> usize {
        let mut candidates: Vec<(PathBuf, SystemTime)> = match fs::read_dir(&self.config.input_dir)
        {
            Ok(entries) => entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && self.matches(path))
                .filter_map(|path| {
                    let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                    Some((path, modified))
                })
                .collect(),
            Err(e) => {
                error!(
                    "Error scanning input directory {}: {}",
                    self.config.input_dir.display(),
                    e
                );
                return 0;
            }
        };

        candidates.sort_by_key(|(_, modified)| *modified);

        let mut enqueued = 0;
        for (path, _) in candidates {
            if self.is_file_ready(&path).await {
                self.enqueue(path);
                enqueued += 1;
            } else {
                debug!("Skipping file not yet ready: {}", path.display());
            }
        }

        if enqueued > 0 {
            info!("Found {} existing statement files to process", enqueued);
        }
        enqueued
    }

    /// Check that a file is stable: sample its size, wait the settle delay,
    /// resample. Ready only if it still exists with an unchanged, non-zero
    /// size. Guards against enqueueing a file mid-write.
    pub async fn is_file_ready(&self, path: &Path) -> bool {
        let initial_size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(_) => return false,
        };

        sleep(self.config.settle).await;

        match fs::metadata(path) {
            Ok(meta) => meta.len() == initial_size && meta.len() > 0,
            Err(_) => false,
        }
    }

    /// Handle a newly appeared file: apply the settle delay, then enqueue if
    /// it is still present and not already queued.
    pub async fn on_file_appeared(&self, path: PathBuf) {
        sleep(self.config.settle).await;
        if path.exists() && self.matches(&path) && !self.is_queued(&path) {
            self.enqueue(path);
        }
    }

    fn enqueue(&self, path: PathBuf) {
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let mut queue = self.queue.lock().expect("pending-file queue poisoned");
        if queue.iter().any(|pending| pending.path == path) {
            return;
        }
        debug!("Queued statement file: {}", path.display());
        queue.push_back(PendingFile {
            path,
            discovered_at: SystemTime::now(),
            size,
        });
    }

    /// Pop the oldest queued file, FIFO by detection time.
    pub fn dequeue_next(&self) -> Option<PendingFile> {
        self.queue
            .lock()
            .expect("pending-file queue poisoned")
            .pop_front()
    }

    /// Move a successfully processed file into the archive directory under a
    /// timestamp-prefixed name. If the move fails the original is deleted so
    /// it is not reprocessed.
    pub fn archive(&self, path: &Path) {
        match self.move_with_timestamp(path, &self.config.archive_dir) {
            Ok(dest) => debug!("Archived file: {} -> {}", path.display(), dest.display()),
            Err(e) => {
                warn!(
                    "Error archiving file {}: {}; removing original",
                    path.display(),
                    e
                );
                if let Err(e) = fs::remove_file(path) {
                    warn!(
                        "Failed to remove {} after archive failure: {}",
                        path.display(),
                        e
                    );
                }
            }
        }
    }

    /// Move a problematic file into the error directory and write a sibling
    /// `.error.txt` report with the original name, an ISO timestamp, and the
    /// failure reason.
    pub fn quarantine(&self, path: &Path, reason: &str) {
        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match self.move_with_timestamp(path, &self.config.error_dir) {
            Ok(dest) => {
                self.write_error_report(&dest, &original_name, reason);
                error!(
                    "Moved problematic file to error directory: {}",
                    dest.display()
                );
            }
            Err(e) => error!(
                "Error moving file {} to error directory: {}",
                path.display(),
                e
            ),
        }
    }

    fn write_error_report(&self, moved: &Path, original_name: &str, reason: &str) {
        let report_path = moved.with_extension("error.txt");
        let report = format!(
            "Error processing file: {}\nTimestamp: {}\nError: {}\n",
            original_name,
            Local::now().to_rfc3339(),
            reason
        );
        if let Err(e) = fs::write(&report_path, report) {
            warn!(
                "Failed to write error report {}: {}",
                report_path.display(),
                e
            );
        }
    }

    fn move_with_timestamp(&self, path: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let stamped = format!(
            "{}_{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            name.to_string_lossy()
        );
        let dest = unique_destination(dest_dir, &stamped);

        // Rename can fail across filesystems; fall back to copy + remove.
        if fs::rename(path, &dest).is_err() {
            fs::copy(path, &dest)?;
            fs::remove_file(path)?;
        }
        Ok(dest)
    }

    /// Live counts of pattern-matching files in the three directories plus
    /// the queue depth.
    pub fn statistics(&self) -> FileSourceStatistics {
        FileSourceStatistics {
            queue_depth: self.queue_depth(),
            input_files_pending: self.count_matching(&self.config.input_dir),
            archived_files: self.count_matching(&self.config.archive_dir),
            error_files: self.count_matching(&self.config.error_dir),
        }
    }

    fn count_matching(&self, dir: &Path) -> usize {
        match fs::read_dir(dir) {
            Ok(entries) => entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && self.matches(path))
                .count(),
            Err(_) => 0,
        }
    }
}

/// Resolve a destination path that does not collide with an existing file.
///
/// Two files with the same name disposed within the same second would
/// otherwise collide on the timestamp prefix; a numeric suffix before the
/// extension disambiguates.
fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };
    for n in 1.. {
        let disambiguated = match ext {
            Some(ext) => dir.join(format!("{}-{}.{}", stem, n, ext)),
            None => dir.join(format!("{}-{}", stem, n)),
        };
        if !disambiguated.exists() {
            return disambiguated;
        }
    }
    unreachable!()
}
