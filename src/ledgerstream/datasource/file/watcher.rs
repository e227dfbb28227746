//! Directory watch task
//!
//! Background task that polls the input directory on the configured interval
//! and feeds newly appeared files into the lifecycle manager's queue. The
//! watch task and the connect-time backlog scan are the queue's two
//! producers; consumers only ever read from the queue, so there is no
//! event/scan race to reconcile.

use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::lifecycle::FileLifecycleManager;

/// Polls the input directory and enqueues files as they appear.
///
/// Ordering is FIFO by detection; two files appearing within one poll tick
/// are queued in directory-listing order, not strict creation order.
pub struct DirectoryWatcher {
    handle: Option<JoinHandle<()>>,
}

impl DirectoryWatcher {
    /// Spawn the watch task.
    ///
    /// When `ignore_existing` is set, files already present at startup are
    /// excluded; the backlog scan owns those (or nothing does, when
    /// `process_existing` is off).
    pub fn start(lifecycle: Arc<FileLifecycleManager>, ignore_existing: bool) -> Self {
        let handle = tokio::spawn(async move {
            let poll_interval = lifecycle.config().poll_interval;
            let input_dir = lifecycle.config().input_dir.clone();

            let mut seen: HashSet<PathBuf> = if ignore_existing {
                list_matching(&lifecycle, &input_dir).into_iter().collect()
            } else {
                HashSet::new()
            };

            debug!("Directory watcher started for {}", input_dir.display());
            loop {
                let listing = list_matching(&lifecycle, &input_dir);

                // Forget files that left the directory (archived, quarantined
                // or removed) so a later re-drop of the same name is detected.
                let current: HashSet<PathBuf> = listing.iter().cloned().collect();
                seen.retain(|path| current.contains(path));

                for path in listing {
                    if seen.contains(&path) || lifecycle.is_queued(&path) {
                        seen.insert(path);
                        continue;
                    }
                    debug!("New file detected: {}", path.display());
                    seen.insert(path.clone());
                    lifecycle.on_file_appeared(path).await;
                }

                sleep(poll_interval).await;
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop the watch task; safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Directory watcher stopped");
        }
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn list_matching(lifecycle: &FileLifecycleManager, dir: &std::path::Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && lifecycle.matches(path))
            .collect(),
        Err(_) => Vec::new(),
    }
}
