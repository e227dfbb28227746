//! Tests for the file lifecycle manager
//!
//! Covers: backlog scan ordering, readiness detection, queue FIFO and
//! dedup, archive/quarantine disposal including name collisions, and the
//! statistics snapshot.

use ledgerstream::ledgerstream::datasource::file::config::FileWatcherSourceConfig;
use ledgerstream::ledgerstream::datasource::file::lifecycle::FileLifecycleManager;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

fn test_config(root: &Path) -> FileWatcherSourceConfig {
    FileWatcherSourceConfig {
        input_dir: root.join("input"),
        archive_dir: root.join("archive"),
        error_dir: root.join("error"),
        file_pattern: "*.json".to_string(),
        process_existing: true,
        batch_size: 50,
        poll_interval: Duration::from_millis(50),
        settle: Duration::from_millis(10),
    }
}

fn manager(root: &Path) -> FileLifecycleManager {
    let config = test_config(root);
    config.ensure_directories().unwrap();
    FileLifecycleManager::new(config).unwrap()
}

fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_scan_existing_enqueues_by_modification_time() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let input = &lifecycle.config().input_dir;

    for name in ["first.json", "second.json", "third.json"] {
        fs::write(input.join(name), r#"{"ok": true}"#).unwrap();
        sleep(Duration::from_millis(20)).await;
    }

    let enqueued = lifecycle.scan_existing().await;
    assert_eq!(enqueued, 3);

    let order: Vec<String> = std::iter::from_fn(|| lifecycle.dequeue_next())
        .map(|p| p.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(order, vec!["first.json", "second.json", "third.json"]);
}

#[tokio::test]
async fn test_scan_skips_empty_files() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let input = &lifecycle.config().input_dir;

    fs::write(input.join("empty.json"), "").unwrap();
    fs::write(input.join("full.json"), r#"{"ok": true}"#).unwrap();

    let enqueued = lifecycle.scan_existing().await;
    assert_eq!(enqueued, 1);
    let pending = lifecycle.dequeue_next().unwrap();
    assert_eq!(pending.path.file_name().unwrap(), "full.json");
}

#[tokio::test]
async fn test_scan_ignores_non_matching_files() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let input = &lifecycle.config().input_dir;

    fs::write(input.join("statement.json"), r#"{"ok": true}"#).unwrap();
    fs::write(input.join("notes.txt"), "not a statement").unwrap();

    assert_eq!(lifecycle.scan_existing().await, 1);
}

#[tokio::test]
async fn test_file_readiness() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let input = &lifecycle.config().input_dir;

    let stable = input.join("stable.json");
    fs::write(&stable, r#"{"ok": true}"#).unwrap();
    assert!(lifecycle.is_file_ready(&stable).await);

    let empty = input.join("empty.json");
    fs::write(&empty, "").unwrap();
    assert!(!lifecycle.is_file_ready(&empty).await);

    let absent = input.join("absent.json");
    assert!(!lifecycle.is_file_ready(&absent).await);
}

#[tokio::test]
async fn test_on_file_appeared_deduplicates() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let path = lifecycle.config().input_dir.join("dup.json");
    fs::write(&path, r#"{"ok": true}"#).unwrap();

    lifecycle.on_file_appeared(path.clone()).await;
    lifecycle.on_file_appeared(path.clone()).await;

    assert_eq!(lifecycle.queue_depth(), 1);
    assert!(lifecycle.is_queued(&path));
}

#[tokio::test]
async fn test_on_file_appeared_skips_vanished_file() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let path = lifecycle.config().input_dir.join("ghost.json");

    lifecycle.on_file_appeared(path).await;
    assert_eq!(lifecycle.queue_depth(), 0);
}

#[tokio::test]
async fn test_dequeue_from_empty_queue() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    assert!(lifecycle.dequeue_next().is_none());
}

#[tokio::test]
async fn test_archive_moves_file_with_timestamp_prefix() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let path = lifecycle.config().input_dir.join("done.json");
    fs::write(&path, r#"{"ok": true}"#).unwrap();

    lifecycle.archive(&path);

    assert!(!path.exists());
    let archived = list_names(&lifecycle.config().archive_dir);
    assert_eq!(archived.len(), 1);
    assert!(archived[0].ends_with("_done.json"));
}

#[tokio::test]
async fn test_archive_name_collision_is_disambiguated() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let input = &lifecycle.config().input_dir;

    // Same name archived twice within one second must produce two distinct
    // archive entries, not an overwrite.
    let path = input.join("reused.json");
    fs::write(&path, r#"{"copy": 1}"#).unwrap();
    lifecycle.archive(&path);
    fs::write(&path, r#"{"copy": 2}"#).unwrap();
    lifecycle.archive(&path);

    let archived = list_names(&lifecycle.config().archive_dir);
    assert_eq!(archived.len(), 2);
}

#[tokio::test]
async fn test_quarantine_writes_report() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let path = lifecycle.config().input_dir.join("broken.json");
    fs::write(&path, "{not json").unwrap();

    lifecycle.quarantine(&path, "JSON decode error: expected value");

    assert!(!path.exists());
    let error_dir = &lifecycle.config().error_dir;
    let names = list_names(error_dir);
    assert_eq!(names.len(), 2);

    let moved = names.iter().find(|n| n.ends_with("_broken.json")).unwrap();
    let report_name = names.iter().find(|n| n.ends_with(".error.txt")).unwrap();
    assert_eq!(
        *report_name,
        moved.replace("_broken.json", "_broken.error.txt")
    );

    let report = fs::read_to_string(error_dir.join(report_name)).unwrap();
    assert!(report.contains("broken.json"));
    assert!(report.contains("Timestamp:"));
    assert!(report.contains("JSON decode error"));
}

#[tokio::test]
async fn test_statistics_reflect_directories_and_queue() {
    let root = TempDir::new().unwrap();
    let lifecycle = manager(root.path());
    let input = &lifecycle.config().input_dir;

    fs::write(input.join("a.json"), r#"{"n": 1}"#).unwrap();
    fs::write(input.join("b.json"), r#"{"n": 2}"#).unwrap();
    lifecycle.scan_existing().await;

    let archived = input.join("a.json");
    lifecycle.dequeue_next().unwrap();
    lifecycle.archive(&archived);

    let stats = lifecycle.statistics();
    assert_eq!(stats.queue_depth, 1);
    assert_eq!(stats.input_files_pending, 1);
    assert_eq!(stats.archived_files, 1);
    assert_eq!(stats.error_files, 0);
}
