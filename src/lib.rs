//! # ledgerstream
//!
//! Source-agnostic ingestion of financial-statement records, delivered to
//! downstream processing as bounded batches with uniform consumption
//! semantics regardless of origin.
//!
//! Two interchangeable backends are supported:
//!
//! - **Kafka**: a consumer-group subscription to a statement topic, with
//!   auto-committed offsets
//! - **File watcher**: a watched drop directory made to behave like a
//!   message stream, with a pending-file queue, readiness detection,
//!   archiving of successes, and quarantine of failures with written reports
//!
//! Scheduling, retries, schema validation, template rendering, and metric
//! delivery are external collaborators; this crate only ingests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledgerstream::{DataSourceManager, SourceKind};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut manager = DataSourceManager::new();
//!
//!     // Pick the source from the DATA_SOURCE environment variable
//!     // ("kafka" or "file_watcher"; defaults to the file watcher).
//!     let kind = SourceKind::from_env();
//!     if !manager.initialize_source(kind, None, true).await {
//!         eprintln!("failed to initialize {} source", kind);
//!         return;
//!     }
//!
//!     let batch = manager
//!         .consume_batch(50, Duration::from_secs(5))
//!         .await
//!         .expect("source is initialized");
//!     for record in &batch {
//!         println!("ingested: {}", record);
//!     }
//!
//!     manager.close().await;
//! }
//! ```

pub mod ledgerstream;

// Re-export the main API at crate root for easy access
pub use ledgerstream::datasource::{
    BatchAssembler, DataSource, DataSourceError, DataSourceManager, ManagerStatus, RawRecord,
    RecordDrain, SourceConfig, SourceKind, SourceRegistry, SourceStatus, StatusDetail,
};
pub use ledgerstream::statement::{FinancialData, StatementMetadata};
