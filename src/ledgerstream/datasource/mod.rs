//! Source-agnostic statement ingestion
//!
//! Two interchangeable backends (a Kafka topic, or a watched drop directory)
//! behind one capability contract with identical batch-with-timeout
//! consumption semantics:
//!
//! - **[`DataSource`]**: the uniform adapter trait (connect, consume_batch,
//!   close, status)
//! - **[`BatchAssembler`]**: the shared timeout-bounded accumulation loop
//! - **kafka / file**: the concrete adapters
//! - **[`SourceRegistry`]**: kind-to-constructor mapping with per-kind
//!   defaults
//! - **[`DataSourceManager`]**: owns the active adapter; what the
//!   orchestration layer talks to
//!
//! ## Example
//!
//! ```rust,no_run
//! use ledgerstream::ledgerstream::datasource::{DataSourceManager, SourceKind};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut manager = DataSourceManager::new();
//!     if manager
//!         .initialize_source(SourceKind::FileWatcher, None, true)
//!         .await
//!     {
//!         let batch = manager
//!             .consume_batch(50, Duration::from_secs(5))
//!             .await
//!             .expect("source is initialized");
//!         println!("consumed {} records", batch.len());
//!     }
//!     manager.close().await;
//! }
//! ```

pub mod batch;
pub mod config;
pub mod file;
pub mod kafka;
pub mod manager;
pub mod registry;
pub mod traits;
pub mod types;

pub use batch::{BatchAssembler, RecordDrain};
pub use config::SourceConfig;
pub use manager::{DataSourceManager, ManagerStatus};
pub use registry::SourceRegistry;
pub use traits::DataSource;
pub use types::{DataSourceError, RawRecord, SourceKind, SourceStatus, StatusDetail};
