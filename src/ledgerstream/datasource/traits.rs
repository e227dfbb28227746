//! Source abstraction trait
//!
//! One uniform capability contract for every statement source backend.
//! Concrete adapters (Kafka consumer-group subscription, watched directory)
//! implement it directly, without an inheritance hierarchy; the manager owns
//! one boxed adapter at a time.

use async_trait::async_trait;
use std::time::Duration;

use super::types::{DataSourceError, RawRecord, SourceStatus};

/// Core trait for statement record sources
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Establish the backend connection.
    ///
    /// Returns `false` on failure; connection problems are reported, never
    /// raised. Calling `connect` on an already connected adapter is a no-op
    /// returning `true`.
    async fn connect(&mut self) -> bool;

    /// Consume up to `batch_size` records, waiting at most `timeout`.
    ///
    /// Records are returned in arrival order. An idle source yields an empty
    /// batch once the timeout elapses; an empty batch is a normal outcome,
    /// not an error. A record that fails to decode is excluded and counted,
    /// never aborting the batch.
    async fn consume_batch(
        &mut self,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, DataSourceError>;

    /// Release the backend connection.
    ///
    /// Never fails and is safe to call repeatedly; failures during release
    /// are logged by the adapter.
    async fn close(&mut self);

    /// Snapshot of connection state and kind-specific counters.
    fn status(&self) -> SourceStatus;
}
