//! Timeout-bounded batch assembly shared by all source adapters
//!
//! Both backends expose fundamentally different delivery models (broker poll
//! vs. pending-file queue), but downstream consumption wants one behavior:
//! accumulate up to N records, give up once a deadline passes, whichever
//! comes first. The assembler owns that loop; adapters only supply records
//! that are ready now through [`RecordDrain`].

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use super::types::RawRecord;

/// Seam between the assembler and a concrete record supply.
#[async_trait]
pub trait RecordDrain {
    /// Pull up to `limit` records that are ready now.
    ///
    /// `wait` caps any blocking the implementation performs internally. A
    /// purely queue-backed supply returns immediately and ignores it; a
    /// broker-backed supply may block inside its client poll up to `wait`
    /// (or its own configured poll timeout, if shorter).
    async fn drain_ready(&mut self, limit: usize, wait: Duration) -> Vec<RawRecord>;
}

/// Accumulates records up to a batch size or deadline, whichever comes first.
#[derive(Debug, Clone)]
pub struct BatchAssembler {
    poll_interval: Duration,
}

impl BatchAssembler {
    /// `poll_interval` is the sleep between drain attempts when the supply
    /// is idle. Pass `Duration::ZERO` for supplies that block internally.
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run the accumulation loop against `drain`.
    ///
    /// Returns as soon as `batch_size` records are accumulated, or whatever
    /// was accumulated once `timeout` has elapsed. An idle supply therefore
    /// produces an empty batch after at least `timeout`; the call never
    /// blocks indefinitely.
    pub async fn assemble<D>(
        &self,
        drain: &mut D,
        batch_size: usize,
        timeout: Duration,
    ) -> Vec<RawRecord>
    where
        D: RecordDrain + ?Sized,
    {
        let mut records = Vec::new();
        if batch_size == 0 {
            return records;
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let pulled = drain.drain_ready(batch_size - records.len(), remaining).await;
            records.extend(pulled);
            debug_assert!(records.len() <= batch_size);
            if records.len() >= batch_size {
                break;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            sleep(self.poll_interval.min(remaining)).await;
        }

        log::debug!(
            "Assembled batch of {} records (requested {})",
            records.len(),
            batch_size
        );
        records
    }
}
