//! Tests for the shared batch assembly loop
//!
//! Covers the timing contract both adapters rely on: full batches return
//! early, idle supplies wait out the timeout, and records arriving while the
//! assembler sleeps are picked up.

use async_trait::async_trait;
use ledgerstream::ledgerstream::datasource::batch::{BatchAssembler, RecordDrain};
use ledgerstream::ledgerstream::datasource::types::RawRecord;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Drain backed by a shared queue, mimicking the pending-file queue fed from
/// another task.
struct QueueDrain {
    queue: Arc<Mutex<VecDeque<RawRecord>>>,
}

#[async_trait]
impl RecordDrain for QueueDrain {
    async fn drain_ready(&mut self, limit: usize, _wait: Duration) -> Vec<RawRecord> {
        let mut queue = self.queue.lock().unwrap();
        let take = limit.min(queue.len());
        queue.drain(..take).collect()
    }
}

fn queue_of(n: usize) -> Arc<Mutex<VecDeque<RawRecord>>> {
    let records = (0..n).map(|i| json!({ "n": i })).collect();
    Arc::new(Mutex::new(records))
}

#[tokio::test]
async fn test_ready_records_return_before_timeout() {
    let queue = queue_of(10);
    let mut drain = QueueDrain {
        queue: Arc::clone(&queue),
    };
    let assembler = BatchAssembler::new(Duration::from_millis(50));

    let start = Instant::now();
    let batch = assembler
        .assemble(&mut drain, 10, Duration::from_secs(5))
        .await;

    assert_eq!(batch.len(), 10);
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn test_batch_never_exceeds_requested_size() {
    let queue = queue_of(10);
    let mut drain = QueueDrain {
        queue: Arc::clone(&queue),
    };
    let assembler = BatchAssembler::new(Duration::from_millis(10));

    let batch = assembler
        .assemble(&mut drain, 3, Duration::from_millis(100))
        .await;

    assert_eq!(batch.len(), 3);
    assert_eq!(queue.lock().unwrap().len(), 7);
}

#[tokio::test]
async fn test_empty_source_waits_at_least_the_timeout() {
    let queue = queue_of(0);
    let mut drain = QueueDrain {
        queue: Arc::clone(&queue),
    };
    let assembler = BatchAssembler::new(Duration::from_millis(20));

    let start = Instant::now();
    let batch = assembler
        .assemble(&mut drain, 5, Duration::from_millis(150))
        .await;

    assert!(batch.is_empty());
    assert!(start.elapsed() >= Duration::from_millis(150));
    assert!(start.elapsed() < Duration::from_millis(600));
}

#[tokio::test]
async fn test_partial_batch_on_timeout() {
    let queue = queue_of(2);
    let mut drain = QueueDrain {
        queue: Arc::clone(&queue),
    };
    let assembler = BatchAssembler::new(Duration::from_millis(20));

    let batch = assembler
        .assemble(&mut drain, 5, Duration::from_millis(120))
        .await;

    assert_eq!(batch.len(), 2);
}

#[tokio::test]
async fn test_records_arriving_mid_wait_are_picked_up() {
    let queue = queue_of(0);
    let mut drain = QueueDrain {
        queue: Arc::clone(&queue),
    };
    let assembler = BatchAssembler::new(Duration::from_millis(10));

    let producer_queue = Arc::clone(&queue);
    tokio::spawn(async move {
        sleep(Duration::from_millis(60)).await;
        producer_queue
            .lock()
            .unwrap()
            .push_back(json!({ "n": 42 }));
    });

    let start = Instant::now();
    let batch = assembler
        .assemble(&mut drain, 1, Duration::from_secs(2))
        .await;

    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0]["n"], 42);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_arrival_order_is_preserved() {
    let queue = queue_of(5);
    let mut drain = QueueDrain {
        queue: Arc::clone(&queue),
    };
    let assembler = BatchAssembler::new(Duration::from_millis(10));

    let batch = assembler
        .assemble(&mut drain, 5, Duration::from_millis(200))
        .await;

    let ns: Vec<i64> = batch.iter().map(|r| r["n"].as_i64().unwrap()).collect();
    assert_eq!(ns, vec![0, 1, 2, 3, 4]);
}
