//! Kafka consumer for statement records
//!
//! Thin wrapper over an rdkafka `StreamConsumer`: consumer-group
//! subscription to the statement topic, JSON payload deserialization, and a
//! single-message poll with an explicit timeout. Batching on top of the poll
//! is the batch assembler's job.

use futures::StreamExt;
use log::{debug, error};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message as KafkaMessage;
use std::fmt;
use std::time::Duration;

use super::config::KafkaSourceConfig;
use crate::ledgerstream::datasource::types::RawRecord;

/// Outcome of one poll attempt against the statement topic.
#[derive(Debug)]
pub enum PollOutcome {
    /// A record arrived and deserialized cleanly
    Record(RawRecord),
    /// A message arrived but its payload was not a valid statement record;
    /// it was logged and skipped
    Malformed,
    /// No message arrived within the poll window
    Timeout,
}

/// Errors surfaced by the consumer itself (as opposed to per-message decode
/// failures, which are reported as [`PollOutcome::Malformed`]).
#[derive(Debug)]
pub enum ConsumerError {
    Kafka(KafkaError),
}

impl fmt::Display for ConsumerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumerError::Kafka(e) => write!(f, "Kafka error: {}", e),
        }
    }
}

impl std::error::Error for ConsumerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsumerError::Kafka(e) => Some(e),
        }
    }
}

impl From<KafkaError> for ConsumerError {
    fn from(err: KafkaError) -> Self {
        ConsumerError::Kafka(err)
    }
}

/// Consumer-group subscription to the statement topic.
pub struct StatementConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl StatementConsumer {
    pub fn new(config: &KafkaSourceConfig) -> Result<Self, ConsumerError> {
        let consumer: StreamConsumer = config.client_config().create()?;
        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }

    /// Join the consumer group for the configured topic.
    pub fn subscribe(&self) -> Result<(), KafkaError> {
        self.consumer.subscribe(&[&self.topic])
    }

    /// Round-trip to the cluster to verify the brokers are reachable.
    ///
    /// rdkafka connects lazily, so subscription alone does not prove
    /// anything; a metadata fetch does.
    pub fn probe(&self, timeout: Duration) -> Result<(), KafkaError> {
        self.consumer
            .fetch_metadata(Some(&self.topic), timeout)
            .map(|_| ())
    }

    /// Poll for the next message, waiting at most `timeout`.
    ///
    /// A payload that fails to deserialize yields [`PollOutcome::Malformed`]
    /// rather than an error so the caller's batch loop can continue.
    pub async fn poll_record(&self, timeout: Duration) -> Result<PollOutcome, ConsumerError> {
        let mut stream = self.consumer.stream();

        match tokio::time::timeout(timeout, stream.next()).await {
            Ok(Some(Ok(msg))) => {
                let Some(payload) = msg.payload() else {
                    error!(
                        "Empty payload at partition {}, offset {}",
                        msg.partition(),
                        msg.offset()
                    );
                    return Ok(PollOutcome::Malformed);
                };

                match serde_json::from_slice::<RawRecord>(payload) {
                    Ok(value) => {
                        debug!(
                            "Processing message from partition {}, offset {}",
                            msg.partition(),
                            msg.offset()
                        );
                        Ok(PollOutcome::Record(value))
                    }
                    Err(e) => {
                        error!(
                            "JSON decode error at partition {}, offset {}: {}",
                            msg.partition(),
                            msg.offset(),
                            e
                        );
                        Ok(PollOutcome::Malformed)
                    }
                }
            }
            Ok(Some(Err(e))) => Err(ConsumerError::Kafka(e)),
            Ok(None) => Ok(PollOutcome::Timeout),
            Err(_) => Ok(PollOutcome::Timeout),
        }
    }

    /// Leave the consumer group. Dropping the consumer afterwards releases
    /// the underlying client.
    pub fn unsubscribe(&self) {
        self.consumer.unsubscribe();
    }
}
