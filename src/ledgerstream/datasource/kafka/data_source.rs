//! Kafka data source adapter

use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::config::KafkaSourceConfig;
use super::consumer::{PollOutcome, StatementConsumer};
use crate::ledgerstream::datasource::batch::{BatchAssembler, RecordDrain};
use crate::ledgerstream::datasource::traits::DataSource;
use crate::ledgerstream::datasource::types::{
    DataSourceError, RawRecord, SourceKind, SourceStatus, StatusDetail,
};

/// How long the connect-time metadata probe may wait for the cluster
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Broker-backed statement source
pub struct KafkaDataSource {
    config: KafkaSourceConfig,
    consumer: Option<StatementConsumer>,
    assembler: BatchAssembler,
    records_consumed: u64,
    decode_errors: u64,
    connected: bool,
}

impl KafkaDataSource {
    pub fn new(config: KafkaSourceConfig) -> Result<Self, DataSourceError> {
        config.validate().map_err(DataSourceError::Configuration)?;
        info!(
            "Initialized Kafka source for topic '{}' on {}",
            config.topic, config.brokers
        );
        Ok(Self {
            config,
            consumer: None,
            // The client blocks inside its own poll, so the assembler never
            // needs an idle sleep of its own.
            assembler: BatchAssembler::new(Duration::ZERO),
            records_consumed: 0,
            decode_errors: 0,
            connected: false,
        })
    }

    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, DataSourceError> {
        Self::new(KafkaSourceConfig::from_properties(props))
    }

    pub fn config(&self) -> &KafkaSourceConfig {
        &self.config
    }
}

#[async_trait]
impl RecordDrain for KafkaDataSource {
    /// Pull messages already buffered by the client, blocking at most
    /// `min(wait, poll_timeout)` inside the client poll.
    async fn drain_ready(&mut self, limit: usize, wait: Duration) -> Vec<RawRecord> {
        let Some(consumer) = self.consumer.as_ref() else {
            return Vec::new();
        };

        let window = wait.min(self.config.poll_timeout());
        let deadline = Instant::now() + window;
        let mut out = Vec::new();

        while out.len() < limit {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match consumer.poll_record(remaining).await {
                Ok(PollOutcome::Record(record)) => out.push(record),
                Ok(PollOutcome::Malformed) => self.decode_errors += 1,
                Ok(PollOutcome::Timeout) => break,
                Err(e) => {
                    error!("Kafka error during consumption: {}", e);
                    break;
                }
            }
        }

        self.records_consumed += out.len() as u64;
        out
    }
}

#[async_trait]
impl DataSource for KafkaDataSource {
    async fn connect(&mut self) -> bool {
        if self.connected && self.consumer.is_some() {
            warn!("Kafka consumer is already connected");
            return true;
        }

        let consumer = match StatementConsumer::new(&self.config) {
            Ok(consumer) => consumer,
            Err(e) => {
                error!("Failed to create Kafka consumer: {}", e);
                return false;
            }
        };

        if let Err(e) = consumer.subscribe() {
            error!("Cannot subscribe to topic '{}': {}", self.config.topic, e);
            return false;
        }

        if let Err(e) = consumer.probe(PROBE_TIMEOUT) {
            error!(
                "Failed to connect to Kafka cluster at {}: {}",
                self.config.brokers, e
            );
            return false;
        }

        self.consumer = Some(consumer);
        self.connected = true;
        info!("Connected to Kafka cluster at {}", self.config.brokers);
        true
    }

    async fn consume_batch(
        &mut self,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, DataSourceError> {
        if !self.connected && !self.connect().await {
            return Err(DataSourceError::Connection(
                "Failed to establish Kafka connection".to_string(),
            ));
        }

        let assembler = self.assembler.clone();
        let records = assembler.assemble(self, batch_size, timeout).await;
        debug!("Consumed batch of {} records from Kafka", records.len());
        Ok(records)
    }

    async fn close(&mut self) {
        if let Some(consumer) = self.consumer.take() {
            consumer.unsubscribe();
            info!("Kafka consumer connection closed");
        }
        self.connected = false;
    }

    fn status(&self) -> SourceStatus {
        SourceStatus {
            connected: self.connected,
            kind: SourceKind::Kafka,
            records_consumed: self.records_consumed,
            decode_errors: self.decode_errors,
            detail: StatusDetail::Kafka {
                brokers: self.config.brokers.clone(),
                topic: self.config.topic.clone(),
                group_id: self.config.group_id.clone(),
            },
        }
    }
}
