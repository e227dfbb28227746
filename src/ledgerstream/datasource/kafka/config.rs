//! Kafka source configuration

use rdkafka::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Environment variable names for the broker source
pub mod env {
    pub const BOOTSTRAP_SERVERS: &str = "KAFKA_BOOTSTRAP_SERVERS";
    pub const TOPIC: &str = "KAFKA_TOPIC";
    pub const GROUP_ID: &str = "KAFKA_GROUP_ID";
    pub const AUTO_OFFSET_RESET: &str = "KAFKA_AUTO_OFFSET_RESET";
    pub const POLL_TIMEOUT_MS: &str = "KAFKA_POLL_TIMEOUT_MS";
}

/// Where a consumer group with no committed offset starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetReset {
    Earliest,
    Latest,
}

impl OffsetReset {
    /// The librdkafka configuration value
    pub fn as_rdkafka_value(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }

    /// Parse from string (case-insensitive); unknown values are logged and
    /// fall back to the default.
    pub fn parse_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "earliest" => OffsetReset::Earliest,
            "latest" => OffsetReset::Latest,
            _ => {
                log::warn!(
                    "Unknown auto.offset.reset '{}', using default 'latest'. \
                     Valid values: earliest, latest",
                    s
                );
                OffsetReset::Latest
            }
        }
    }
}

impl Default for OffsetReset {
    fn default() -> Self {
        OffsetReset::Latest
    }
}

/// Configuration for the broker-backed statement source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaSourceConfig {
    /// Broker list, e.g. "localhost:9092" or "broker1:9092,broker2:9092"
    pub brokers: String,

    /// Topic carrying statement records
    pub topic: String,

    /// Consumer group id
    pub group_id: String,

    /// Where to start reading when the group has no committed offset
    pub auto_offset_reset: OffsetReset,

    /// Auto-commit offsets at `auto_commit_interval_ms`. Manual offset
    /// management is not implemented; loss/duplication across a crash
    /// between receipt and downstream success is accepted.
    pub enable_auto_commit: bool,

    /// Auto-commit interval (milliseconds)
    pub auto_commit_interval_ms: u64,

    /// Upper bound on one blocking poll (milliseconds)
    pub poll_timeout_ms: u64,
}

impl Default for KafkaSourceConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "financial-statements".to_string(),
            group_id: "statement-processor".to_string(),
            auto_offset_reset: OffsetReset::Latest,
            enable_auto_commit: true,
            auto_commit_interval_ms: 5000,
            poll_timeout_ms: 10000,
        }
    }
}

impl KafkaSourceConfig {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            brokers: std::env::var(env::BOOTSTRAP_SERVERS).unwrap_or(defaults.brokers),
            topic: std::env::var(env::TOPIC).unwrap_or(defaults.topic),
            group_id: std::env::var(env::GROUP_ID).unwrap_or(defaults.group_id),
            auto_offset_reset: std::env::var(env::AUTO_OFFSET_RESET)
                .map(|v| OffsetReset::parse_or_default(&v))
                .unwrap_or(defaults.auto_offset_reset),
            enable_auto_commit: defaults.enable_auto_commit,
            auto_commit_interval_ms: defaults.auto_commit_interval_ms,
            poll_timeout_ms: env_parse(env::POLL_TIMEOUT_MS, defaults.poll_timeout_ms),
        }
    }

    /// Build the configuration from a caller-supplied property map, using
    /// the standard Kafka property names.
    pub fn from_properties(props: &HashMap<String, String>) -> Self {
        let get = |key: &str| props.get(key).cloned();
        let defaults = Self::default();

        Self {
            brokers: get("bootstrap.servers")
                .or_else(|| get("brokers"))
                .unwrap_or(defaults.brokers),
            topic: get("topic").unwrap_or(defaults.topic),
            group_id: get("group.id")
                .or_else(|| get("group_id"))
                .unwrap_or(defaults.group_id),
            auto_offset_reset: get("auto.offset.reset")
                .map(|v| OffsetReset::parse_or_default(&v))
                .unwrap_or(defaults.auto_offset_reset),
            enable_auto_commit: get("enable.auto.commit")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(defaults.enable_auto_commit),
            auto_commit_interval_ms: get("auto.commit.interval.ms")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.auto_commit_interval_ms),
            poll_timeout_ms: get("poll.timeout.ms")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.poll_timeout_ms),
        }
    }

    /// Validate field values; returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.brokers.is_empty() {
            return Err("bootstrap.servers cannot be empty".to_string());
        }
        if self.group_id.is_empty() {
            return Err("group.id cannot be empty".to_string());
        }
        if self.topic.is_empty() {
            return Err("topic cannot be empty".to_string());
        }
        if self.topic.len() > 249 {
            return Err(format!(
                "Topic name '{}' exceeds maximum length of 249 characters",
                self.topic
            ));
        }
        // Kafka topic names allow alphanumerics, '.', '_' and '-'.
        if !self
            .topic
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '-')
        {
            return Err(format!(
                "Topic name '{}' contains invalid characters. \
                 Valid characters: alphanumeric, '.', '_', '-'",
                self.topic
            ));
        }
        Ok(())
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Lower this configuration into an rdkafka client configuration.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("auto.offset.reset", self.auto_offset_reset.as_rdkafka_value())
            .set("enable.auto.commit", self.enable_auto_commit.to_string())
            .set(
                "auto.commit.interval.ms",
                self.auto_commit_interval_ms.to_string(),
            );
        config
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("Invalid value '{}' for {}, using default", value, key);
            default
        }),
        Err(_) => default,
    }
}
