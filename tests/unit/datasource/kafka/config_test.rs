//! Tests for Kafka source configuration

use ledgerstream::ledgerstream::datasource::kafka::config::{KafkaSourceConfig, OffsetReset};
use std::collections::HashMap;
use std::time::Duration;

#[test]
fn test_defaults_match_deployment() {
    let config = KafkaSourceConfig::default();
    assert_eq!(config.brokers, "localhost:9092");
    assert_eq!(config.topic, "financial-statements");
    assert_eq!(config.group_id, "statement-processor");
    assert_eq!(config.auto_offset_reset, OffsetReset::Latest);
    assert!(config.enable_auto_commit);
    assert_eq!(config.auto_commit_interval_ms, 5000);
    assert_eq!(config.poll_timeout(), Duration::from_secs(10));
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_properties_overrides() {
    let mut props = HashMap::new();
    props.insert(
        "bootstrap.servers".to_string(),
        "broker1:9092,broker2:9092".to_string(),
    );
    props.insert("topic".to_string(), "statements.eu".to_string());
    props.insert("group.id".to_string(), "renderer".to_string());
    props.insert("auto.offset.reset".to_string(), "earliest".to_string());
    props.insert("enable.auto.commit".to_string(), "false".to_string());
    props.insert("auto.commit.interval.ms".to_string(), "2500".to_string());
    props.insert("poll.timeout.ms".to_string(), "750".to_string());

    let config = KafkaSourceConfig::from_properties(&props);
    assert_eq!(config.brokers, "broker1:9092,broker2:9092");
    assert_eq!(config.topic, "statements.eu");
    assert_eq!(config.group_id, "renderer");
    assert_eq!(config.auto_offset_reset, OffsetReset::Earliest);
    assert!(!config.enable_auto_commit);
    assert_eq!(config.auto_commit_interval_ms, 2500);
    assert_eq!(config.poll_timeout(), Duration::from_millis(750));
}

#[test]
fn test_from_properties_falls_back_to_defaults() {
    let config = KafkaSourceConfig::from_properties(&HashMap::new());
    assert_eq!(config.brokers, KafkaSourceConfig::default().brokers);
    assert_eq!(config.topic, KafkaSourceConfig::default().topic);
}

#[test]
fn test_offset_reset_parsing() {
    assert_eq!(OffsetReset::parse_or_default("earliest"), OffsetReset::Earliest);
    assert_eq!(OffsetReset::parse_or_default("LATEST"), OffsetReset::Latest);
    // Unknown values fall back to the default rather than failing.
    assert_eq!(OffsetReset::parse_or_default("newest"), OffsetReset::Latest);
    assert_eq!(OffsetReset::Earliest.as_rdkafka_value(), "earliest");
    assert_eq!(OffsetReset::Latest.as_rdkafka_value(), "latest");
}

#[test]
fn test_validate_rejects_empty_fields() {
    let mut config = KafkaSourceConfig::default();
    config.topic = String::new();
    assert!(config.validate().is_err());

    let mut config = KafkaSourceConfig::default();
    config.brokers = String::new();
    assert!(config.validate().is_err());

    let mut config = KafkaSourceConfig::default();
    config.group_id = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_topic_names() {
    let mut config = KafkaSourceConfig::default();
    config.topic = "statements with spaces".to_string();
    assert!(config.validate().is_err());

    config.topic = "x".repeat(250);
    assert!(config.validate().is_err());

    config.topic = "valid.topic_name-1".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_env_overrides() {
    std::env::set_var("KAFKA_BOOTSTRAP_SERVERS", "env-broker:9092");
    std::env::set_var("KAFKA_TOPIC", "env-statements");
    std::env::set_var("KAFKA_GROUP_ID", "env-group");
    std::env::set_var("KAFKA_AUTO_OFFSET_RESET", "earliest");

    let config = KafkaSourceConfig::from_env();
    assert_eq!(config.brokers, "env-broker:9092");
    assert_eq!(config.topic, "env-statements");
    assert_eq!(config.group_id, "env-group");
    assert_eq!(config.auto_offset_reset, OffsetReset::Earliest);

    std::env::remove_var("KAFKA_BOOTSTRAP_SERVERS");
    std::env::remove_var("KAFKA_TOPIC");
    std::env::remove_var("KAFKA_GROUP_ID");
    std::env::remove_var("KAFKA_AUTO_OFFSET_RESET");
}
