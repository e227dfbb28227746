//! Statement record helpers
//!
//! Extraction of well-known fields from raw statement records, for the
//! downstream template-selection and rendering collaborators. No validation
//! or amount normalization happens here; records stay opaque to the
//! ingestion core and these helpers only lift out what the consumers need.

use serde::{Deserialize, Serialize};

use crate::ledgerstream::datasource::types::{RawRecord, SourceKind};

/// Routing and template metadata lifted from a statement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementMetadata {
    pub statement_id: Option<String>,
    pub customer_id: Option<String>,
    pub statement_date: Option<String>,
    pub statement_type: String,
    pub template_name: String,
    pub template_version: String,
    pub currency: String,
    pub processing_timestamp: Option<String>,
    /// Which source kind delivered the record
    pub source: SourceKind,
}

impl StatementMetadata {
    pub fn from_record(record: &RawRecord, source: SourceKind) -> Self {
        let metadata = &record["metadata"];
        Self {
            statement_id: str_field(record, "statement_id"),
            customer_id: str_field(record, "customer_id"),
            statement_date: str_field(record, "statement_date"),
            statement_type: str_field(record, "statement_type")
                .unwrap_or_else(|| "monthly".to_string()),
            template_name: str_field(metadata, "template_name")
                .unwrap_or_else(|| "monthly".to_string()),
            template_version: str_field(metadata, "template_version")
                .unwrap_or_else(|| "1.0".to_string()),
            currency: str_field(metadata, "currency").unwrap_or_else(|| "USD".to_string()),
            processing_timestamp: str_field(metadata, "processing_timestamp"),
            source,
        }
    }
}

/// Financial sections of a statement record, each defaulting to empty when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    pub customer_info: RawRecord,
    pub account_summary: RawRecord,
    pub transactions: Vec<RawRecord>,
    pub balances: RawRecord,
    pub line_items: Vec<RawRecord>,
    pub totals: RawRecord,
}

impl FinancialData {
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            customer_info: object_field(record, "customer_info"),
            account_summary: object_field(record, "account_summary"),
            transactions: array_field(record, "transactions"),
            balances: object_field(record, "balances"),
            line_items: array_field(record, "line_items"),
            totals: object_field(record, "totals"),
        }
    }
}

fn str_field(record: &RawRecord, key: &str) -> Option<String> {
    record.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn object_field(record: &RawRecord, key: &str) -> RawRecord {
    match record.get(key) {
        Some(value) if value.is_object() => value.clone(),
        _ => RawRecord::Object(serde_json::Map::new()),
    }
}

fn array_field(record: &RawRecord, key: &str) -> Vec<RawRecord> {
    match record.get(key) {
        Some(RawRecord::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
