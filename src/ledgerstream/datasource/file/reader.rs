//! Statement file parsing
//!
//! A dropped file holds either a single JSON statement object or a JSON array
//! of them; an array yields one record per element, in list order.

use std::io::ErrorKind;
use std::path::Path;

use crate::ledgerstream::datasource::types::RawRecord;

/// Outcome of reading one queued statement file.
///
/// Failure handling is part of the interface rather than caught ad hoc: a
/// `Gone` file has nothing left to dispose of, a `Malformed` file is a
/// quarantine candidate.
#[derive(Debug)]
pub enum FileReadOutcome {
    /// File parsed successfully; records in emission order
    Records(Vec<RawRecord>),
    /// File vanished between enqueue and read
    Gone,
    /// Content could not be read or decoded; carries the reason for the
    /// quarantine report
    Malformed(String),
}

/// Read and decode one statement file.
pub fn read_statement_file(path: &Path) -> FileReadOutcome {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return FileReadOutcome::Gone,
        Err(e) => return FileReadOutcome::Malformed(format!("Read error: {}", e)),
    };

    match serde_json::from_str::<RawRecord>(&raw) {
        Ok(RawRecord::Array(items)) => FileReadOutcome::Records(items),
        Ok(value) => FileReadOutcome::Records(vec![value]),
        Err(e) => FileReadOutcome::Malformed(format!("JSON decode error: {}", e)),
    }
}
