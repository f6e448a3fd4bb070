//! Log records and the batches they travel in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BatchId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// One buffered log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub recorded_at: DateTime<Utc>,
    pub level: LogLevel,
    pub body: serde_json::Value,
}

impl LogRecord {
    pub fn new(recorded_at: DateTime<Utc>, level: LogLevel, body: serde_json::Value) -> Self {
        Self {
            recorded_at,
            level,
            body,
        }
    }

    /// Size of the record's JSON encoding.
    ///
    /// This is what counts toward `StorageStatus::byte_size`.
    pub fn encoded_len(&self) -> u64 {
        serde_json::to_vec(self).map(|v| v.len() as u64).unwrap_or(0)
    }
}

/// Records taken out of storage for a single upload attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBatch {
    pub id: BatchId,
    pub records: Vec<LogRecord>,
}

impl LogBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn byte_size(&self) -> u64 {
        self.records.iter().map(LogRecord::encoded_len).sum()
    }
}
