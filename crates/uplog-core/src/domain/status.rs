//! Storage status snapshot observed by upload policies.

use serde::{Deserialize, Serialize};

/// Snapshot of the log buffer at check time.
///
/// Owned by the storage collaborator. Policies only read it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStatus {
    /// Number of records waiting to be uploaded.
    pub record_count: u64,

    /// Total encoded size of those records, in bytes.
    pub byte_size: u64,
}

impl StorageStatus {
    pub fn new(record_count: u64, byte_size: u64) -> Self {
        Self {
            record_count,
            byte_size,
        }
    }

    /// Nothing buffered.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
