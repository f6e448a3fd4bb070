//! LogStorage port - ログバッファ
//!
//! policy は `status()` しか見ません。batch の受け渡しは driver だけが使います。

use crate::domain::{BatchId, LogBatch, StorageStatus};

pub trait LogStorage: Send + Sync {
    /// Snapshot of what is waiting to be uploaded.
    ///
    /// Records already handed out in an in-flight batch are not counted.
    fn status(&self) -> StorageStatus;

    /// Hand out up to `max_records` of the oldest records as a batch.
    ///
    /// Returns `None` when nothing is buffered or a batch is already in flight.
    fn next_batch(&self, max_records: usize, batch_id: BatchId) -> Option<LogBatch>;

    /// Whether a batch is handed out and not yet confirmed or released.
    fn has_in_flight(&self) -> bool;

    /// The batch was delivered; drop its records. Returns `false` for an
    /// unknown id.
    fn confirm(&self, batch_id: BatchId) -> bool;

    /// The batch was not delivered; put its records back in front of the
    /// buffer. Returns `false` for an unknown id.
    fn release(&self, batch_id: BatchId) -> bool;
}
