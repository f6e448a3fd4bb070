//! Events - policy と driver が EventSink に送るイベント
//!
//! グローバルな logger を直接呼ばず、イベントを値として渡します。
//! 出力先（tracing、テスト用のメモリなど）は EventSink の実装で決まります。
//! タイムスタンプは出力側（subscriber など）が付けます。

use std::time::Duration;

use serde::Serialize;

use super::{BatchId, StorageStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UploadEvent {
    /// Timer baseline established.
    Armed { policy: &'static str },

    /// A policy decided to upload.
    UploadTriggered {
        policy: &'static str,
        status: StorageStatus,
        /// Time since the previous baseline, for timer-based policies.
        elapsed: Option<Duration>,
    },

    /// Timer baseline cleared.
    Reset { policy: &'static str },

    /// Threshold changed at runtime.
    Reconfigured {
        policy: &'static str,
        interval: Duration,
    },

    BatchUploaded {
        batch_id: BatchId,
        records: usize,
        bytes: u64,
    },

    BatchFailed {
        batch_id: BatchId,
        records: usize,
        error: String,
    },

    /// Upload requested outside of any policy.
    ManualFlush { status: StorageStatus },
}

impl UploadEvent {
    /// Short name used as the log message.
    pub fn name(&self) -> &'static str {
        match self {
            UploadEvent::Armed { .. } => "armed",
            UploadEvent::UploadTriggered { .. } => "upload_triggered",
            UploadEvent::Reset { .. } => "reset",
            UploadEvent::Reconfigured { .. } => "reconfigured",
            UploadEvent::BatchUploaded { .. } => "batch_uploaded",
            UploadEvent::BatchFailed { .. } => "batch_failed",
            UploadEvent::ManualFlush { .. } => "manual_flush",
        }
    }
}
