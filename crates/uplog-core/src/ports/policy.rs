//! UploadDecisionPolicy port - アップロード判定
//!
//! driver は tick のたびに `evaluate` を呼び、返ってきた Decision に従います。
//! 継承ではなく trait で差し替え・合成します（`policy::AnyOfPolicy` など）。

use std::time::Instant;

use crate::domain::{Decision, StorageStatus};

/// Decides, on each status check, whether the buffer should be uploaded.
///
/// Implementations keep their mutable state behind interior locking so one
/// instance can be shared between threads. A single `evaluate` call must
/// check and update that state atomically: two concurrent callers in the same
/// window never both get `Decision::Upload`.
pub trait UploadDecisionPolicy: Send + Sync {
    /// Name used in events and logs.
    fn name(&self) -> &'static str;

    /// Decide what to do given the current status and time.
    ///
    /// Total over its inputs; never fails.
    fn evaluate(&self, status: &StorageStatus, now: Instant) -> Decision;

    /// Drop any timer baseline, e.g. after a manual flush.
    fn reset(&self);
}
