//! UploadDriver - アップロードループ
//!
//! # フロー（tick 1 回分）
//! 1. LogStorage::status() で状態を取得
//! 2. UploadDecisionPolicy::evaluate() で判定
//! 3. Upload なら LogStorage::next_batch() で batch を取り出す
//! 4. LogUploader::upload() で転送
//! 5. 成功なら confirm、失敗なら release（次の Upload 判定で再送）

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::status::{DriverStats, StatsCounters};
use crate::domain::{BatchId, Decision, UploadError, UploadEvent};
use crate::ports::{Clock, EventSink, LogStorage, LogUploader, UploadDecisionPolicy};

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Policy said `Noop`, or there was nothing to send.
    Idle,

    Uploaded {
        batch_id: BatchId,
        records: usize,
        bytes: u64,
    },

    /// Policy said `Upload` but an earlier batch is still in flight.
    Busy,

    /// Records were put back into storage.
    Failed {
        batch_id: BatchId,
        error: UploadError,
    },
}

/// Totals of a manual flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub batches: usize,
    pub records: usize,
    pub bytes: u64,
}

/// Consults the policy and moves batches from storage to the uploader.
///
/// Build it with `DriverBuilder`.
pub struct UploadDriver {
    pub(crate) storage: Arc<dyn LogStorage>,
    pub(crate) uploader: Arc<dyn LogUploader>,
    pub(crate) policy: Arc<dyn UploadDecisionPolicy>,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) max_batch_records: usize,
    pub(crate) tick_every: Duration,
    pub(crate) upload_timeout: Option<Duration>,
    pub(crate) stats: StatsCounters,
}

impl UploadDriver {
    /// Run one status check.
    pub async fn tick(&self) -> TickOutcome {
        self.stats.record_tick();

        let status = self.storage.status();
        let decision = self.policy.evaluate(&status, self.clock.now());
        debug!(policy = self.policy.name(), ?decision, record_count = status.record_count, "tick");

        match decision {
            Decision::Noop => TickOutcome::Idle,
            Decision::Upload => self.upload_next().await,
        }
    }

    /// Upload everything buffered right now, ignoring the policy.
    ///
    /// Stops at the first failed batch (its records stay buffered). A batch
    /// already in flight from a running tick is reported as
    /// `UploadError::Rejected`. Only a complete flush resets the policy so
    /// its interval restarts from here.
    pub async fn flush_now(&self) -> Result<FlushSummary, UploadError> {
        self.sink.emit(UploadEvent::ManualFlush {
            status: self.storage.status(),
        });

        let mut summary = FlushSummary::default();
        loop {
            match self.upload_next().await {
                TickOutcome::Idle => break,
                TickOutcome::Busy => {
                    return Err(UploadError::Rejected("batch in flight".to_string()));
                }
                TickOutcome::Uploaded { records, bytes, .. } => {
                    summary.batches += 1;
                    summary.records += records;
                    summary.bytes += bytes;
                }
                TickOutcome::Failed { error, .. } => return Err(error),
            }
        }

        self.policy.reset();
        Ok(summary)
    }

    pub fn stats(&self) -> DriverStats {
        self.stats.snapshot()
    }

    pub fn policy(&self) -> &Arc<dyn UploadDecisionPolicy> {
        &self.policy
    }

    pub fn tick_every(&self) -> Duration {
        self.tick_every
    }

    /// Run `tick()` every `tick_every` on a tokio task until shut down.
    pub fn spawn(self: Arc<Self>) -> DriverHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.tick_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if *shutdown_rx.borrow() {
                    break;
                }

                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        // sender が drop されたら止める
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                }
            }
        });

        DriverHandle { shutdown_tx, join }
    }

    async fn upload_next(&self) -> TickOutcome {
        let batch_id = BatchId::generate(self.clock.utc_now());
        let Some(batch) = self.storage.next_batch(self.max_batch_records, batch_id) else {
            if self.storage.has_in_flight() {
                return TickOutcome::Busy;
            }
            return TickOutcome::Idle;
        };
        let records = batch.len();
        let bytes = batch.byte_size();

        let result = match self.upload_timeout {
            Some(limit) => tokio::time::timeout(limit, self.uploader.upload(&batch))
                .await
                .unwrap_or(Err(UploadError::Timeout(limit))),
            None => self.uploader.upload(&batch).await,
        };

        match result {
            Ok(()) => {
                if !self.storage.confirm(batch_id) {
                    warn!(%batch_id, "storage did not recognize the delivered batch");
                }
                self.stats.record_upload(records, bytes);
                self.sink.emit(UploadEvent::BatchUploaded {
                    batch_id,
                    records,
                    bytes,
                });
                TickOutcome::Uploaded {
                    batch_id,
                    records,
                    bytes,
                }
            }
            Err(error) => {
                if !self.storage.release(batch_id) {
                    warn!(%batch_id, "storage did not take the failed batch back");
                }
                self.stats.record_failure();
                self.sink.emit(UploadEvent::BatchFailed {
                    batch_id,
                    records,
                    error: error.to_string(),
                });
                TickOutcome::Failed { batch_id, error }
            }
        }
    }
}

/// Handle to a driver started with `UploadDriver::spawn`.
/// - `request_shutdown()` で次の tick から止まる（転送中の batch は最後まで待つ）
/// - `shutdown_and_join()` で停止を待てる
pub struct DriverHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl DriverHandle {
    pub fn request_shutdown(&self) {
        // receiver がもういなくても無視してよい
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}
