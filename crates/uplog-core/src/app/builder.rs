//! DriverBuilder - UploadDriver の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - storage / uploader / policy は必須。足りなければ build() でエラー
//! - batch サイズと tick 間隔は 0 を拒否
//! - event_sink と clock は省略可（TracingEventSink / SystemClock）

use std::sync::Arc;
use std::time::Duration;

use super::driver::UploadDriver;
use super::status::StatsCounters;
use crate::impls::TracingEventSink;
use crate::ports::{Clock, EventSink, LogStorage, LogUploader, SystemClock, UploadDecisionPolicy};

pub const DEFAULT_MAX_BATCH_RECORDS: usize = 100;
pub const DEFAULT_TICK_EVERY: Duration = Duration::from_secs(1);

/// # 使用例
/// ```ignore
/// let driver = DriverBuilder::new()
///     .storage(storage)
///     .uploader(uploader)
///     .policy(policy)
///     .build()?;
/// ```
pub struct DriverBuilder {
    storage: Option<Arc<dyn LogStorage>>,
    uploader: Option<Arc<dyn LogUploader>>,
    policy: Option<Arc<dyn UploadDecisionPolicy>>,
    sink: Option<Arc<dyn EventSink>>,
    clock: Option<Arc<dyn Clock>>,
    max_batch_records: usize,
    tick_every: Duration,
    upload_timeout: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing {0}: it must be set before build()")]
    Missing(&'static str),

    #[error("max_batch_records must be greater than zero")]
    InvalidBatchSize,

    #[error("tick period must be greater than zero")]
    InvalidTickPeriod,

    #[error("upload timeout must be greater than zero")]
    InvalidUploadTimeout,
}

impl DriverBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            uploader: None,
            policy: None,
            sink: None,
            clock: None,
            max_batch_records: DEFAULT_MAX_BATCH_RECORDS,
            tick_every: DEFAULT_TICK_EVERY,
            upload_timeout: None,
        }
    }

    pub fn storage(mut self, storage: Arc<dyn LogStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn uploader(mut self, uploader: Arc<dyn LogUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn UploadDecisionPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn max_batch_records(mut self, max_batch_records: usize) -> Self {
        self.max_batch_records = max_batch_records;
        self
    }

    pub fn tick_every(mut self, tick_every: Duration) -> Self {
        self.tick_every = tick_every;
        self
    }

    pub fn upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<UploadDriver, BuildError> {
        let storage = self.storage.ok_or(BuildError::Missing("storage"))?;
        let uploader = self.uploader.ok_or(BuildError::Missing("uploader"))?;
        let policy = self.policy.ok_or(BuildError::Missing("policy"))?;

        if self.max_batch_records == 0 {
            return Err(BuildError::InvalidBatchSize);
        }
        if self.tick_every.is_zero() {
            return Err(BuildError::InvalidTickPeriod);
        }
        if self.upload_timeout.is_some_and(|t| t.is_zero()) {
            return Err(BuildError::InvalidUploadTimeout);
        }

        Ok(UploadDriver {
            storage,
            uploader,
            policy,
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingEventSink)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            max_batch_records: self.max_batch_records,
            tick_every: self.tick_every,
            upload_timeout: self.upload_timeout,
            stats: StatsCounters::default(),
        })
    }
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
