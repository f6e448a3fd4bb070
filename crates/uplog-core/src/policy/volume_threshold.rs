//! Volume threshold policy: upload once the buffer is large enough.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{Decision, PolicyError, StorageStatus, UploadEvent};
use crate::ports::{EventSink, UploadDecisionPolicy};

const NAME: &str = "volume_threshold";

/// Uploads whenever `byte_size >= threshold_bytes`.
pub struct VolumeThresholdPolicy {
    threshold_bytes: u64,
    sink: Arc<dyn EventSink>,
}

impl VolumeThresholdPolicy {
    pub fn new(threshold_bytes: u64, sink: Arc<dyn EventSink>) -> Result<Self, PolicyError> {
        if threshold_bytes == 0 {
            return Err(PolicyError::invalid(
                "byte size threshold must be greater than zero",
            ));
        }
        Ok(Self {
            threshold_bytes,
            sink,
        })
    }
}

impl UploadDecisionPolicy for VolumeThresholdPolicy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn evaluate(&self, status: &StorageStatus, _now: Instant) -> Decision {
        if status.byte_size < self.threshold_bytes {
            return Decision::Noop;
        }
        self.sink.emit(UploadEvent::UploadTriggered {
            policy: NAME,
            status: *status,
            elapsed: None,
        });
        Decision::Upload
    }

    fn reset(&self) {}
}
