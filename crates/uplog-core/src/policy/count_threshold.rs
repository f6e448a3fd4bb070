//! Count threshold policy: upload once enough records pile up.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{Decision, PolicyError, StorageStatus, UploadEvent};
use crate::ports::{EventSink, UploadDecisionPolicy};

const NAME: &str = "count_threshold";

/// Uploads whenever `record_count >= threshold`. Holds no timer state.
pub struct CountThresholdPolicy {
    threshold: u64,
    sink: Arc<dyn EventSink>,
}

impl CountThresholdPolicy {
    pub fn new(threshold: u64, sink: Arc<dyn EventSink>) -> Result<Self, PolicyError> {
        if threshold == 0 {
            return Err(PolicyError::invalid(
                "record count threshold must be greater than zero",
            ));
        }
        Ok(Self { threshold, sink })
    }
}

impl UploadDecisionPolicy for CountThresholdPolicy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn evaluate(&self, status: &StorageStatus, _now: Instant) -> Decision {
        if status.record_count < self.threshold {
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
