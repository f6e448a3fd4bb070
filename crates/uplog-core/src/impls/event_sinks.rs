//! EventSink implementations.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::domain::UploadEvent;
use crate::ports::EventSink;

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: UploadEvent) {
        let name = event.name();
        match event {
            UploadEvent::Armed { policy } => {
                debug!(policy, "{name}");
            }
            UploadEvent::UploadTriggered {
                policy,
                status,
                elapsed,
            } => {
                info!(
                    policy,
                    record_count = status.record_count,
                    byte_size = status.byte_size,
                    elapsed_ms = elapsed.map(|d| d.as_millis() as u64),
                    "{name}"
                );
            }
            UploadEvent::Reset { policy } => {
                debug!(policy, "{name}");
            }
            UploadEvent::Reconfigured { policy, interval } => {
                info!(policy, interval_ms = interval.as_millis() as u64, "{name}");
            }
            UploadEvent::BatchUploaded {
                batch_id,
                records,
                bytes,
            } => {
                info!(%batch_id, records, bytes, "{name}");
            }
            UploadEvent::BatchFailed {
                batch_id,
                records,
                error,
            } => {
                warn!(%batch_id, records, error = %error, "{name}");
            }
            UploadEvent::ManualFlush { status } => {
                info!(
                    record_count = status.record_count,
                    byte_size = status.byte_size,
                    "{name}"
                );
            }
        }
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: UploadEvent) {}
}

/// Keeps every event in memory. Meant for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<UploadEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far, oldest first.
    pub fn events(&self) -> Vec<UploadEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event names, oldest first.
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(UploadEvent::name)
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: UploadEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StorageStatus;

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemoryEventSink::new();
        sink.emit(UploadEvent::Armed { policy: "periodic" });
        sink.emit(UploadEvent::ManualFlush {
            status: StorageStatus::new(3, 120),
        });

        assert_eq!(sink.names(), vec!["armed", "manual_flush"]);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn tracing_sink_accepts_every_event_without_subscriber() {
        let sink = TracingEventSink;
        sink.emit(UploadEvent::Reset { policy: "periodic" });
        sink.emit(UploadEvent::UploadTriggered {
            policy: "periodic",
            status: StorageStatus::new(1, 10),
            elapsed: None,
        });
    }
}
