//! Status - driver のカウンタ

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Snapshot of driver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStats {
    pub ticks: u64,
    pub uploads: u64,
    pub failed_uploads: u64,
    pub records_uploaded: u64,
    pub bytes_uploaded: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    ticks: AtomicU64,
    uploads: AtomicU64,
    failed_uploads: AtomicU64,
    records_uploaded: AtomicU64,
    bytes_uploaded: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_upload(&self, records: usize, bytes: u64) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.records_uploaded
            .fetch_add(records as u64, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DriverStats {
        DriverStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
            failed_uploads: self.failed_uploads.load(Ordering::Relaxed),
            records_uploaded: self.records_uploaded.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let counters = StatsCounters::default();
        counters.record_tick();
        counters.record_tick();
        counters.record_upload(3, 300);
        counters.record_failure();

        assert_eq!(
            counters.snapshot(),
            DriverStats {
                ticks: 2,
                uploads: 1,
                failed_uploads: 1,
                records_uploaded: 3,
                bytes_uploaded: 300,
            }
        );
    }
}
