//! InMemoryLogStorage - 開発用のログバッファ
//!
//! # 実装詳細
//! - Mutex で排他制御（ロック中に await しない）
//! - 送信中の batch は 1 つまで。失敗したら先頭に戻す
//! - status() は送信中の分を含まない

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::domain::{BatchId, LogBatch, LogRecord, StorageStatus};
use crate::ports::LogStorage;

#[derive(Debug, Default)]
struct StorageState {
    pending: VecDeque<(LogRecord, u64)>,
    pending_bytes: u64,
    in_flight: Option<(BatchId, Vec<(LogRecord, u64)>)>,
}

#[derive(Debug, Default)]
pub struct InMemoryLogStorage {
    state: Mutex<StorageState>,
}

impl InMemoryLogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one record.
    pub fn append(&self, record: LogRecord) {
        let size = record.encoded_len();
        let mut state = self.lock();
        state.pending_bytes += size;
        state.pending.push_back((record, size));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StorageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogStorage for InMemoryLogStorage {
    fn status(&self) -> StorageStatus {
        let state = self.lock();
        StorageStatus::new(state.pending.len() as u64, state.pending_bytes)
    }

    fn next_batch(&self, max_records: usize, batch_id: BatchId) -> Option<LogBatch> {
        let mut state = self.lock();
        if state.in_flight.is_some() || state.pending.is_empty() || max_records == 0 {
            return None;
        }

        let take = max_records.min(state.pending.len());
        let entries: Vec<(LogRecord, u64)> = state.pending.drain(..take).collect();
        let bytes: u64 = entries.iter().map(|(_, size)| size).sum();
        state.pending_bytes -= bytes;

        let records = entries.iter().map(|(record, _)| record.clone()).collect();
        state.in_flight = Some((batch_id, entries));

        Some(LogBatch {
            id: batch_id,
            records,
        })
    }

    fn has_in_flight(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    fn confirm(&self, batch_id: BatchId) -> bool {
        let mut state = self.lock();
        match &state.in_flight {
            Some((id, _)) if *id == batch_id => {
                state.in_flight = None;
                true
            }
            _ => false,
        }
    }

    fn release(&self, batch_id: BatchId) -> bool {
        let mut state = self.lock();
        let matches = matches!(&state.in_flight, Some((id, _)) if *id == batch_id);
        if !matches {
            return false;
        }
        let Some((_, entries)) = state.in_flight.take() else {
            return false;
        };

        // 元の順番のまま先頭に戻す
        for (record, size) in entries.into_iter().rev() {
            state.pending_bytes += size;
            state.pending.push_front((record, size));
        }
        true
    }
}
