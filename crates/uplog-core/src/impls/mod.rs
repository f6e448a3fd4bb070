//! Impls - ports の実装（開発用・テスト用 + tracing 連携）
//!
//! # 含まれる実装
//! - **TracingEventSink**: イベントを tracing に流す（デフォルト）
//! - **NoopEventSink / MemoryEventSink**: 何もしない / テスト用に溜める
//! - **InMemoryLogStorage**: 開発用のログバッファ

pub mod event_sinks;
pub mod memory_storage;

pub use self::event_sinks::{MemoryEventSink, NoopEventSink, TracingEventSink};
pub use self::memory_storage::InMemoryLogStorage;
