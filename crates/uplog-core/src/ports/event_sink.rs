//! EventSink port - イベント記録の抽象化
//!
//! policy はグローバルな logger に触らず、注入された EventSink にだけ
//! イベントを渡します。実装は `impls::event_sinks` を参照。

use crate::domain::UploadEvent;

pub trait EventSink: Send + Sync {
    /// Record one event. Must not block.
    fn emit(&self, event: UploadEvent);
}
