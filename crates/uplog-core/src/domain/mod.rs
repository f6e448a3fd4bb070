//! Domain model - ストレージ状態、判定結果、ログレコード、イベント、エラー
//!
//! policy も driver もこの型だけを介してやり取りします。

pub mod status;
pub mod decision;
pub mod record;
pub mod ids;
pub mod events;
pub mod errors;

pub use self::status::StorageStatus;
pub use self::decision::Decision;
pub use self::record::{LogBatch, LogLevel, LogRecord};
pub use self::ids::BatchId;
pub use self::events::UploadEvent;
pub use self::errors::{PolicyError, UploadError};
