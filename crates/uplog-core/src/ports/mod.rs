//! Ports - 抽象化レイヤー
//!
//! policy と driver が外部に依存する部分をすべて trait にしています。
//! - 時刻（Clock）
//! - ログの保管（LogStorage）
//! - 転送（LogUploader）
//! - 観測（EventSink）
//! - 判定（UploadDecisionPolicy）

pub mod clock;
pub mod event_sink;
pub mod policy;
pub mod storage;
pub mod uploader;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::policy::UploadDecisionPolicy;
pub use self::storage::LogStorage;
pub use self::uploader::LogUploader;
